pub mod entities;
pub mod events;
pub mod repository;

pub use entities::{
    CreateScrapeRequestParams, ScrapeRequest, ScrapeRequestStatus, ScrapeRequestType,
    UpdateScrapeRequestParams,
};
pub use events::ScrapeRequestEvent;
pub use repository::ScrapeRequestRepository;
