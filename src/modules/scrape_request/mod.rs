//! Scrape requests: intake, the broker hand-off and the worker that executes them.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod worker;

pub use application::{MessageBroker, RepublishOutcome, ScrapeRequestService};
pub use domain::{
    CreateScrapeRequestParams, ScrapeRequest, ScrapeRequestRepository, ScrapeRequestStatus,
    ScrapeRequestType,
};
pub use worker::ScrapeWorker;
