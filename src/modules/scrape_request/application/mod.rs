pub mod ports;
pub mod service;

pub use ports::MessageBroker;
pub use service::{RepublishOutcome, ScrapeRequestService};
