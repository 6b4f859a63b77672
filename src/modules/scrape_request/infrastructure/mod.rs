mod channel_broker;
mod memory_repository;

pub use channel_broker::{BrokerMessage, ChannelBroker};
pub use memory_repository::InMemoryScrapeRequestRepository;
