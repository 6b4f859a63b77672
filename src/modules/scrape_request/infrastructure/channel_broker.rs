use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::SendTimeoutError};

use crate::modules::scrape_request::application::MessageBroker;
use crate::modules::scrape_request::domain::{ScrapeRequest, ScrapeRequestEvent};
use crate::shared::errors::{AppError, AppResult};

/// One message on a partition: the key and the JSON-encoded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerMessage {
    pub key: String,
    pub payload: Vec<u8>,
}

/// In-process partitioned broker.
///
/// Messages with the same key always land on the same partition, so each
/// request is consumed by exactly one partition consumer. A partition that
/// stays full for longer than the publish timeout rejects the message.
pub struct ChannelBroker {
    partitions: Vec<mpsc::Sender<BrokerMessage>>,
    publish_timeout: Duration,
}

impl ChannelBroker {
    pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_millis(500);

    /// Create the broker and the receiving end of every partition
    pub fn new(partitions: usize, capacity: usize) -> (Self, Vec<mpsc::Receiver<BrokerMessage>>) {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..partitions.max(1))
            .map(|_| mpsc::channel(capacity.max(1)))
            .unzip();
        (
            Self {
                partitions: senders,
                publish_timeout: Self::DEFAULT_PUBLISH_TIMEOUT,
            },
            receivers,
        )
    }

    pub fn with_publish_timeout(mut self, publish_timeout: Duration) -> Self {
        self.publish_timeout = publish_timeout;
        self
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn partition_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.partitions.len() as u64) as usize
    }

    pub async fn publish(&self, message: BrokerMessage) -> AppResult<()> {
        let partition = self.partition_for(&message.key);
        self.partitions[partition]
            .send_timeout(message, self.publish_timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(message) => AppError::BrokerError(format!(
                    "partition {} still full after {:?}, dropping message {}",
                    partition, self.publish_timeout, message.key
                )),
                SendTimeoutError::Closed(message) => AppError::BrokerError(format!(
                    "partition {} is closed, dropping message {}",
                    partition, message.key
                )),
            })
    }
}

#[async_trait]
impl MessageBroker for ChannelBroker {
    async fn created(&self, request: &ScrapeRequest) -> AppResult<()> {
        let event = ScrapeRequestEvent::created(request.clone());
        let message = BrokerMessage {
            key: event.key(),
            payload: serde_json::to_vec(&event)?,
        };
        self.publish(message).await
    }
}
