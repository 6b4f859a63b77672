use async_trait::async_trait;

use crate::modules::scrape_request::domain::ScrapeRequest;
use crate::shared::errors::AppResult;

/// Publish-only side of the message broker
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Announce a newly created request, keyed by its ID
    async fn created(&self, request: &ScrapeRequest) -> AppResult<()>;
}
