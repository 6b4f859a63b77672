use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entities::{ScrapeRequest, UpdateScrapeRequestParams};
use crate::shared::errors::AppResult;

#[cfg(test)]
use mockall::automock;

/// Persistence contract for scrape requests
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScrapeRequestRepository: Send + Sync {
    /// Fails with `UniqueConstraint` when the ID is already stored
    async fn create(&self, request: &ScrapeRequest) -> AppResult<ScrapeRequest>;
    async fn find(&self, id: Uuid) -> AppResult<ScrapeRequest>;
    /// PENDING requests created at or before `older_than`, oldest first
    async fn find_pendings(&self, older_than: DateTime<Utc>) -> AppResult<Vec<ScrapeRequest>>;
    async fn update(&self, id: Uuid, update: &UpdateScrapeRequestParams)
        -> AppResult<ScrapeRequest>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}
