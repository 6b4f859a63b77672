use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::modules::scrape_request::domain::{
    ScrapeRequest, ScrapeRequestRepository, ScrapeRequestStatus, UpdateScrapeRequestParams,
};
use crate::shared::errors::{AppError, AppResult};

/// Scrape request store held in memory
#[derive(Default)]
pub struct InMemoryScrapeRequestRepository {
    rows: RwLock<HashMap<Uuid, ScrapeRequest>>,
}

impl InMemoryScrapeRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<ScrapeRequest> {
        let mut requests: Vec<ScrapeRequest> = self.rows.read().await.values().cloned().collect();
        requests.sort_by_key(|r| r.created_at);
        requests
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::NotFound(format!("scrape request {}", id))
    }
}

#[async_trait]
impl ScrapeRequestRepository for InMemoryScrapeRequestRepository {
    async fn create(&self, request: &ScrapeRequest) -> AppResult<ScrapeRequest> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&request.id) {
            return Err(AppError::UniqueConstraint(format!(
                "scrape request {}",
                request.id
            )));
        }
        rows.insert(request.id, request.clone());
        Ok(request.clone())
    }

    async fn find(&self, id: Uuid) -> AppResult<ScrapeRequest> {
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn find_pendings(&self, older_than: DateTime<Utc>) -> AppResult<Vec<ScrapeRequest>> {
        let rows = self.rows.read().await;
        let mut pendings: Vec<ScrapeRequest> = rows
            .values()
            .filter(|r| r.status == ScrapeRequestStatus::Pending && r.created_at <= older_than)
            .cloned()
            .collect();
        pendings.sort_by_key(|r| r.created_at);
        Ok(pendings)
    }

    async fn update(
        &self,
        id: Uuid,
        update: &UpdateScrapeRequestParams,
    ) -> AppResult<ScrapeRequest> {
        let mut rows = self.rows.write().await;
        let request = rows.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        request.apply_update(update)?;
        Ok(request.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.rows
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::scrape_request::domain::CreateScrapeRequestParams;

    fn request() -> ScrapeRequest {
        ScrapeRequest::new(CreateScrapeRequestParams::series_list(
            "asura",
            "https://asuratoon.com",
            "/manga/",
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_create_is_unique_constraint() {
        let repo = InMemoryScrapeRequestRepository::new();
        let request = request();

        repo.create(&request).await.unwrap();
        let err = repo.create(&request).await.unwrap_err();
        assert!(matches!(err, AppError::UniqueConstraint(_)));
    }

    #[tokio::test]
    async fn test_update_is_terminal() {
        let repo = InMemoryScrapeRequestRepository::new();
        let request = repo.create(&request()).await.unwrap();

        let failed = repo
            .update(request.id, &UpdateScrapeRequestParams::failed(0.4, "timeout"))
            .await
            .unwrap();
        assert_eq!(failed.status, ScrapeRequestStatus::Failed);
        assert!(failed.error);

        assert!(repo
            .update(request.id, &UpdateScrapeRequestParams::completed(1.0))
            .await
            .is_err());
        let stored = repo.find(request.id).await.unwrap();
        assert_eq!(stored.status, ScrapeRequestStatus::Failed);
        assert_eq!(stored.message, "timeout");
    }

    #[tokio::test]
    async fn test_find_pendings_respects_cutoff() {
        let repo = InMemoryScrapeRequestRepository::new();
        let pending = repo.create(&request()).await.unwrap();
        let done = repo.create(&request()).await.unwrap();
        repo.update(done.id, &UpdateScrapeRequestParams::completed(1.0))
            .await
            .unwrap();

        let found = repo.find_pendings(Utc::now()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, pending.id);

        let earlier = pending.created_at - chrono::Duration::seconds(1);
        assert!(repo.find_pendings(earlier).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryScrapeRequestRepository::new();
        let request = repo.create(&request()).await.unwrap();

        repo.delete(request.id).await.unwrap();
        assert!(matches!(
            repo.find(request.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
