/// Test helper functions, broker doubles and service builders
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use yomu_lib::bootstrap::AppServices;
use yomu_lib::modules::catalog::domain::{
    Chapter, ChapterDetailUpdate, ChapterInit, ChapterRepository,
};
use yomu_lib::modules::catalog::infrastructure::InMemoryChapterRepository;
use yomu_lib::modules::scrape_request::domain::{
    ScrapeRequest, ScrapeRequestRepository, UpdateScrapeRequestParams,
};
use yomu_lib::modules::scrape_request::MessageBroker;
use yomu_lib::modules::scraping::infrastructure::PageFetcher;
use yomu_lib::shared::errors::{AppError, AppResult};
use yomu_lib::shared::AppConfig;

mock! {
    pub RequestStore {}

    #[async_trait]
    impl ScrapeRequestRepository for RequestStore {
        async fn create(&self, request: &ScrapeRequest) -> AppResult<ScrapeRequest>;
        async fn find(&self, id: Uuid) -> AppResult<ScrapeRequest>;
        async fn find_pendings(&self, older_than: DateTime<Utc>) -> AppResult<Vec<ScrapeRequest>>;
        async fn update(&self, id: Uuid, update: &UpdateScrapeRequestParams) -> AppResult<ScrapeRequest>;
        async fn delete(&self, id: Uuid) -> AppResult<()>;
    }
}

/// Broker double that records every published key
#[derive(Default)]
pub struct RecordingBroker {
    published: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl RecordingBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageBroker for RecordingBroker {
    async fn created(&self, request: &ScrapeRequest) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::BrokerError("broker unreachable".to_string()));
        }
        self.published.lock().unwrap().push(request.id.to_string());
        Ok(())
    }
}

/// Short timeouts, a fast breaker cool-down and a single broker partition
pub fn test_config() -> AppConfig {
    AppConfig {
        crawl_timeout: Duration::from_secs(2),
        breaker_cooldown: Duration::from_millis(200),
        broker_partitions: 1,
        max_browser_sessions: 4,
        ..AppConfig::default()
    }
}

pub fn build_services(fetcher: Arc<dyn PageFetcher>) -> AppServices {
    AppServices::with_fetcher(test_config(), fetcher)
}

/// Poll until the request leaves PENDING or `timeout` passes
pub async fn wait_for_terminal(
    repository: &Arc<dyn ScrapeRequestRepository>,
    id: Uuid,
    timeout: Duration,
) -> ScrapeRequest {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let request = repository.find(id).await.unwrap();
        if request.status.is_terminal() || tokio::time::Instant::now() >= deadline {
            return request;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Chapter store that refuses chapters whose slug ends with one of `failing`
pub struct FlakyChapterRepository {
    inner: InMemoryChapterRepository,
    failing: Vec<String>,
}

impl FlakyChapterRepository {
    pub fn new(failing: &[&str]) -> Self {
        Self {
            inner: InMemoryChapterRepository::new(),
            failing: failing.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ChapterRepository for FlakyChapterRepository {
    async fn upsert_init(&self, init: &ChapterInit) -> AppResult<Chapter> {
        if self.failing.iter().any(|suffix| init.slug.ends_with(suffix.as_str())) {
            return Err(AppError::DatabaseError(format!("write of {} rejected", init.slug)));
        }
        self.inner.upsert_init(init).await
    }

    async fn find(&self, provider: &str, series: &str, slug: &str) -> AppResult<Chapter> {
        self.inner.find(provider, series, slug).await
    }

    async fn find_by_series(&self, provider: &str, series: &str) -> AppResult<Vec<Chapter>> {
        self.inner.find_by_series(provider, series).await
    }

    async fn find_latest(&self, provider: &str, series: &str) -> AppResult<Option<Chapter>> {
        self.inner.find_latest(provider, series).await
    }

    async fn count(&self, provider: &str, series: &str) -> AppResult<u32> {
        self.inner.count(provider, series).await
    }

    async fn find_missing_detail(&self) -> AppResult<Vec<Chapter>> {
        self.inner.find_missing_detail().await
    }

    async fn update_init(
        &self,
        provider: &str,
        series: &str,
        slug: &str,
        update: &ChapterDetailUpdate,
    ) -> AppResult<Chapter> {
        self.inner.update_init(provider, series, slug, update).await
    }
}
