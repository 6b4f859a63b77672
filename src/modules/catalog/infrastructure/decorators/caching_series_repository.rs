use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::cache_aside::CacheAside;
use crate::modules::catalog::domain::{
    CacheRepository, Series, SeriesDetailUpdate, SeriesInit, SeriesLatestUpdate, SeriesRepository,
};
use crate::shared::errors::AppResult;

const SERIES_TTL: Duration = Duration::from_secs(60 * 60);
const LIST_TTL: Duration = Duration::from_secs(10 * 60);

/// Cache-aside decorator around any `SeriesRepository`.
///
/// Reads go through the cache; every write invalidates the series entry and the
/// lists that may contain it before returning.
pub struct CachingSeriesRepository {
    inner: Arc<dyn SeriesRepository>,
    cache: CacheAside,
}

impl CachingSeriesRepository {
    pub fn new(inner: Arc<dyn SeriesRepository>, cache: Arc<dyn CacheRepository>) -> Self {
        Self {
            inner,
            cache: CacheAside::new(cache),
        }
    }

    pub fn entity_key(provider: &str, slug: &str) -> String {
        format!("series:{}:{}", provider, slug)
    }

    pub fn list_prefix(provider: &str) -> String {
        format!("series:list:{}:", provider)
    }

    const MISSING_DETAIL_KEY: &'static str = "series:missing_detail";

    async fn invalidate_series(&self, provider: &str, slug: &str) {
        self.cache.invalidate(
            &[
                Self::entity_key(provider, slug),
                Self::MISSING_DETAIL_KEY.to_string(),
            ],
            &[Self::list_prefix(provider)],
        )
        .await;
    }
}

#[async_trait]
impl SeriesRepository for CachingSeriesRepository {
    async fn upsert_init(&self, init: &SeriesInit) -> AppResult<Series> {
        let series = self.inner.upsert_init(init).await?;
        self.invalidate_series(&init.provider, &init.slug).await;
        Ok(series)
    }

    async fn find(&self, provider: &str, slug: &str) -> AppResult<Series> {
        self.cache.read_through(
            &Self::entity_key(provider, slug),
            SERIES_TTL,
            || self.inner.find(provider, slug),
        )
        .await
    }

    async fn find_by_provider(&self, provider: &str) -> AppResult<Vec<Series>> {
        let key = format!("{}all", Self::list_prefix(provider));
        self.cache.read_through(&key, LIST_TTL, || {
            self.inner.find_by_provider(provider)
        })
        .await
    }

    async fn find_ongoing(&self, provider: &str) -> AppResult<Vec<Series>> {
        let key = format!("{}ongoing", Self::list_prefix(provider));
        self.cache.read_through(&key, LIST_TTL, || {
            self.inner.find_ongoing(provider)
        })
        .await
    }

    async fn find_missing_detail(&self) -> AppResult<Vec<Series>> {
        self.cache.read_through(
            Self::MISSING_DETAIL_KEY,
            LIST_TTL,
            || self.inner.find_missing_detail(),
        )
        .await
    }

    async fn update_init(
        &self,
        provider: &str,
        slug: &str,
        update: &SeriesDetailUpdate,
    ) -> AppResult<Series> {
        let series = self.inner.update_init(provider, slug, update).await?;
        self.invalidate_series(provider, slug).await;
        Ok(series)
    }

    async fn update_latest(
        &self,
        provider: &str,
        slug: &str,
        update: &SeriesLatestUpdate,
    ) -> AppResult<Series> {
        let series = self.inner.update_latest(provider, slug, update).await?;
        self.invalidate_series(provider, slug).await;
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::domain::repositories::MockSeriesRepository;
    use crate::modules::catalog::infrastructure::cache::MemoryCache;
    use crate::modules::catalog::infrastructure::persistence::InMemorySeriesRepository;
    use crate::shared::errors::AppError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    /// Store whose first `find` pauses after loading until released
    struct PausingSeriesRepository {
        store: InMemorySeriesRepository,
        armed: AtomicBool,
        loaded: Notify,
        release: Notify,
    }

    #[async_trait]
    impl SeriesRepository for PausingSeriesRepository {
        async fn upsert_init(&self, init: &SeriesInit) -> AppResult<Series> {
            self.store.upsert_init(init).await
        }

        async fn find(&self, provider: &str, slug: &str) -> AppResult<Series> {
            let series = self.store.find(provider, slug).await;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.loaded.notify_one();
                self.release.notified().await;
            }
            series
        }

        async fn find_by_provider(&self, provider: &str) -> AppResult<Vec<Series>> {
            self.store.find_by_provider(provider).await
        }

        async fn find_ongoing(&self, provider: &str) -> AppResult<Vec<Series>> {
            self.store.find_ongoing(provider).await
        }

        async fn find_missing_detail(&self) -> AppResult<Vec<Series>> {
            self.store.find_missing_detail().await
        }

        async fn update_init(
            &self,
            provider: &str,
            slug: &str,
            update: &SeriesDetailUpdate,
        ) -> AppResult<Series> {
            self.store.update_init(provider, slug, update).await
        }

        async fn update_latest(
            &self,
            provider: &str,
            slug: &str,
            update: &SeriesLatestUpdate,
        ) -> AppResult<Series> {
            self.store.update_latest(provider, slug, update).await
        }
    }

    fn init() -> SeriesInit {
        SeriesInit {
            provider: "asura".to_string(),
            slug: "reincarnator".to_string(),
            title: "Reincarnator".to_string(),
            source_path: "/manga/reincarnator/".to_string(),
        }
    }

    #[tokio::test]
    async fn test_find_is_served_from_cache_after_first_read() {
        let mut inner = MockSeriesRepository::new();
        inner
            .expect_find()
            .times(1)
            .returning(|_, _| Ok(Series::from_init(&init())));

        let cache = Arc::new(MemoryCache::new());
        let repo = CachingSeriesRepository::new(Arc::new(inner), cache.clone());

        let first = repo.find("asura", "reincarnator").await.unwrap();
        let second = repo.find("asura", "reincarnator").await.unwrap();

        assert_eq!(first.slug, second.slug);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_write_invalidates_entity_and_lists() {
        let mut inner = MockSeriesRepository::new();
        inner
            .expect_upsert_init()
            .returning(|init| Ok(Series::from_init(init)));

        let cache = Arc::new(MemoryCache::new());
        for key in [
            "series:asura:reincarnator",
            "series:list:asura:ongoing",
            "series:missing_detail",
            "series:list:flame:ongoing",
        ] {
            cache
                .set(key, "[]".to_string(), Duration::from_secs(60))
                .await
                .unwrap();
        }

        let repo = CachingSeriesRepository::new(Arc::new(inner), cache.clone());
        repo.upsert_init(&init()).await.unwrap();

        assert!(!cache.contains("series:asura:reincarnator"));
        assert!(!cache.contains("series:list:asura:ongoing"));
        assert!(!cache.contains("series:missing_detail"));
        assert!(cache.contains("series:list:flame:ongoing"));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let mut inner = MockSeriesRepository::new();
        inner
            .expect_upsert_init()
            .returning(|_| Err(AppError::DatabaseError("down".to_string())));

        let cache = Arc::new(MemoryCache::new());
        cache
            .set("series:asura:reincarnator", "{}".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let repo = CachingSeriesRepository::new(Arc::new(inner), cache.clone());
        assert!(repo.upsert_init(&init()).await.is_err());
        assert!(cache.contains("series:asura:reincarnator"));
    }

    #[tokio::test]
    async fn test_slow_read_does_not_cache_value_replaced_by_write() {
        let inner = Arc::new(PausingSeriesRepository {
            store: InMemorySeriesRepository::new(),
            armed: AtomicBool::new(false),
            loaded: Notify::new(),
            release: Notify::new(),
        });
        let mut old = init();
        old.title = "Old".to_string();
        inner.upsert_init(&old).await.unwrap();
        inner.armed.store(true, Ordering::SeqCst);

        let cache = Arc::new(MemoryCache::new());
        let repo = Arc::new(CachingSeriesRepository::new(inner.clone(), cache.clone()));

        let reader = {
            let repo = repo.clone();
            tokio::spawn(async move { repo.find("asura", "reincarnator").await })
        };
        inner.loaded.notified().await;

        let mut new = init();
        new.title = "New".to_string();
        repo.upsert_init(&new).await.unwrap();

        inner.release.notify_one();
        let stale = reader.await.unwrap().unwrap();
        assert_eq!(stale.title, "Old");
        assert!(!cache.contains("series:asura:reincarnator"));

        let fresh = repo.find("asura", "reincarnator").await.unwrap();
        assert_eq!(fresh.title, "New");
    }
}
