use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::cache_aside::CacheAside;
use crate::modules::catalog::domain::{
    CacheRepository, Chapter, ChapterDetailUpdate, ChapterInit, ChapterRepository,
};
use crate::shared::errors::AppResult;

const CHAPTER_TTL: Duration = Duration::from_secs(60 * 60);
const LIST_TTL: Duration = Duration::from_secs(10 * 60);
const MISSING_DETAIL_KEY: &str = "chapters:missing_detail";

/// Cache-aside decorator around any `ChapterRepository`
pub struct CachingChapterRepository {
    inner: Arc<dyn ChapterRepository>,
    cache: CacheAside,
}

impl CachingChapterRepository {
    pub fn new(inner: Arc<dyn ChapterRepository>, cache: Arc<dyn CacheRepository>) -> Self {
        Self {
            inner,
            cache: CacheAside::new(cache),
        }
    }

    pub fn entity_key(provider: &str, series: &str, slug: &str) -> String {
        format!("chapter:{}:{}:{}", provider, series, slug)
    }

    /// Prefix shared by the per-series list, latest and count entries
    pub fn series_prefix(provider: &str, series: &str) -> String {
        format!("chapters:{}:{}:", provider, series)
    }

    async fn invalidate_chapter(&self, provider: &str, series: &str, slug: &str) {
        self.cache.invalidate(
            &[
                Self::entity_key(provider, series, slug),
                MISSING_DETAIL_KEY.to_string(),
            ],
            &[Self::series_prefix(provider, series)],
        )
        .await;
    }
}

#[async_trait]
impl ChapterRepository for CachingChapterRepository {
    async fn upsert_init(&self, init: &ChapterInit) -> AppResult<Chapter> {
        let chapter = self.inner.upsert_init(init).await?;
        self.invalidate_chapter(&init.provider, &init.series, &init.slug)
            .await;
        Ok(chapter)
    }

    async fn find(&self, provider: &str, series: &str, slug: &str) -> AppResult<Chapter> {
        self.cache.read_through(
            &Self::entity_key(provider, series, slug),
            CHAPTER_TTL,
            || self.inner.find(provider, series, slug),
        )
        .await
    }

    async fn find_by_series(&self, provider: &str, series: &str) -> AppResult<Vec<Chapter>> {
        let key = format!("{}all", Self::series_prefix(provider, series));
        self.cache.read_through(&key, LIST_TTL, || {
            self.inner.find_by_series(provider, series)
        })
        .await
    }

    async fn find_latest(&self, provider: &str, series: &str) -> AppResult<Option<Chapter>> {
        let key = format!("{}latest", Self::series_prefix(provider, series));
        self.cache.read_through(&key, LIST_TTL, || {
            self.inner.find_latest(provider, series)
        })
        .await
    }

    async fn count(&self, provider: &str, series: &str) -> AppResult<u32> {
        let key = format!("{}count", Self::series_prefix(provider, series));
        self.cache.read_through(&key, LIST_TTL, || {
            self.inner.count(provider, series)
        })
        .await
    }

    async fn find_missing_detail(&self) -> AppResult<Vec<Chapter>> {
        self.cache.read_through(MISSING_DETAIL_KEY, LIST_TTL, || {
            self.inner.find_missing_detail()
        })
        .await
    }

    async fn update_init(
        &self,
        provider: &str,
        series: &str,
        slug: &str,
        update: &ChapterDetailUpdate,
    ) -> AppResult<Chapter> {
        let chapter = self
            .inner
            .update_init(provider, series, slug, update)
            .await?;
        self.invalidate_chapter(provider, series, slug).await;
        Ok(chapter)
    }
}
