use async_trait::async_trait;
use std::time::Duration;

use super::entities::{
    Chapter, ChapterDetailUpdate, ChapterInit, Provider, Series, SeriesDetailUpdate, SeriesInit,
    SeriesLatestUpdate,
};
use crate::shared::errors::AppResult;

#[cfg(test)]
use mockall::automock;

/// Read-only access to the manga sources
#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn find(&self, slug: &str) -> AppResult<Provider>;
    /// Every provider in the catalog, active or not
    async fn find_all(&self) -> AppResult<Vec<Provider>>;
    async fn find_active(&self) -> AppResult<Vec<Provider>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SeriesRepository: Send + Sync {
    /// Insert a shell record, or refresh the list-page fields of an existing one
    async fn upsert_init(&self, init: &SeriesInit) -> AppResult<Series>;
    async fn find(&self, provider: &str, slug: &str) -> AppResult<Series>;
    async fn find_by_provider(&self, provider: &str) -> AppResult<Vec<Series>>;
    async fn find_ongoing(&self, provider: &str) -> AppResult<Vec<Series>>;
    /// Series still missing a thumbnail or a synopsis
    async fn find_missing_detail(&self) -> AppResult<Vec<Series>>;
    async fn update_init(
        &self,
        provider: &str,
        slug: &str,
        update: &SeriesDetailUpdate,
    ) -> AppResult<Series>;
    async fn update_latest(
        &self,
        provider: &str,
        slug: &str,
        update: &SeriesLatestUpdate,
    ) -> AppResult<Series>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChapterRepository: Send + Sync {
    async fn upsert_init(&self, init: &ChapterInit) -> AppResult<Chapter>;
    async fn find(&self, provider: &str, series: &str, slug: &str) -> AppResult<Chapter>;
    /// Chapters of one series ordered by number
    async fn find_by_series(&self, provider: &str, series: &str) -> AppResult<Vec<Chapter>>;
    /// The highest-numbered chapter of a series, if any
    async fn find_latest(&self, provider: &str, series: &str) -> AppResult<Option<Chapter>>;
    async fn count(&self, provider: &str, series: &str) -> AppResult<u32>;
    /// Chapters still missing a full title or content images
    async fn find_missing_detail(&self) -> AppResult<Vec<Chapter>>;
    async fn update_init(
        &self,
        provider: &str,
        series: &str,
        slug: &str,
        update: &ChapterDetailUpdate,
    ) -> AppResult<Chapter>;
}

#[async_trait]
pub trait SeriesSearchRepository: Send + Sync {
    async fn index(&self, series: &Series) -> AppResult<()>;
    /// Keys (`provider/slug`) of series matching every term of `query`
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<String>>;
    async fn delete(&self, provider: &str, slug: &str) -> AppResult<()>;
}

/// Key-value cache holding JSON-encoded values
#[async_trait]
pub trait CacheRepository: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> AppResult<()>;
    async fn delete(&self, key: &str) -> AppResult<()>;
    /// Remove every key starting with `prefix`, returning how many were dropped
    async fn delete_prefix(&self, prefix: &str) -> AppResult<usize>;
}
