use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::modules::catalog::domain::{
    Series, SeriesDetailUpdate, SeriesInit, SeriesLatestUpdate, SeriesRepository, SeriesStatus,
};
use crate::shared::errors::{AppError, AppResult};

type SeriesKey = (String, String);

/// Series store keyed by provider and slug
#[derive(Default)]
pub struct InMemorySeriesRepository {
    rows: RwLock<HashMap<SeriesKey, Series>>,
}

impl InMemorySeriesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn key(provider: &str, slug: &str) -> SeriesKey {
        (provider.to_string(), slug.to_string())
    }

    fn not_found(provider: &str, slug: &str) -> AppError {
        AppError::NotFound(format!("series '{}' of provider '{}'", slug, provider))
    }

    fn sorted(mut series: Vec<Series>) -> Vec<Series> {
        series.sort_by(|a, b| (&a.provider, &a.slug).cmp(&(&b.provider, &b.slug)));
        series
    }
}

#[async_trait]
impl SeriesRepository for InMemorySeriesRepository {
    async fn upsert_init(&self, init: &SeriesInit) -> AppResult<Series> {
        if init.slug.trim().is_empty() {
            return Err(AppError::InvalidInput("series slug is required".to_string()));
        }

        let mut rows = self.rows.write().await;
        let series = rows
            .entry(Self::key(&init.provider, &init.slug))
            .and_modify(|existing| existing.apply_init(init))
            .or_insert_with(|| Series::from_init(init));
        Ok(series.clone())
    }

    async fn find(&self, provider: &str, slug: &str) -> AppResult<Series> {
        self.rows
            .read()
            .await
            .get(&Self::key(provider, slug))
            .cloned()
            .ok_or_else(|| Self::not_found(provider, slug))
    }

    async fn find_by_provider(&self, provider: &str) -> AppResult<Vec<Series>> {
        let rows = self.rows.read().await;
        Ok(Self::sorted(
            rows.values()
                .filter(|s| s.provider == provider)
                .cloned()
                .collect(),
        ))
    }

    async fn find_ongoing(&self, provider: &str) -> AppResult<Vec<Series>> {
        let rows = self.rows.read().await;
        Ok(Self::sorted(
            rows.values()
                .filter(|s| s.provider == provider && s.status == SeriesStatus::Ongoing)
                .cloned()
                .collect(),
        ))
    }

    async fn find_missing_detail(&self) -> AppResult<Vec<Series>> {
        let rows = self.rows.read().await;
        Ok(Self::sorted(
            rows.values().filter(|s| s.needs_detail()).cloned().collect(),
        ))
    }

    async fn update_init(
        &self,
        provider: &str,
        slug: &str,
        update: &SeriesDetailUpdate,
    ) -> AppResult<Series> {
        let mut rows = self.rows.write().await;
        let series = rows
            .get_mut(&Self::key(provider, slug))
            .ok_or_else(|| Self::not_found(provider, slug))?;
        series.apply_detail(update);
        Ok(series.clone())
    }

    async fn update_latest(
        &self,
        provider: &str,
        slug: &str,
        update: &SeriesLatestUpdate,
    ) -> AppResult<Series> {
        let mut rows = self.rows.write().await;
        let series = rows
            .get_mut(&Self::key(provider, slug))
            .ok_or_else(|| Self::not_found(provider, slug))?;
        series.apply_latest(update);
        Ok(series.clone())
    }
}
