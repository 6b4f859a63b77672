use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::modules::catalog::domain::{
    Chapter, ChapterDetailUpdate, ChapterInit, ChapterRepository,
};
use crate::shared::errors::{AppError, AppResult};

type ChapterKey = (String, String, String);

/// Chapter store keyed by provider, series and slug
#[derive(Default)]
pub struct InMemoryChapterRepository {
    rows: RwLock<HashMap<ChapterKey, Chapter>>,
}

impl InMemoryChapterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn key(provider: &str, series: &str, slug: &str) -> ChapterKey {
        (provider.to_string(), series.to_string(), slug.to_string())
    }

    fn not_found(provider: &str, series: &str, slug: &str) -> AppError {
        AppError::NotFound(format!(
            "chapter '{}' of series '{}' ({})",
            slug, series, provider
        ))
    }

    async fn of_series(&self, provider: &str, series: &str) -> Vec<Chapter> {
        let rows = self.rows.read().await;
        let mut chapters: Vec<Chapter> = rows
            .values()
            .filter(|c| c.provider == provider && c.series == series)
            .cloned()
            .collect();
        chapters.sort_by(|a, b| a.number.total_cmp(&b.number));
        chapters
    }
}

#[async_trait]
impl ChapterRepository for InMemoryChapterRepository {
    async fn upsert_init(&self, init: &ChapterInit) -> AppResult<Chapter> {
        if init.series.trim().is_empty() || init.slug.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "chapter series and slug are required".to_string(),
            ));
        }

        let mut rows = self.rows.write().await;
        let chapter = rows
            .entry(Self::key(&init.provider, &init.series, &init.slug))
            .and_modify(|existing| existing.apply_init(init))
            .or_insert_with(|| Chapter::from_init(init));
        Ok(chapter.clone())
    }

    async fn find(&self, provider: &str, series: &str, slug: &str) -> AppResult<Chapter> {
        self.rows
            .read()
            .await
            .get(&Self::key(provider, series, slug))
            .cloned()
            .ok_or_else(|| Self::not_found(provider, series, slug))
    }

    async fn find_by_series(&self, provider: &str, series: &str) -> AppResult<Vec<Chapter>> {
        Ok(self.of_series(provider, series).await)
    }

    async fn find_latest(&self, provider: &str, series: &str) -> AppResult<Option<Chapter>> {
        Ok(self.of_series(provider, series).await.pop())
    }

    async fn count(&self, provider: &str, series: &str) -> AppResult<u32> {
        let rows = self.rows.read().await;
        let count = rows
            .values()
            .filter(|c| c.provider == provider && c.series == series)
            .count();
        Ok(count as u32)
    }

    async fn find_missing_detail(&self) -> AppResult<Vec<Chapter>> {
        let rows = self.rows.read().await;
        let mut chapters: Vec<Chapter> = rows.values().filter(|c| c.needs_detail()).cloned().collect();
        chapters.sort_by(|a, b| {
            (&a.provider, &a.series)
                .cmp(&(&b.provider, &b.series))
                .then(a.number.total_cmp(&b.number))
        });
        Ok(chapters)
    }

    async fn update_init(
        &self,
        provider: &str,
        series: &str,
        slug: &str,
        update: &ChapterDetailUpdate,
    ) -> AppResult<Chapter> {
        let mut rows = self.rows.write().await;
        let chapter = rows
            .get_mut(&Self::key(provider, series, slug))
            .ok_or_else(|| Self::not_found(provider, series, slug))?;
        chapter.apply_detail(update);
        Ok(chapter.clone())
    }
}
