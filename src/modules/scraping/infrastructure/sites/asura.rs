use async_trait::async_trait;
use std::sync::Arc;

use super::ThemedSite;
use crate::modules::catalog::domain::Provider;
use crate::modules::scraping::domain::helpers::strip_numeric_prefix;
use crate::modules::scraping::domain::{
    ChapterDetail, ChapterListItem, SeriesDetail, SeriesListItem,
};
use crate::modules::scraping::infrastructure::session::SessionPool;
use crate::modules::scraping::infrastructure::themes::SiteProfile;
use crate::modules::scraping::traits::ScrapeStrategy;
use crate::shared::errors::AppResult;

/// Asura Scans (MangaReader theme).
///
/// Asura rotates a numeric ID in front of every slug
/// (`/manga/1672760368-reincarnator/`), so slugs are stored without it.
pub struct AsuraStrategy {
    site: ThemedSite,
}

impl AsuraStrategy {
    pub const SLUG: &'static str = "asura";

    pub fn new(pool: Arc<SessionPool>) -> Self {
        Self {
            site: ThemedSite::new(
                Self::SLUG,
                "Asura Scans",
                "https://asuratoon.com",
                "/manga/list-mode/",
                SiteProfile::mangareader(),
                pool,
            ),
        }
    }
}

#[async_trait]
impl ScrapeStrategy for AsuraStrategy {
    fn provider(&self) -> Provider {
        self.site.provider()
    }

    async fn scrape_series_list(&self, target: &str) -> AppResult<Vec<SeriesListItem>> {
        let mut items = self.site.series_list(target).await?;
        for item in &mut items {
            item.slug = strip_numeric_prefix(&item.slug);
        }
        Ok(items)
    }

    async fn scrape_series_detail(&self, target: &str) -> AppResult<SeriesDetail> {
        self.site.series_detail(target).await
    }

    async fn scrape_chapter_list(&self, target: &str) -> AppResult<Vec<ChapterListItem>> {
        let mut chapters = self.site.chapter_list(target).await?;
        for chapter in &mut chapters {
            chapter.slug = strip_numeric_prefix(&chapter.slug);
        }
        Ok(chapters)
    }

    async fn scrape_chapter_detail(&self, target: &str) -> AppResult<ChapterDetail> {
        let mut detail = self.site.chapter_detail(target).await?;
        detail.next_slug = detail.next_slug.map(|s| strip_numeric_prefix(&s));
        detail.prev_slug = detail.prev_slug.map(|s| strip_numeric_prefix(&s));
        Ok(detail)
    }
}
