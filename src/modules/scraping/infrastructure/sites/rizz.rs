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

/// Rizz Comic prefixes slugs with a release tag (`/series/r2311170-solo-leveling/`)
pub struct RizzStrategy {
    site: ThemedSite,
}

impl RizzStrategy {
    pub const SLUG: &'static str = "rizz";

    pub fn new(pool: Arc<SessionPool>) -> Self {
        Self {
            site: ThemedSite::new(
                Self::SLUG,
                "Rizz Comic",
                "https://rizzcomic.com",
                "/series/list-mode/",
                SiteProfile::mangareader(),
                pool,
            ),
        }
    }
}

#[async_trait]
impl ScrapeStrategy for RizzStrategy {
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
        self.site.chapter_detail(target).await
    }
}
