use async_trait::async_trait;
use std::sync::Arc;

use super::ThemedSite;
use crate::modules::catalog::domain::Provider;
use crate::modules::scraping::domain::helpers::strip_hash_suffix;
use crate::modules::scraping::domain::{
    ChapterDetail, ChapterListItem, SeriesDetail, SeriesListItem,
};
use crate::modules::scraping::infrastructure::session::SessionPool;
use crate::modules::scraping::infrastructure::themes::SiteProfile;
use crate::modules::scraping::traits::ScrapeStrategy;
use crate::shared::errors::AppResult;

/// Luminous Scans appends a hash to series slugs (`/series/villain-a1b2c3d4/`)
pub struct LuminousStrategy {
    site: ThemedSite,
}

impl LuminousStrategy {
    pub const SLUG: &'static str = "luminous";

    pub fn new(pool: Arc<SessionPool>) -> Self {
        Self {
            site: ThemedSite::new(
                Self::SLUG,
                "Luminous Scans",
                "https://luminousscans.net",
                "/series/list-mode/",
                SiteProfile::mangareader(),
                pool,
            ),
        }
    }
}

#[async_trait]
impl ScrapeStrategy for LuminousStrategy {
    fn provider(&self) -> Provider {
        self.site.provider()
    }

    async fn scrape_series_list(&self, target: &str) -> AppResult<Vec<SeriesListItem>> {
        let mut items = self.site.series_list(target).await?;
        for item in &mut items {
            item.slug = strip_hash_suffix(&item.slug);
        }
        Ok(items)
    }

    async fn scrape_series_detail(&self, target: &str) -> AppResult<SeriesDetail> {
        self.site.series_detail(target).await
    }

    async fn scrape_chapter_list(&self, target: &str) -> AppResult<Vec<ChapterListItem>> {
        self.site.chapter_list(target).await
    }

    async fn scrape_chapter_detail(&self, target: &str) -> AppResult<ChapterDetail> {
        self.site.chapter_detail(target).await
    }
}
