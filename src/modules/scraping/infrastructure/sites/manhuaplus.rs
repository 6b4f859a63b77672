use async_trait::async_trait;
use std::sync::Arc;

use super::ThemedSite;
use crate::modules::catalog::domain::Provider;
use crate::modules::scraping::domain::{
    ChapterDetail, ChapterListItem, SeriesDetail, SeriesListItem,
};
use crate::modules::scraping::infrastructure::session::SessionPool;
use crate::modules::scraping::infrastructure::themes::SiteProfile;
use crate::modules::scraping::traits::ScrapeStrategy;
use crate::shared::errors::AppResult;

/// ManhuaPlus (Madara theme) marks series cards with an extra `manga` class;
/// other cards on the list page are ads.
pub struct ManhuaPlusStrategy {
    site: ThemedSite,
}

impl ManhuaPlusStrategy {
    pub const SLUG: &'static str = "manhuaplus";

    pub fn new(pool: Arc<SessionPool>) -> Self {
        Self {
            site: ThemedSite::new(
                Self::SLUG,
                "ManhuaPlus",
                "https://manhuaplus.com",
                "/manga/",
                SiteProfile::madara().with_series_link(
                    "div.page-item-detail.manga div.post-title a, div.page-item-detail.manga h3 a",
                ),
                pool,
            ),
        }
    }
}

#[async_trait]
impl ScrapeStrategy for ManhuaPlusStrategy {
    fn provider(&self) -> Provider {
        self.site.provider()
    }

    async fn scrape_series_list(&self, target: &str) -> AppResult<Vec<SeriesListItem>> {
        self.site.series_list(target).await
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
