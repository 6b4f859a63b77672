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

/// Drake Comic lazy-loads images through a plugin that leaves a placeholder in `src`
pub struct DrakeStrategy {
    site: ThemedSite,
}

impl DrakeStrategy {
    pub const SLUG: &'static str = "drake";

    pub fn new(pool: Arc<SessionPool>) -> Self {
        Self {
            site: ThemedSite::new(
                Self::SLUG,
                "Drake Comic",
                "https://drakecomic.org",
                "/manga/list-mode/",
                SiteProfile::mangareader().with_image_attrs(&["data-lazy-src", "data-src", "src"]),
                pool,
            ),
        }
    }
}

#[async_trait]
impl ScrapeStrategy for DrakeStrategy {
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
