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

/// Flame Comics. Only links under `/series/` are series; the list page also
/// links novels and announcements with the same markup.
pub struct FlameStrategy {
    site: ThemedSite,
}

impl FlameStrategy {
    pub const SLUG: &'static str = "flame";
    const SERIES_PREFIX: &'static str = "/series/";

    pub fn new(pool: Arc<SessionPool>) -> Self {
        Self {
            site: ThemedSite::new(
                Self::SLUG,
                "Flame Comics",
                "https://flamecomics.xyz",
                "/series/list-mode/",
                SiteProfile::mangareader(),
                pool,
            ),
        }
    }
}

#[async_trait]
impl ScrapeStrategy for FlameStrategy {
    fn provider(&self) -> Provider {
        self.site.provider()
    }

    async fn scrape_series_list(&self, target: &str) -> AppResult<Vec<SeriesListItem>> {
        let items = self.site.series_list(target).await?;
        Ok(items
            .into_iter()
            .filter(|item| {
                item.source_path.starts_with(Self::SERIES_PREFIX)
                    && item.source_path != Self::SERIES_PREFIX
                    && item.slug != "list-mode"
            })
            .collect())
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
