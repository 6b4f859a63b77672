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

/// Night Scans. Locked (early-access) chapters are listed but unreadable,
/// and reader titles carry the site name.
pub struct NightStrategy {
    site: ThemedSite,
}

impl NightStrategy {
    pub const SLUG: &'static str = "night";
    const TITLE_SUFFIXES: [&'static str; 2] = [" - Night Scans", " | Night Scans"];

    pub fn new(pool: Arc<SessionPool>) -> Self {
        Self {
            site: ThemedSite::new(
                Self::SLUG,
                "Night Scans",
                "https://nightscans.net",
                "/series/list-mode/",
                SiteProfile::mangareader().with_chapter_item("#chapterlist li:not(.locked)"),
                pool,
            ),
        }
    }

    fn strip_site_name(title: &str) -> String {
        Self::TITLE_SUFFIXES
            .iter()
            .find_map(|suffix| title.strip_suffix(suffix))
            .unwrap_or(title)
            .trim()
            .to_string()
    }
}

#[async_trait]
impl ScrapeStrategy for NightStrategy {
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
        let mut detail = self.site.chapter_detail(target).await?;
        detail.full_title = Self::strip_site_name(&detail.full_title);
        Ok(detail)
    }
}
