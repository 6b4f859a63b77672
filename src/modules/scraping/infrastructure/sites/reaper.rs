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

/// Reaper Scans (Madara theme). Chapter links carry a `?style=list` reader
/// switch that is dropped from stored hrefs.
pub struct ReaperStrategy {
    site: ThemedSite,
}

impl ReaperStrategy {
    pub const SLUG: &'static str = "reaper";

    pub fn new(pool: Arc<SessionPool>) -> Self {
        Self {
            site: ThemedSite::new(
                Self::SLUG,
                "Reaper Scans",
                "https://reaperscans.com",
                "/manga/?m_orderby=latest",
                SiteProfile::madara(),
                pool,
            ),
        }
    }

    fn without_query(href: &str) -> String {
        href.split('?').next().unwrap_or(href).to_string()
    }
}

#[async_trait]
impl ScrapeStrategy for ReaperStrategy {
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
        let mut chapters = self.site.chapter_list(target).await?;
        for chapter in &mut chapters {
            chapter.href = Self::without_query(&chapter.href);
        }
        Ok(chapters)
    }

    async fn scrape_chapter_detail(&self, target: &str) -> AppResult<ChapterDetail> {
        self.site.chapter_detail(target).await
    }
}
