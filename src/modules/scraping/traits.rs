use async_trait::async_trait;

use super::domain::results::{ChapterDetail, ChapterListItem, SeriesDetail, SeriesListItem};
use crate::modules::catalog::domain::Provider;
use crate::shared::errors::AppResult;

#[cfg(test)]
use mockall::automock;

/// Crawl contract implemented once per manga source.
///
/// Every method opens its own browsing session and releases it before
/// returning, including on error. Dropping the returned future (timeout,
/// shutdown) releases the session as well.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScrapeStrategy: Send + Sync {
    /// Catalog record used to seed the provider store
    fn provider(&self) -> Provider;

    async fn scrape_series_list(&self, target: &str) -> AppResult<Vec<SeriesListItem>>;

    async fn scrape_series_detail(&self, target: &str) -> AppResult<SeriesDetail>;

    async fn scrape_chapter_list(&self, target: &str) -> AppResult<Vec<ChapterListItem>>;

    async fn scrape_chapter_detail(&self, target: &str) -> AppResult<ChapterDetail>;
}
