//! One strategy per source site, built on the theme extractors.

mod asura;
mod drake;
mod flame;
mod luminous;
mod manhuaplus;
mod night;
mod reaper;
mod rizz;

pub use asura::AsuraStrategy;
pub use drake::DrakeStrategy;
pub use flame::FlameStrategy;
pub use luminous::LuminousStrategy;
pub use manhuaplus::ManhuaPlusStrategy;
pub use night::NightStrategy;
pub use reaper::ReaperStrategy;
pub use rizz::RizzStrategy;

use std::sync::Arc;

use super::session::SessionPool;
use super::themes::{extract, SiteProfile};
use crate::modules::catalog::domain::Provider;
use crate::modules::scraping::domain::{
    ChapterDetail, ChapterListItem, SeriesDetail, SeriesListItem, StrategyRegistry,
};
use crate::modules::scraping::traits::ScrapeStrategy;
use crate::shared::errors::AppResult;

/// Session handling and theme extraction shared by the site strategies.
///
/// Each call opens one session, loads one page and parses it; the session
/// is gone before the parsed result is returned.
pub(crate) struct ThemedSite {
    slug: &'static str,
    name: &'static str,
    base_url: &'static str,
    list_path: &'static str,
    profile: SiteProfile,
    pool: Arc<SessionPool>,
}

impl ThemedSite {
    pub(crate) fn new(
        slug: &'static str,
        name: &'static str,
        base_url: &'static str,
        list_path: &'static str,
        profile: SiteProfile,
        pool: Arc<SessionPool>,
    ) -> Self {
        Self {
            slug,
            name,
            base_url,
            list_path,
            profile,
            pool,
        }
    }

    pub(crate) fn provider(&self) -> Provider {
        Provider {
            slug: self.slug.to_string(),
            name: self.name.to_string(),
            active: true,
            base_url: self.base_url.to_string(),
            list_path: self.list_path.to_string(),
        }
    }

    async fn page(&self, target: &str) -> AppResult<String> {
        let mut session = self.pool.open(self.slug).await?;
        session.navigate(target).await
    }

    pub(crate) async fn series_list(&self, target: &str) -> AppResult<Vec<SeriesListItem>> {
        let html = self.page(target).await?;
        extract::series_list(&html, &self.profile)
    }

    pub(crate) async fn series_detail(&self, target: &str) -> AppResult<SeriesDetail> {
        let html = self.page(target).await?;
        extract::series_detail(&html, &self.profile, target)
    }

    pub(crate) async fn chapter_list(&self, target: &str) -> AppResult<Vec<ChapterListItem>> {
        let html = self.page(target).await?;
        extract::chapter_list(&html, &self.profile)
    }

    pub(crate) async fn chapter_detail(&self, target: &str) -> AppResult<ChapterDetail> {
        let html = self.page(target).await?;
        extract::chapter_detail(&html, &self.profile, target)
    }
}

/// Every built-in strategy, sharing one session pool
pub fn all_strategies(pool: Arc<SessionPool>) -> Vec<Arc<dyn ScrapeStrategy>> {
    vec![
        Arc::new(AsuraStrategy::new(pool.clone())),
        Arc::new(FlameStrategy::new(pool.clone())),
        Arc::new(LuminousStrategy::new(pool.clone())),
        Arc::new(DrakeStrategy::new(pool.clone())),
        Arc::new(NightStrategy::new(pool.clone())),
        Arc::new(RizzStrategy::new(pool.clone())),
        Arc::new(ReaperStrategy::new(pool.clone())),
        Arc::new(ManhuaPlusStrategy::new(pool)),
    ]
}

/// Registry holding every built-in strategy
pub fn default_registry(pool: Arc<SessionPool>) -> StrategyRegistry {
    all_strategies(pool)
        .into_iter()
        .fold(StrategyRegistry::new(), |registry, strategy| {
            registry.with(strategy)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::scraping::infrastructure::session::PageFetcher;
    use async_trait::async_trait;

    struct FixtureFetcher(&'static str);

    #[async_trait]
    impl PageFetcher for FixtureFetcher {
        async fn fetch(&self, _url: &str) -> AppResult<String> {
            Ok(self.0.to_string())
        }
    }

    fn pool(page: &'static str) -> Arc<SessionPool> {
        Arc::new(SessionPool::new(Arc::new(FixtureFetcher(page)), 2))
    }

    #[test]
    fn test_default_registry_has_eight_sources() {
        let registry = default_registry(pool(""));
        let slugs: Vec<String> = registry.providers().into_iter().map(|p| p.slug).collect();

        assert_eq!(
            slugs,
            vec![
                "asura",
                "drake",
                "flame",
                "luminous",
                "manhuaplus",
                "night",
                "reaper",
                "rizz"
            ]
        );
    }

    #[tokio::test]
    async fn test_asura_strips_numeric_slug_prefix() {
        let page = r#"
            <div class="listupd">
              <div class="bs"><div class="bsx"><a href="https://asuratoon.com/manga/1672760368-reincarnator/" title="Reincarnator">x</a></div></div>
            </div>"#;
        let strategy = AsuraStrategy::new(pool(page));

        let items = strategy
            .scrape_series_list("https://asuratoon.com/manga/list-mode/")
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug, "reincarnator");
        assert_eq!(items[0].source_path, "/manga/1672760368-reincarnator/");
    }

    #[tokio::test]
    async fn test_session_is_released_after_each_crawl() {
        let shared = pool("<html></html>");
        let strategy = FlameStrategy::new(shared.clone());

        assert!(strategy
            .scrape_chapter_detail("https://flamecomics.xyz/x-chapter-1/")
            .await
            .is_err());
        assert_eq!(shared.stats().active, 0);
        assert_eq!(shared.stats().opened, 1);
    }
}
