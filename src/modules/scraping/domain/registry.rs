use std::collections::BTreeMap;
use std::sync::Arc;

use super::results::ScrapeOutcome;
use crate::modules::catalog::domain::Provider;
use crate::modules::scrape_request::domain::ScrapeRequestType;
use crate::modules::scraping::traits::ScrapeStrategy;
use crate::shared::errors::{AppError, AppResult, ResultExt};

/// Lookup table from provider slug to its strategy
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    strategies: BTreeMap<String, Arc<dyn ScrapeStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy under the slug of its provider record
    pub fn register(&mut self, strategy: Arc<dyn ScrapeStrategy>) -> &mut Self {
        let slug = strategy.provider().slug;
        if self.strategies.insert(slug.clone(), strategy).is_some() {
            log::warn!("Strategy for provider '{}' replaced", slug);
        }
        self
    }

    pub fn with(mut self, strategy: Arc<dyn ScrapeStrategy>) -> Self {
        self.register(strategy);
        self
    }

    pub fn get(&self, provider: &str) -> AppResult<Arc<dyn ScrapeStrategy>> {
        self.strategies
            .get(provider)
            .cloned()
            .ok_or_else(|| AppError::InvalidInput(format!("unknown provider '{}'", provider)))
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.strategies.contains_key(provider)
    }

    /// Provider records of every registered strategy, ordered by slug
    pub fn providers(&self) -> Vec<Provider> {
        self.strategies.values().map(|s| s.provider()).collect()
    }

    /// Run the crawl matching `request_type` on the provider's strategy.
    ///
    /// An unknown provider fails with `InvalidInput` before anything is crawled.
    pub async fn dispatch(
        &self,
        provider: &str,
        request_type: ScrapeRequestType,
        target: &str,
    ) -> AppResult<ScrapeOutcome> {
        let strategy = self.get(provider)?;
        let operation = format!("{}::{}", provider, request_type);

        let outcome = match request_type {
            ScrapeRequestType::SeriesList => strategy
                .scrape_series_list(target)
                .await
                .map(ScrapeOutcome::SeriesList),
            ScrapeRequestType::SeriesDetail => strategy
                .scrape_series_detail(target)
                .await
                .map(ScrapeOutcome::SeriesDetail),
            ScrapeRequestType::ChapterList => strategy
                .scrape_chapter_list(target)
                .await
                .map(ScrapeOutcome::ChapterList),
            ScrapeRequestType::ChapterDetail => strategy
                .scrape_chapter_detail(target)
                .await
                .map(ScrapeOutcome::ChapterDetail),
        };

        outcome.within(&operation)
    }
}
