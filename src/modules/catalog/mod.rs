//! Providers, series and chapters: the records the scrape worker writes into.
pub mod domain;
pub mod infrastructure;

pub use domain::{
    CacheRepository, Chapter, ChapterRepository, Provider, ProviderRepository, Series,
    SeriesRepository, SeriesSearchRepository, SeriesStatus,
};
