pub mod entities;
pub mod repositories;

pub use entities::{
    join_url, Chapter, ChapterDetailUpdate, ChapterInit, Provider, Series, SeriesDetailUpdate,
    SeriesInit, SeriesLatestUpdate, SeriesStatus,
};
pub use repositories::{
    CacheRepository, ChapterRepository, ProviderRepository, SeriesRepository,
    SeriesSearchRepository,
};
