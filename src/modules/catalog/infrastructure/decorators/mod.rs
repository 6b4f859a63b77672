mod cache_aside;
mod caching_chapter_repository;
mod caching_series_repository;

pub use caching_chapter_repository::CachingChapterRepository;
pub use caching_series_repository::CachingSeriesRepository;
