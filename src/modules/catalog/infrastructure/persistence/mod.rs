mod memory_chapter_repository;
mod memory_provider_repository;
mod memory_search_index;
mod memory_series_repository;

pub use memory_chapter_repository::InMemoryChapterRepository;
pub use memory_provider_repository::InMemoryProviderRepository;
pub use memory_search_index::InMemorySeriesSearch;
pub use memory_series_repository::InMemorySeriesRepository;
