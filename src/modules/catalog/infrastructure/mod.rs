pub mod cache;
pub mod decorators;
pub mod persistence;

pub use cache::MemoryCache;
pub use decorators::{CachingChapterRepository, CachingSeriesRepository};
pub use persistence::{
    InMemoryChapterRepository, InMemoryProviderRepository, InMemorySeriesRepository,
    InMemorySeriesSearch,
};
