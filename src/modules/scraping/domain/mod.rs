pub mod helpers;
pub mod registry;
pub mod results;

pub use registry::StrategyRegistry;
pub use results::{ChapterDetail, ChapterListItem, ScrapeOutcome, SeriesDetail, SeriesListItem};
