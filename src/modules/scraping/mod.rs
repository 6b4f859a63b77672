//! Site crawling: the strategy contract, its registry and the per-site implementations.
pub mod domain;
pub mod infrastructure;
pub mod traits;

pub use domain::{ScrapeOutcome, StrategyRegistry};
pub use traits::ScrapeStrategy;
