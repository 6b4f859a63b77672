pub mod http_fetcher;
pub mod retry_policy;
pub mod session;
pub mod sites;
pub mod themes;

pub use http_fetcher::HttpPageFetcher;
pub use retry_policy::RetryPolicy;
pub use session::{BrowserSession, PageFetcher, SessionPool, SessionPoolStats};
pub use sites::{all_strategies, default_registry};
