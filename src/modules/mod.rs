// Bounded contexts
pub mod catalog; // Providers, series, chapters and their caching
pub mod scheduler; // Cron control loop
pub mod scrape_request; // Intake, broker hand-off, worker
pub mod scraping; // Provider strategies and the page fetching behind them
