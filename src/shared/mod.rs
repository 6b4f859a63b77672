// Shared Kernel
// Cross-cutting concerns used by every bounded context

pub mod config; // Environment-driven runtime configuration
pub mod errors; // Shared error types
pub mod utils; // Logging, circuit breaker

pub use config::AppConfig;
