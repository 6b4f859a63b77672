pub mod circuit_breaker;
pub mod logger;

pub use circuit_breaker::{BreakerSnapshot, BreakerState, CircuitBreaker};
