//! Retry policy for page fetches against source sites.

use std::time::Duration;

/// Configuration for HTTP retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Upper bound on any single wait
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Extra random wait, as a fraction of the computed delay
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::source_site()
    }
}

impl RetryPolicy {
    /// Policy for WordPress-hosted manga sites behind Cloudflare
    pub fn source_site() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }

    /// No retries; used in tests and for one-shot probes
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }

    /// Delay before retry number `attempt` (0-based), honouring `Retry-After` when given
    pub fn calculate_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(server_delay) = retry_after {
            return server_delay.min(self.max_delay);
        }

        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_millis((self.base_delay.as_millis() as f64 * multiplier) as u64);
        delay.min(self.max_delay)
    }

    /// `calculate_delay` plus random jitter so parallel crawls do not retry in lockstep
    pub fn jittered_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = self.calculate_delay(attempt, retry_after);
        if self.jitter_factor <= 0.0 {
            return delay;
        }
        let jitter_ms =
            (delay.as_millis() as f64 * self.jitter_factor * rand::random::<f64>()) as u64;
        delay + Duration::from_millis(jitter_ms)
    }
}

/// Statuses worth another attempt: rate limiting, server errors and the
/// Cloudflare 52x family
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 425 | 429 | 500..=599)
}

/// Parse a `Retry-After` header given in seconds
pub fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
