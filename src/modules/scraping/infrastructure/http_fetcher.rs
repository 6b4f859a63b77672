use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{direct::NotKeyed, InMemoryState},
    Quota, RateLimiter,
};
use reqwest::{header, Client};
use std::num::NonZeroU32;
use std::time::Duration;
use tokio::time::sleep;

use super::retry_policy::{is_retryable_status, retry_after, RetryPolicy};
use super::session::PageFetcher;
use crate::shared::errors::{AppError, AppResult};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// One failed attempt and whether another one may succeed
struct FetchFailure {
    error: AppError,
    retry_after: Option<Duration>,
    retryable: bool,
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Page fetcher over `reqwest` with a shared rate limit and retries
pub struct HttpPageFetcher {
    client: Client,
    rate_limiter: DirectRateLimiter,
    retry_policy: RetryPolicy,
}

impl HttpPageFetcher {
    pub fn new(requests_per_second: f64, retry_policy: RetryPolicy) -> AppResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.9"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: Self::create_rate_limiter(requests_per_second, 2)?,
            retry_policy,
        })
    }

    fn create_rate_limiter(requests_per_second: f64, burst_size: u32) -> AppResult<DirectRateLimiter> {
        if requests_per_second.is_nan() || requests_per_second <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "requests per second must be positive, got {}",
                requests_per_second
            )));
        }

        let period = Duration::from_secs_f64(1.0 / requests_per_second);
        let burst = NonZeroU32::new(burst_size.max(1)).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(period)
            .ok_or_else(|| AppError::InvalidInput("rate limit period is zero".to_string()))?
            .allow_burst(burst);

        Ok(RateLimiter::direct(quota))
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchFailure> {
        self.rate_limiter.until_ready().await;

        let response = self.client.get(url).send().await.map_err(|e| FetchFailure {
            retryable: e.is_timeout() || e.is_connect(),
            retry_after: None,
            error: AppError::from(e),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure {
                error: AppError::ExternalServiceError(format!("HTTP {} for {}", status, url)),
                retry_after: retry_after(response.headers()),
                retryable: is_retryable_status(status.as_u16()),
            });
        }

        response.text().await.map_err(|e| FetchFailure {
            error: AppError::from(e),
            retry_after: None,
            retryable: false,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(failure) => {
                    if !failure.retryable || attempt >= self.retry_policy.max_retries {
                        return Err(failure.error);
                    }
                    let delay = self
                        .retry_policy
                        .jittered_delay(attempt, failure.retry_after);
                    log::warn!(
                        "Fetch of {} failed (attempt {}/{}): {}. Retrying in {:?}",
                        url,
                        attempt + 1,
                        self.retry_policy.max_retries + 1,
                        failure.error,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
