use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::shared::errors::{AppError, AppResult};

/// Retrieves the HTML of one page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> AppResult<String>;
}

#[derive(Debug, Default)]
struct PoolCounters {
    active: AtomicUsize,
    opened: AtomicU64,
    pages: AtomicU64,
}

/// Hands out browsing sessions, at most `max_sessions` at a time
pub struct SessionPool {
    fetcher: Arc<dyn PageFetcher>,
    permits: Arc<Semaphore>,
    counters: Arc<PoolCounters>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPoolStats {
    pub active: usize,
    pub opened: u64,
    pub pages: u64,
}

impl SessionPool {
    pub fn new(fetcher: Arc<dyn PageFetcher>, max_sessions: usize) -> Self {
        Self {
            fetcher,
            permits: Arc::new(Semaphore::new(max_sessions.max(1))),
            counters: Arc::new(PoolCounters::default()),
        }
    }

    /// Open a session, waiting for a free slot
    pub async fn open(&self, provider: &str) -> AppResult<BrowserSession> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::Cancelled("session pool is closed".to_string()))?;

        self.counters.active.fetch_add(1, Ordering::Relaxed);
        self.counters.opened.fetch_add(1, Ordering::Relaxed);
        log::debug!("Opened browsing session for {}", provider);

        Ok(BrowserSession {
            provider: provider.to_string(),
            fetcher: self.fetcher.clone(),
            counters: self.counters.clone(),
            started: Instant::now(),
            pages: 0,
            _permit: permit,
        })
    }

    pub fn stats(&self) -> SessionPoolStats {
        SessionPoolStats {
            active: self.counters.active.load(Ordering::Relaxed),
            opened: self.counters.opened.load(Ordering::Relaxed),
            pages: self.counters.pages.load(Ordering::Relaxed),
        }
    }

    /// Refuse new sessions; sessions already open finish normally
    pub fn close(&self) {
        self.permits.close();
    }
}

/// One scoped browsing session. Navigation is sequential; the slot is
/// returned to the pool when the session is dropped.
pub struct BrowserSession {
    provider: String,
    fetcher: Arc<dyn PageFetcher>,
    counters: Arc<PoolCounters>,
    started: Instant,
    pages: u32,
    _permit: OwnedSemaphorePermit,
}

impl fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserSession")
            .field("provider", &self.provider)
            .field("pages", &self.pages)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl BrowserSession {
    /// Load `url` and return its HTML
    pub async fn navigate(&mut self, url: &str) -> AppResult<String> {
        log::debug!("[{}] navigate {}", self.provider, url);
        let html = self.fetcher.fetch(url).await?;
        self.pages += 1;
        self.counters.pages.fetch_add(1, Ordering::Relaxed);
        Ok(html)
    }

    pub fn pages_visited(&self) -> u32 {
        self.pages
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.counters.active.fetch_sub(1, Ordering::Relaxed);
        log::debug!(
            "Closed browsing session for {} after {} page(s) in {:?}",
            self.provider,
            self.pages,
            self.started.elapsed()
        );
    }
}
