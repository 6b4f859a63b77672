use crate::shared::errors::{AppError, AppResult};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Observable breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed,
    Open { since: Instant },
    /// Cool-down elapsed; a single trial call is allowed through.
    HalfOpen { trial_started: Instant },
}

#[derive(Debug)]
struct BreakerInner {
    phase: Phase,
    consecutive_failures: u32,
}

/// Consecutive-failure circuit breaker.
///
/// Opens after `failure_threshold` consecutive failures, rejects every call for
/// `cooldown`, then lets one trial through. A successful trial closes the
/// breaker, a failed one re-opens it for another cool-down.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    cooldown: Duration,
    inner: Mutex<BreakerInner>,
    total_calls: AtomicU64,
    rejected_calls: AtomicU64,
}

impl CircuitBreaker {
    pub fn new(name: &str, failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            name: name.to_string(),
            failure_threshold: failure_threshold.max(1),
            cooldown,
            inner: Mutex::new(BreakerInner {
                phase: Phase::Closed,
                consecutive_failures: 0,
            }),
            total_calls: AtomicU64::new(0),
            rejected_calls: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Ask for permission to run one call
    pub fn try_acquire(&self) -> AppResult<()> {
        let mut inner = self.lock();
        let now = Instant::now();
        let phase = inner.phase;

        let admitted = match phase {
            Phase::Closed => true,
            Phase::Open { since } if now.duration_since(since) >= self.cooldown => {
                log::info!(
                    "Circuit breaker '{}' half-open after {:?} cool-down",
                    self.name,
                    self.cooldown
                );
                inner.phase = Phase::HalfOpen { trial_started: now };
                true
            }
            Phase::Open { .. } => false,
            // A trial that never reported back must not wedge the breaker forever.
            Phase::HalfOpen { trial_started }
                if now.duration_since(trial_started) >= self.cooldown =>
            {
                inner.phase = Phase::HalfOpen { trial_started: now };
                true
            }
            Phase::HalfOpen { .. } => false,
        };

        if admitted {
            self.total_calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        } else {
            self.rejected_calls.fetch_add(1, Ordering::Relaxed);
            Err(AppError::CircuitOpen)
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        if !matches!(inner.phase, Phase::Closed) {
            log::info!("Circuit breaker '{}' closed", self.name);
        }
        inner.phase = Phase::Closed;
        inner.consecutive_failures = 0;
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;
        let phase = inner.phase;

        let trip = match phase {
            Phase::HalfOpen { .. } => true,
            Phase::Closed => inner.consecutive_failures >= self.failure_threshold,
            Phase::Open { .. } => false,
        };

        if trip {
            log::warn!(
                "Circuit breaker '{}' opened after {} consecutive failures",
                self.name,
                inner.consecutive_failures
            );
            inner.phase = Phase::Open {
                since: Instant::now(),
            };
        }
    }

    /// Run `operation` under the breaker, reporting its outcome back.
    pub async fn call<T, F>(&self, operation: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.try_acquire()?;

        let result = operation.await;
        match &result {
            Ok(_) => self.record_success(),
            Err(_) => self.record_failure(),
        }
        result
    }

    pub fn state(&self) -> BreakerState {
        match self.lock().phase {
            Phase::Closed => BreakerState::Closed,
            Phase::Open { .. } => BreakerState::Open,
            Phase::HalfOpen { .. } => BreakerState::HalfOpen,
        }
    }

    /// Create a lightweight snapshot for monitoring
    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        BreakerSnapshot {
            state: match inner.phase {
                Phase::Closed => BreakerState::Closed,
                Phase::Open { .. } => BreakerState::Open,
                Phase::HalfOpen { .. } => BreakerState::HalfOpen,
            },
            consecutive_failures: inner.consecutive_failures,
            total_calls: self.total_calls.load(Ordering::Relaxed),
            rejected_calls: self.rejected_calls.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub consecutive_failures: u32,
    pub total_calls: u64,
    pub rejected_calls: u64,
}
