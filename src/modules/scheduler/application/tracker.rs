use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::modules::scheduler::domain::ScheduledJob;

#[derive(Debug, Default)]
struct JobSlot {
    running: AtomicBool,
    runs: AtomicU64,
    failures: AtomicU64,
    skipped: AtomicU64,
    last_duration_ms: AtomicU64,
}

/// Per-job run bookkeeping for one scheduler instance.
///
/// Owns the single-flight flag: a job fires only when its previous run has
/// finished.
#[derive(Debug, Default)]
pub struct JobRunTracker {
    slots: DashMap<ScheduledJob, Arc<JobSlot>>,
}

impl JobRunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, job: ScheduledJob) -> Arc<JobSlot> {
        self.slots.entry(job).or_default().clone()
    }

    /// Claim the job; `None` while a previous run is still in flight
    pub fn try_begin(&self, job: ScheduledJob) -> Option<RunGuard> {
        let slot = self.slot(job);
        if slot
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            slot.skipped.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        Some(RunGuard { slot })
    }

    pub fn stats(&self, job: ScheduledJob) -> JobRunStats {
        let slot = self.slot(job);
        JobRunStats {
            running: slot.running.load(Ordering::Acquire),
            runs: slot.runs.load(Ordering::Relaxed),
            failures: slot.failures.load(Ordering::Relaxed),
            skipped: slot.skipped.load(Ordering::Relaxed),
            last_duration_ms: slot.last_duration_ms.load(Ordering::Relaxed),
        }
    }
}

/// Held for the duration of one run; dropping it releases the job
#[derive(Debug)]
pub struct RunGuard {
    slot: Arc<JobSlot>,
}

impl RunGuard {
    pub fn finish(self, succeeded: bool, duration_ms: u64) {
        self.slot.runs.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.slot.failures.fetch_add(1, Ordering::Relaxed);
        }
        self.slot
            .last_duration_ms
            .store(duration_ms, Ordering::Relaxed);
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.slot.running.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRunStats {
    pub running: bool,
    pub runs: u64,
    pub failures: u64,
    pub skipped: u64,
    pub last_duration_ms: u64,
}
