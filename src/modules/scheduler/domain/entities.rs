/// Scheduler bookkeeping: registered cron jobs and their append-only run log
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::errors::AppError;

/// The periodic jobs the control loop knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduledJob {
    ScrapeSeriesList,
    ScrapeSeriesDetail,
    ScrapeChaptersList,
    ScrapeChaptersDetail,
    RepublishPending,
}

impl ScheduledJob {
    pub const ALL: [ScheduledJob; 5] = [
        ScheduledJob::ScrapeSeriesList,
        ScheduledJob::ScrapeSeriesDetail,
        ScheduledJob::ScrapeChaptersList,
        ScheduledJob::ScrapeChaptersDetail,
        ScheduledJob::RepublishPending,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScheduledJob::ScrapeSeriesList => "scrape-series-list",
            ScheduledJob::ScrapeSeriesDetail => "scrape-series-detail",
            ScheduledJob::ScrapeChaptersList => "scrape-chapters-list",
            ScheduledJob::ScrapeChaptersDetail => "scrape-chapters-detail",
            ScheduledJob::RepublishPending => "republish-pending",
        }
    }

    /// Stable across restarts: derived from the job name
    pub fn id(self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.name().as_bytes())
    }
}

impl fmt::Display for ScheduledJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScheduledJob {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|job| job.name() == wanted)
            .ok_or_else(|| AppError::InvalidInput(format!("unknown cron job '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronJob {
    pub id: Uuid,
    pub name: String,
    /// Six-field crontab expression, seconds first
    pub schedule: String,
}

impl CronJob {
    pub fn new(job: ScheduledJob, schedule: &str) -> Self {
        Self {
            id: job.id(),
            name: job.name().to_string(),
            schedule: schedule.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CronJobState {
    Started,
    Completed,
    Failed,
}

impl fmt::Display for CronJobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CronJobState::Started => write!(f, "started"),
            CronJobState::Completed => write!(f, "completed"),
            CronJobState::Failed => write!(f, "failed"),
        }
    }
}

/// One row of a job's execution log. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronJobStatus {
    pub id: Uuid,
    pub job_id: Uuid,
    pub state: CronJobState,
    pub message: String,
    /// Seconds; zero on the `started` row
    pub duration: f64,
    pub created_at: DateTime<Utc>,
}

impl CronJobStatus {
    pub fn started(job: ScheduledJob) -> Self {
        Self::row(job, CronJobState::Started, "started".to_string(), 0.0)
    }

    pub fn completed(job: ScheduledJob, message: String, duration: f64) -> Self {
        Self::row(job, CronJobState::Completed, message, duration)
    }

    pub fn failed(job: ScheduledJob, message: String, duration: f64) -> Self {
        Self::row(job, CronJobState::Failed, message, duration)
    }

    fn row(job: ScheduledJob, state: CronJobState, message: String, duration: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id: job.id(),
            state,
            message,
            duration,
            created_at: Utc::now(),
        }
    }
}

/// Counts reported by one job run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub enqueued: usize,
    pub failed: usize,
}

impl JobSummary {
    pub fn record<T, E>(&mut self, result: &Result<T, E>) {
        match result {
            Ok(_) => self.enqueued += 1,
            Err(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} enqueued, {} failed", self.enqueued, self.failed)
    }
}
