use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use super::entities::{CronJob, CronJobStatus};
use crate::shared::errors::AppResult;

/// Cron job registry plus the append-only run log
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CronJobRepository: Send + Sync {
    /// Insert or refresh a job definition; the ID is stable per job name
    async fn register(&self, job: &CronJob) -> AppResult<CronJob>;
    async fn append_status(&self, status: &CronJobStatus) -> AppResult<()>;
    /// Run log of one job, oldest first
    async fn find_statuses(&self, job_id: Uuid) -> AppResult<Vec<CronJobStatus>>;
}
