use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::modules::scheduler::domain::{CronJob, CronJobRepository, CronJobStatus};
use crate::shared::errors::{AppError, AppResult};

#[derive(Default)]
pub struct InMemoryCronJobRepository {
    jobs: RwLock<HashMap<Uuid, CronJob>>,
    statuses: RwLock<Vec<CronJobStatus>>,
}

impl InMemoryCronJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn jobs(&self) -> Vec<CronJob> {
        let mut jobs: Vec<_> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| a.name.cmp(&b.name));
        jobs
    }
}

#[async_trait]
impl CronJobRepository for InMemoryCronJobRepository {
    async fn register(&self, job: &CronJob) -> AppResult<CronJob> {
        if job.schedule.trim().is_empty() {
            return Err(AppError::InvalidInput(format!(
                "cron job '{}' has no schedule",
                job.name
            )));
        }
        self.jobs.write().await.insert(job.id, job.clone());
        Ok(job.clone())
    }

    async fn append_status(&self, status: &CronJobStatus) -> AppResult<()> {
        if !self.jobs.read().await.contains_key(&status.job_id) {
            return Err(AppError::NotFound(format!("cron job {}", status.job_id)));
        }
        self.statuses.write().await.push(status.clone());
        Ok(())
    }

    async fn find_statuses(&self, job_id: Uuid) -> AppResult<Vec<CronJobStatus>> {
        Ok(self
            .statuses
            .read()
            .await
            .iter()
            .filter(|status| status.job_id == job_id)
            .cloned()
            .collect())
    }
}
