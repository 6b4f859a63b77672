use std::sync::Arc;

use super::jobs::ControlLoop;
use super::tracker::{JobRunStats, JobRunTracker};
use crate::modules::scheduler::domain::{
    CronJobRepository, CronJobStatus, JobSummary, ScheduledJob,
};
use crate::shared::errors::AppResult;
use crate::shared::utils::logger::{LogContext, TimedOperation};
use crate::{log_error, log_info, log_warn};

/// What happened to one fire of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRun {
    Completed(JobSummary),
    Failed(String),
    /// The previous run of the same job was still in flight
    Skipped,
}

/// Runs one job body with single-flight, timing and the status log around it
pub struct JobExecutor {
    control: ControlLoop,
    repository: Arc<dyn CronJobRepository>,
    tracker: JobRunTracker,
}

impl JobExecutor {
    pub fn new(control: ControlLoop, repository: Arc<dyn CronJobRepository>) -> Self {
        Self {
            control,
            repository,
            tracker: JobRunTracker::new(),
        }
    }

    pub fn repository(&self) -> &Arc<dyn CronJobRepository> {
        &self.repository
    }

    pub fn stats(&self, job: ScheduledJob) -> JobRunStats {
        self.tracker.stats(job)
    }

    pub async fn execute(&self, job: ScheduledJob) -> AppResult<JobRun> {
        let Some(guard) = self.tracker.try_begin(job) else {
            log_warn!("Job {} still running, skipping this fire", job);
            return Ok(JobRun::Skipped);
        };

        self.repository
            .append_status(&CronJobStatus::started(job))
            .await?;
        log_info!("Job {} started", job);

        let timer = TimedOperation::new(job.name());
        let result = self.control.run(job).await;
        let duration = timer.elapsed_secs();
        let duration_ms = timer.finish();

        let (status, run) = match result {
            Ok(summary) => {
                LogContext::job_run(job.name(), "completed", summary.enqueued, summary.failed);
                (
                    CronJobStatus::completed(job, summary.to_string(), duration),
                    JobRun::Completed(summary),
                )
            }
            Err(e) => {
                log_error!("Job {} failed: {}", job, e);
                LogContext::job_run(job.name(), "failed", 0, 0);
                (
                    CronJobStatus::failed(job, e.to_string(), duration),
                    JobRun::Failed(e.to_string()),
                )
            }
        };
        guard.finish(matches!(run, JobRun::Completed(_)), duration_ms);

        self.repository.append_status(&status).await?;
        Ok(run)
    }
}
