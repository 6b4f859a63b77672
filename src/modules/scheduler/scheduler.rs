use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use super::application::{JobExecutor, JobRun, JobRunStats};
use super::domain::{CronJob, CronJobStatus, ScheduledJob};
use crate::shared::config::CronSchedules;
use crate::shared::errors::{AppResult, ResultExt};
use crate::{log_error, log_info};

/// Cron front end of the control loop.
///
/// Every job gets its own timer; a fire that lands while the previous run of
/// the same job is still going is skipped until the next tick.
pub struct Scheduler {
    executor: Arc<JobExecutor>,
    schedules: CronSchedules,
    cron: Option<JobScheduler>,
}

impl Scheduler {
    pub fn new(executor: JobExecutor, schedules: CronSchedules) -> Self {
        Self {
            executor: Arc::new(executor),
            schedules,
            cron: None,
        }
    }

    fn schedule_of(&self, job: ScheduledJob) -> &str {
        match job {
            ScheduledJob::ScrapeSeriesList => &self.schedules.series_list,
            ScheduledJob::ScrapeSeriesDetail => &self.schedules.series_detail,
            ScheduledJob::ScrapeChaptersList => &self.schedules.chapters_list,
            ScheduledJob::ScrapeChaptersDetail => &self.schedules.chapters_detail,
            ScheduledJob::RepublishPending => &self.schedules.republish_pending,
        }
    }

    /// Record every job definition in the repository
    pub async fn register_all(&self) -> AppResult<Vec<CronJob>> {
        let mut jobs = Vec::with_capacity(ScheduledJob::ALL.len());
        for job in ScheduledJob::ALL {
            let definition = CronJob::new(job, self.schedule_of(job));
            jobs.push(
                self.executor
                    .repository()
                    .register(&definition)
                    .await
                    .within("CronJobRepository::register")?,
            );
        }
        Ok(jobs)
    }

    pub async fn start(&mut self) -> AppResult<()> {
        self.register_all().await?;
        let cron = JobScheduler::new().await?;

        for job in ScheduledJob::ALL {
            let schedule = self.schedule_of(job).to_string();
            let executor = self.executor.clone();
            let cron_job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
                let executor = executor.clone();
                Box::pin(async move {
                    if let Err(e) = executor.execute(job).await {
                        log_error!("Scheduled job {} could not run: {}", job, e);
                    }
                })
            })
            .within(&format!("schedule {} ({})", job, schedule))?;
            cron.add(cron_job).await?;
        }

        cron.start().await?;
        log_info!("Scheduler started with {} jobs", ScheduledJob::ALL.len());
        self.cron = Some(cron);
        Ok(())
    }

    /// Run one job immediately, outside its timer
    pub async fn run_now(&self, job: ScheduledJob) -> AppResult<JobRun> {
        self.executor
            .repository()
            .register(&CronJob::new(job, self.schedule_of(job)))
            .await
            .within("CronJobRepository::register")?;
        self.executor.execute(job).await
    }

    pub async fn history(&self, job: ScheduledJob) -> AppResult<Vec<CronJobStatus>> {
        self.executor.repository().find_statuses(job.id()).await
    }

    pub fn stats(&self, job: ScheduledJob) -> JobRunStats {
        self.executor.stats(job)
    }

    pub async fn shutdown(&mut self) -> AppResult<()> {
        if let Some(mut cron) = self.cron.take() {
            cron.shutdown().await?;
            log_info!("Scheduler stopped");
        }
        Ok(())
    }
}
