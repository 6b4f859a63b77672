//! Control loop: cron jobs that find stale catalog data and enqueue scrape requests.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod scheduler;

pub use application::{ControlLoop, JobExecutor, JobRun, JobRunTracker};
pub use domain::{CronJob, CronJobRepository, CronJobState, CronJobStatus, JobSummary, ScheduledJob};
pub use infrastructure::InMemoryCronJobRepository;
pub use scheduler::Scheduler;
