pub mod entities;
pub mod repository;

pub use entities::{CronJob, CronJobState, CronJobStatus, JobSummary, ScheduledJob};
pub use repository::CronJobRepository;
