pub mod executor;
pub mod jobs;
pub mod tracker;

pub use executor::{JobExecutor, JobRun};
pub use jobs::ControlLoop;
pub use tracker::{JobRunStats, JobRunTracker};
