//! Runtime configuration loaded from the environment.
//!
//! Every key has a default so the daemon starts with an empty environment.
//! A `.env` file in the working directory is honoured through `dotenvy`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Cron expressions (seconds resolution) for the periodic jobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedules {
    pub series_list: String,
    pub series_detail: String,
    pub chapters_list: String,
    pub chapters_detail: String,
    pub republish_pending: String,
}

impl Default for CronSchedules {
    fn default() -> Self {
        Self {
            series_list: "0 0 0 * * *".to_string(),
            series_detail: "0 0 3 * * *".to_string(),
            chapters_list: "0 0 */12 * * *".to_string(),
            chapters_detail: "0 30 */12 * * *".to_string(),
            republish_pending: "0 15 * * * *".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Ceiling for one crawl attempt, whatever the request type
    pub crawl_timeout: Duration,
    pub breaker_failure_threshold: u32,
    pub breaker_cooldown: Duration,
    pub broker_partitions: usize,
    pub broker_capacity: usize,
    /// How long a publish waits for room on a full partition
    pub broker_publish_timeout: Duration,
    /// Upper bound on concurrent upserts per list result; `None` spawns one task per item
    pub max_fan_out: Option<usize>,
    pub max_browser_sessions: usize,
    pub requests_per_second: f64,
    /// Age after which a PENDING request is published again
    pub pending_republish_after: Duration,
    pub schedules: CronSchedules,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            crawl_timeout: Duration::from_secs(60),
            breaker_failure_threshold: 3,
            breaker_cooldown: Duration::from_secs(120),
            broker_partitions: 4,
            broker_capacity: 256,
            broker_publish_timeout: Duration::from_millis(500),
            max_fan_out: None,
            max_browser_sessions: 8,
            requests_per_second: 2.0,
            pending_republish_after: Duration::from_secs(1800),
            schedules: CronSchedules::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let default_schedules = defaults.schedules.clone();

        Self {
            crawl_timeout: Duration::from_secs(parse_or(
                &lookup,
                "YOMU_CRAWL_TIMEOUT_SECS",
                defaults.crawl_timeout.as_secs(),
            )),
            breaker_failure_threshold: parse_or(
                &lookup,
                "YOMU_BREAKER_FAILURE_THRESHOLD",
                defaults.breaker_failure_threshold,
            ),
            breaker_cooldown: Duration::from_secs(parse_or(
                &lookup,
                "YOMU_BREAKER_COOLDOWN_SECS",
                defaults.breaker_cooldown.as_secs(),
            )),
            broker_partitions: parse_or(&lookup, "YOMU_BROKER_PARTITIONS", defaults.broker_partitions)
                .max(1),
            broker_capacity: parse_or(&lookup, "YOMU_BROKER_CAPACITY", defaults.broker_capacity)
                .max(1),
            broker_publish_timeout: Duration::from_millis(parse_or(
                &lookup,
                "YOMU_BROKER_PUBLISH_TIMEOUT_MS",
                defaults.broker_publish_timeout.as_millis() as u64,
            )),
            max_fan_out: lookup("YOMU_MAX_FAN_OUT")
                .and_then(|raw| parse_value::<usize>("YOMU_MAX_FAN_OUT", &raw))
                .filter(|cap| *cap > 0),
            max_browser_sessions: parse_or(
                &lookup,
                "YOMU_MAX_BROWSER_SESSIONS",
                defaults.max_browser_sessions,
            )
            .max(1),
            requests_per_second: parse_or(
                &lookup,
                "YOMU_REQUESTS_PER_SECOND",
                defaults.requests_per_second,
            ),
            pending_republish_after: Duration::from_secs(parse_or(
                &lookup,
                "YOMU_PENDING_REPUBLISH_AFTER_SECS",
                defaults.pending_republish_after.as_secs(),
            )),
            schedules: CronSchedules {
                series_list: lookup("YOMU_CRON_SERIES_LIST")
                    .unwrap_or(default_schedules.series_list),
                series_detail: lookup("YOMU_CRON_SERIES_DETAIL")
                    .unwrap_or(default_schedules.series_detail),
                chapters_list: lookup("YOMU_CRON_CHAPTERS_LIST")
                    .unwrap_or(default_schedules.chapters_list),
                chapters_detail: lookup("YOMU_CRON_CHAPTERS_DETAIL")
                    .unwrap_or(default_schedules.chapters_detail),
                republish_pending: lookup("YOMU_CRON_REPUBLISH_PENDING")
                    .unwrap_or(default_schedules.republish_pending),
            },
        }
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring invalid value '{}' for {}", raw, key);
            None
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|raw| parse_value(key, &raw))
        .unwrap_or(default)
}
