/// Control loop jobs and the cron scheduler around them
///
/// Tests cover:
/// - Each job enqueues one request per provider, series or chapter
/// - Only the series list job is limited to active providers
/// - Per-item enqueue failures are counted, not fatal
/// - A failing discovery query marks the run failed
/// - Every run appends started + completed/failed rows
/// - The cron timer fires jobs and shuts down cleanly
mod utils;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use yomu_lib::modules::catalog::domain::{
    ChapterRepository, Provider, ProviderRepository, SeriesRepository,
};
use yomu_lib::modules::catalog::infrastructure::{
    InMemoryChapterRepository, InMemoryProviderRepository, InMemorySeriesRepository,
};
use yomu_lib::modules::scheduler::{
    ControlLoop, CronJobState, InMemoryCronJobRepository, JobExecutor, JobRun, JobSummary,
    ScheduledJob, Scheduler,
};
use yomu_lib::modules::scrape_request::domain::{ScrapeRequest, ScrapeRequestType};
use yomu_lib::modules::scrape_request::infrastructure::InMemoryScrapeRequestRepository;
use yomu_lib::modules::scrape_request::ScrapeRequestService;
use yomu_lib::shared::config::CronSchedules;
use yomu_lib::shared::errors::{AppError, AppResult};
use yomu_lib::shared::utils::circuit_breaker::CircuitBreaker;
use utils::factories::{self, ASURA_BASE_URL};
use utils::helpers::{MockRequestStore, RecordingBroker};

struct Harness {
    scheduler: Scheduler,
    requests: Arc<InMemoryScrapeRequestRepository>,
    broker: Arc<RecordingBroker>,
    series: Arc<InMemorySeriesRepository>,
    chapters: Arc<InMemoryChapterRepository>,
}

fn provider(slug: &str, active: bool) -> Provider {
    Provider {
        slug: slug.to_string(),
        name: slug.to_uppercase(),
        active,
        base_url: format!("https://{}.example", slug),
        list_path: "/manga/".to_string(),
    }
}

fn providers() -> Vec<Provider> {
    vec![
        factories::asura_provider(),
        provider("flame", true),
        provider("night", false),
    ]
}

fn harness_with(providers: Arc<dyn ProviderRepository>, schedules: CronSchedules) -> Harness {
    let requests = Arc::new(InMemoryScrapeRequestRepository::new());
    let broker = Arc::new(RecordingBroker::new());
    let series = Arc::new(InMemorySeriesRepository::new());
    let chapters = Arc::new(InMemoryChapterRepository::new());
    let intake = Arc::new(ScrapeRequestService::new(
        requests.clone(),
        broker.clone(),
        Arc::new(CircuitBreaker::new("scheduler-test", 3, Duration::from_secs(120))),
    ));

    let control = ControlLoop::new(
        intake,
        providers,
        series.clone(),
        chapters.clone(),
        Duration::ZERO,
    );
    let executor = JobExecutor::new(control, Arc::new(InMemoryCronJobRepository::new()));

    Harness {
        scheduler: Scheduler::new(executor, schedules),
        requests,
        broker,
        series,
        chapters,
    }
}

fn harness() -> Harness {
    harness_with(
        Arc::new(InMemoryProviderRepository::with_providers(providers())),
        CronSchedules::default(),
    )
}

async fn requests_of(harness: &Harness, request_type: ScrapeRequestType) -> Vec<ScrapeRequest> {
    harness
        .requests
        .all()
        .await
        .into_iter()
        .filter(|r| r.request_type == request_type)
        .collect()
}

// ================================================================================================
// JOB BODIES
// ================================================================================================

#[tokio::test]
async fn series_list_job_enqueues_one_request_per_active_provider() {
    let harness = harness();

    let run = harness
        .scheduler
        .run_now(ScheduledJob::ScrapeSeriesList)
        .await
        .unwrap();

    assert_eq!(run, JobRun::Completed(JobSummary { enqueued: 2, failed: 0 }));
    let mut created: Vec<(String, String)> = requests_of(&harness, ScrapeRequestType::SeriesList)
        .await
        .into_iter()
        .map(|r| {
            let url = r.target_url();
            (r.provider, url)
        })
        .collect();
    created.sort();
    assert_eq!(
        created,
        vec![
            ("asura".to_string(), format!("{}/manga/list-mode/", ASURA_BASE_URL)),
            ("flame".to_string(), "https://flame.example/manga/".to_string()),
        ]
    );
    assert_eq!(harness.broker.published().len(), 2);
}

#[tokio::test]
async fn series_detail_job_targets_every_series_missing_detail() {
    let harness = harness();
    for (provider, slug) in [
        ("asura", "reincarnator"),
        ("night", "hidden-gem"),
        ("kiryuu", "orphaned"),
    ] {
        harness
            .series
            .upsert_init(&factories::series_init(provider, slug))
            .await
            .unwrap();
    }

    let run = harness
        .scheduler
        .run_now(ScheduledJob::ScrapeSeriesDetail)
        .await
        .unwrap();

    assert_eq!(
        run,
        JobRun::Completed(JobSummary { enqueued: 2, failed: 1 }),
        "series of a provider missing from the catalog cannot be addressed"
    );
    let mut created: Vec<(String, String)> = requests_of(&harness, ScrapeRequestType::SeriesDetail)
        .await
        .into_iter()
        .map(|r| {
            let path = r.request_path.clone();
            (r.provider, path)
        })
        .collect();
    created.sort();
    assert_eq!(
        created,
        vec![
            ("asura".to_string(), "/manga/reincarnator/".to_string()),
            ("night".to_string(), "/manga/hidden-gem/".to_string()),
        ]
    );
}

#[tokio::test]
async fn chapters_list_job_covers_ongoing_series_of_every_provider() {
    let harness = harness();
    harness
        .series
        .upsert_init(&factories::series_init("night", "hidden-gem"))
        .await
        .unwrap();
    for slug in ["reincarnator", "nano-machine"] {
        harness
            .series
            .upsert_init(&factories::series_init("asura", slug))
            .await
            .unwrap();
    }
    harness
        .series
        .upsert_init(&factories::series_init("flame", "omniscient-reader"))
        .await
        .unwrap();

    let run = harness
        .scheduler
        .run_now(ScheduledJob::ScrapeChaptersList)
        .await
        .unwrap();

    assert_eq!(run, JobRun::Completed(JobSummary { enqueued: 4, failed: 0 }));
    let mut series: Vec<String> = requests_of(&harness, ScrapeRequestType::ChapterList)
        .await
        .into_iter()
        .filter_map(|r| r.series)
        .collect();
    series.sort();
    assert_eq!(
        series,
        vec!["hidden-gem", "nano-machine", "omniscient-reader", "reincarnator"],
        "inactive providers still get their ongoing series refreshed"
    );
}

#[tokio::test]
async fn chapters_detail_job_uses_chapter_path() {
    let harness = harness();
    harness
        .chapters
        .upsert_init(&factories::chapter_init("asura", "reincarnator", 7))
        .await
        .unwrap();

    let run = harness
        .scheduler
        .run_now(ScheduledJob::ScrapeChaptersDetail)
        .await
        .unwrap();

    assert_eq!(run, JobRun::Completed(JobSummary { enqueued: 1, failed: 0 }));
    let created = requests_of(&harness, ScrapeRequestType::ChapterDetail).await;
    assert_eq!(created[0].chapter.as_deref(), Some("reincarnator-chapter-7"));
    assert_eq!(
        created[0].target_url(),
        format!("{}/reincarnator-chapter-7/", ASURA_BASE_URL)
    );
}

#[tokio::test]
async fn republish_job_counts_each_pending_request_once() {
    let harness = harness();
    harness
        .scheduler
        .run_now(ScheduledJob::ScrapeSeriesList)
        .await
        .unwrap();
    assert_eq!(harness.broker.published().len(), 2);

    harness.broker.set_failing(true);
    let run = harness
        .scheduler
        .run_now(ScheduledJob::RepublishPending)
        .await
        .unwrap();
    assert_eq!(run, JobRun::Completed(JobSummary { enqueued: 0, failed: 2 }));

    harness.broker.set_failing(false);
    let run = harness
        .scheduler
        .run_now(ScheduledJob::RepublishPending)
        .await
        .unwrap();
    assert_eq!(run, JobRun::Completed(JobSummary { enqueued: 2, failed: 0 }));
    assert_eq!(harness.broker.published().len(), 4);
}

// ================================================================================================
// FAILURE HANDLING
// ================================================================================================

#[tokio::test]
async fn enqueue_failure_for_one_provider_does_not_abort_the_run() {
    let mut store = MockRequestStore::new();
    store.expect_create().returning(|request| {
        if request.provider == "flame" {
            Err(AppError::DatabaseError("disk full".to_string()))
        } else {
            Ok(request.clone())
        }
    });
    let intake = Arc::new(ScrapeRequestService::new(
        Arc::new(store),
        Arc::new(RecordingBroker::new()),
        Arc::new(CircuitBreaker::new("scheduler-test", 3, Duration::from_secs(120))),
    ));
    let control = ControlLoop::new(
        intake,
        Arc::new(InMemoryProviderRepository::with_providers(vec![
            provider("flame", true),
            factories::asura_provider(),
            provider("rizz", true),
        ])),
        Arc::new(InMemorySeriesRepository::new()),
        Arc::new(InMemoryChapterRepository::new()),
        Duration::ZERO,
    );
    let scheduler = Scheduler::new(
        JobExecutor::new(control, Arc::new(InMemoryCronJobRepository::new())),
        CronSchedules::default(),
    );

    let run = scheduler.run_now(ScheduledJob::ScrapeSeriesList).await.unwrap();

    assert_eq!(run, JobRun::Completed(JobSummary { enqueued: 2, failed: 1 }));
}

struct UnavailableProviders;

#[async_trait]
impl ProviderRepository for UnavailableProviders {
    async fn find(&self, slug: &str) -> AppResult<Provider> {
        Err(AppError::DatabaseError(format!("cannot load {}", slug)))
    }

    async fn find_all(&self) -> AppResult<Vec<Provider>> {
        Err(AppError::DatabaseError("providers table unavailable".to_string()))
    }

    async fn find_active(&self) -> AppResult<Vec<Provider>> {
        Err(AppError::DatabaseError("providers table unavailable".to_string()))
    }
}

#[tokio::test]
async fn failed_discovery_marks_run_failed_and_logs_both_rows() {
    let harness = harness_with(Arc::new(UnavailableProviders), CronSchedules::default());
    let job = ScheduledJob::ScrapeSeriesList;

    let run = harness.scheduler.run_now(job).await.unwrap();

    match run {
        JobRun::Failed(message) => {
            assert!(message.contains("scrape-series-list"));
            assert!(message.contains("providers table unavailable"));
        }
        other => panic!("expected a failed run, got {:?}", other),
    }

    let history = harness.scheduler.history(job).await.unwrap();
    let states: Vec<_> = history.iter().map(|row| row.state).collect();
    assert_eq!(states, vec![CronJobState::Started, CronJobState::Failed]);
    assert_eq!(harness.scheduler.stats(job).failures, 1);
    assert!(!harness.scheduler.stats(job).running);
}

#[tokio::test]
async fn each_run_appends_to_the_history() {
    let harness = harness();
    let job = ScheduledJob::ScrapeSeriesList;

    harness.scheduler.run_now(job).await.unwrap();
    harness.scheduler.run_now(job).await.unwrap();

    let history = harness.scheduler.history(job).await.unwrap();
    let states: Vec<_> = history.iter().map(|row| row.state).collect();
    assert_eq!(
        states,
        vec![
            CronJobState::Started,
            CronJobState::Completed,
            CronJobState::Started,
            CronJobState::Completed,
        ]
    );
    assert_eq!(history[1].message, "2 enqueued, 0 failed");
    assert_eq!(harness.scheduler.stats(job).runs, 2);
}

// ================================================================================================
// CRON TIMER
// ================================================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cron_timer_fires_jobs_until_shutdown() {
    let schedules = CronSchedules {
        series_list: "*/1 * * * * *".to_string(),
        ..CronSchedules::default()
    };
    let mut harness = harness_with(
        Arc::new(InMemoryProviderRepository::with_providers(providers())),
        schedules,
    );

    harness.scheduler.start().await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while harness.scheduler.stats(ScheduledJob::ScrapeSeriesList).runs == 0
        && tokio::time::Instant::now() < deadline
    {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    harness.scheduler.shutdown().await.unwrap();

    assert!(harness.scheduler.stats(ScheduledJob::ScrapeSeriesList).runs >= 1);
    assert!(!requests_of(&harness, ScrapeRequestType::SeriesList).await.is_empty());
}
