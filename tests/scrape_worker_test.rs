/// Scrape worker against the real strategies and fixture pages
///
/// Tests cover:
/// - Unknown provider is recorded as FAILED
/// - Crawl timeout is recorded as FAILED with nothing written
/// - One bad chapter does not sink the batch
/// - Re-running a chapter list is idempotent
/// - Series detail enrichment and missing-series failure
mod utils;

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use yomu_lib::bootstrap::AppServices;
use yomu_lib::modules::catalog::domain::{
    ChapterRepository, SeriesRepository, SeriesSearchRepository,
};
use yomu_lib::modules::catalog::infrastructure::{InMemorySeriesRepository, InMemorySeriesSearch};
use yomu_lib::modules::scrape_request::domain::{
    CreateScrapeRequestParams, ScrapeRequest, ScrapeRequestRepository, ScrapeRequestStatus,
};
use yomu_lib::modules::scrape_request::infrastructure::InMemoryScrapeRequestRepository;
use yomu_lib::modules::scrape_request::worker::WorkerSettings;
use yomu_lib::modules::scrape_request::ScrapeWorker;
use yomu_lib::modules::scraping::infrastructure::{default_registry, SessionPool};
use utils::factories::{self, FixtureFetcher, ASURA_BASE_URL};
use utils::helpers::{self, FlakyChapterRepository};

const SERIES_PATH: &str = "/manga/1672760368-reincarnator/";

fn chapter_list_params() -> CreateScrapeRequestParams {
    CreateScrapeRequestParams::chapter_list("asura", "reincarnator", ASURA_BASE_URL, SERIES_PATH)
}

async fn run_through_broker(
    services: &mut AppServices,
    params: CreateScrapeRequestParams,
) -> ScrapeRequest {
    let cancel = CancellationToken::new();
    let workers = services.start_workers(cancel.clone());

    let created = services.intake.create(params).await.unwrap();
    let done =
        helpers::wait_for_terminal(&services.requests, created.id, Duration::from_secs(5)).await;

    cancel.cancel();
    for worker in workers {
        worker.await.unwrap();
    }
    done
}

// ================================================================================================
// FAILURES
// ================================================================================================

#[tokio::test]
async fn unknown_provider_is_recorded_as_failed() {
    let mut services = helpers::build_services(Arc::new(FixtureFetcher::new()));
    let params = CreateScrapeRequestParams::series_list(
        "mangadex",
        "https://mangadex.org",
        "/titles/",
    );

    let done = run_through_broker(&mut services, params).await;

    assert_eq!(done.status, ScrapeRequestStatus::Failed);
    assert!(done.error);
    assert!(done.message.contains("unknown provider 'mangadex'"));
    assert!(done.total_time >= 0.0);
}

#[tokio::test]
async fn crawl_timeout_is_recorded_as_failed_without_writes() {
    let fetcher = FixtureFetcher::new()
        .with_page(
            &format!("{}{}", ASURA_BASE_URL, SERIES_PATH),
            factories::asura_series_page("reincarnator", 3),
        )
        .with_delay(Duration::from_millis(500));
    let config = yomu_lib::shared::AppConfig {
        crawl_timeout: Duration::from_millis(100),
        ..helpers::test_config()
    };
    let mut services = AppServices::with_fetcher(config, Arc::new(fetcher));

    let done = run_through_broker(&mut services, chapter_list_params()).await;

    assert_eq!(done.status, ScrapeRequestStatus::Failed);
    assert!(done.message.contains("exceeded"), "got: {}", done.message);
    assert_eq!(services.chapters.count("asura", "reincarnator").await.unwrap(), 0);
    assert_eq!(services.sessions.stats().active, 0, "timed-out session is released");
}

// ================================================================================================
// CHAPTER LIST RECONCILIATION
// ================================================================================================

#[tokio::test]
async fn one_failing_chapter_does_not_sink_the_batch() {
    let fetcher = FixtureFetcher::new().with_page(
        &format!("{}{}", ASURA_BASE_URL, SERIES_PATH),
        factories::asura_series_page("reincarnator", 5),
    );
    let pool = Arc::new(SessionPool::new(Arc::new(fetcher), 2));
    let requests = Arc::new(InMemoryScrapeRequestRepository::new());
    let chapters = Arc::new(FlakyChapterRepository::new(&["chapter-3"]));
    let worker = ScrapeWorker::new(
        requests.clone(),
        Arc::new(InMemorySeriesRepository::new()),
        chapters.clone(),
        Arc::new(InMemorySeriesSearch::new()),
        Arc::new(default_registry(pool)),
        WorkerSettings::default(),
    );

    let request = ScrapeRequest::new(chapter_list_params()).unwrap();
    let request = requests.create(&request).await.unwrap();
    let done = worker.process(request, &CancellationToken::new()).await.unwrap();

    assert_eq!(done.status, ScrapeRequestStatus::Completed);
    assert_eq!(done.message, "Completed successfully");
    assert_eq!(chapters.count("asura", "reincarnator").await.unwrap(), 4);
    assert!(chapters
        .find("asura", "reincarnator", "reincarnator-chapter-3")
        .await
        .is_err());
}

#[tokio::test]
async fn chapter_list_is_idempotent_and_refreshes_latest() {
    let fetcher = FixtureFetcher::new().with_page(
        &format!("{}{}", ASURA_BASE_URL, SERIES_PATH),
        factories::asura_series_page("reincarnator", 12),
    );
    let mut services = helpers::build_services(Arc::new(fetcher));
    services
        .series
        .upsert_init(&factories::series_init("asura", "reincarnator"))
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let workers = services.start_workers(cancel.clone());
    for _ in 0..2 {
        let created = services.intake.create(chapter_list_params()).await.unwrap();
        let done =
            helpers::wait_for_terminal(&services.requests, created.id, Duration::from_secs(5))
                .await;
        assert_eq!(done.status, ScrapeRequestStatus::Completed);
    }
    cancel.cancel();
    for worker in workers {
        worker.await.unwrap();
    }

    assert_eq!(services.chapters.count("asura", "reincarnator").await.unwrap(), 12);
    let series = services.series.find("asura", "reincarnator").await.unwrap();
    assert_eq!(series.chapters_count, 12);
    assert_eq!(
        series.latest_chapter.as_deref(),
        Some("reincarnator-chapter-12")
    );
}

// ================================================================================================
// SERIES DETAIL
// ================================================================================================

#[tokio::test]
async fn series_detail_enriches_and_indexes_series() {
    let fetcher = FixtureFetcher::new().with_page(
        &format!("{}{}", ASURA_BASE_URL, SERIES_PATH),
        factories::asura_series_page("reincarnator", 1),
    );
    let mut services = helpers::build_services(Arc::new(fetcher));
    services
        .series
        .upsert_init(&factories::series_init("asura", "reincarnator"))
        .await
        .unwrap();

    let params = CreateScrapeRequestParams::series_detail(
        "asura",
        "reincarnator",
        ASURA_BASE_URL,
        SERIES_PATH,
    );
    let done = run_through_broker(&mut services, params).await;

    assert_eq!(done.status, ScrapeRequestStatus::Completed);
    let series = services.series.find("asura", "reincarnator").await.unwrap();
    assert_eq!(
        series.thumbnail_url.as_deref(),
        Some("https://cdn.asura/reincarnator.webp")
    );
    assert!(!series.needs_detail());
    assert_eq!(
        services.search.search("reincarnator", 10).await.unwrap(),
        vec!["asura/reincarnator".to_string()]
    );
}

#[tokio::test]
async fn series_detail_for_unknown_series_fails() {
    let fetcher = FixtureFetcher::new().with_page(
        &format!("{}{}", ASURA_BASE_URL, SERIES_PATH),
        factories::asura_series_page("reincarnator", 1),
    );
    let mut services = helpers::build_services(Arc::new(fetcher));

    let params = CreateScrapeRequestParams::series_detail(
        "asura",
        "reincarnator",
        ASURA_BASE_URL,
        SERIES_PATH,
    );
    let done = run_through_broker(&mut services, params).await;

    assert_eq!(done.status, ScrapeRequestStatus::Failed);
    assert!(done.message.contains("SeriesRepository::update_init"));
}
