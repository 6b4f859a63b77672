/// End to end: cron jobs → intake → broker → worker → catalog, against fixture pages
mod utils;

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use yomu_lib::bootstrap::AppServices;
use yomu_lib::modules::catalog::domain::{ChapterRepository, SeriesRepository};
use yomu_lib::modules::scheduler::{JobRun, ScheduledJob, Scheduler};
use yomu_lib::modules::scrape_request::domain::ScrapeRequestStatus;
use yomu_lib::modules::scrape_request::CreateScrapeRequestParams;
use utils::factories::{self, FixtureFetcher, ASURA_BASE_URL};
use utils::helpers;

const CHAPTERS: usize = 12;

fn asura_fixtures() -> FixtureFetcher {
    let mut fetcher = FixtureFetcher::new()
        .with_page(
            &format!("{}/manga/list-mode/", ASURA_BASE_URL),
            factories::asura_series_list_page(&[
                ("1672760368-reincarnator", "Reincarnator"),
                ("discord", "Join our Discord"),
            ]),
        )
        .with_page(
            &format!("{}/manga/1672760368-reincarnator/", ASURA_BASE_URL),
            factories::asura_series_page("reincarnator", CHAPTERS),
        );
    for n in 1..=CHAPTERS {
        fetcher = fetcher.with_page(
            &format!("{}/1672760368-reincarnator-chapter-{}/", ASURA_BASE_URL, n),
            factories::asura_reader_page(&format!("Reincarnator Chapter {}", n), 3),
        );
    }
    fetcher
}

/// Wait until no request is left PENDING
async fn drain(services: &AppServices) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let pending = services
            .requests
            .find_pendings(Utc::now() + chrono::Duration::days(1))
            .await
            .unwrap();
        if pending.is_empty() {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "{} requests still pending",
            pending.len()
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

async fn run_job(services: &AppServices, scheduler: &Scheduler, job: ScheduledJob) {
    let run = scheduler.run_now(job).await.unwrap();
    assert!(matches!(run, JobRun::Completed(_)), "{} ended with {:?}", job, run);
    drain(services).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn control_loop_fills_the_catalog_from_scratch() {
    let mut services = helpers::build_services(Arc::new(asura_fixtures()));
    let cancel = CancellationToken::new();
    let workers = services.start_workers(cancel.clone());
    let scheduler = services.scheduler();

    // Series list: every active provider is crawled; only asura has pages
    run_job(&services, &scheduler, ScheduledJob::ScrapeSeriesList).await;
    let asura = services.series.find_by_provider("asura").await.unwrap();
    assert_eq!(asura.len(), 1, "deny-listed slugs are skipped");
    assert_eq!(asura[0].slug, "reincarnator");
    assert_eq!(asura[0].source_path, "/manga/1672760368-reincarnator/");
    assert!(asura[0].needs_detail());

    // Series detail
    run_job(&services, &scheduler, ScheduledJob::ScrapeSeriesDetail).await;
    let series = services.series.find("asura", "reincarnator").await.unwrap();
    assert_eq!(series.synopsis.as_deref(), Some("Synopsis of reincarnator."));
    assert!(services.series.find_missing_detail().await.unwrap().is_empty());

    // Chapter list
    run_job(&services, &scheduler, ScheduledJob::ScrapeChaptersList).await;
    assert_eq!(
        services.chapters.count("asura", "reincarnator").await.unwrap(),
        CHAPTERS as u32
    );
    let series = services.series.find("asura", "reincarnator").await.unwrap();
    assert_eq!(series.chapters_count, CHAPTERS as u32);
    assert_eq!(series.latest_chapter.as_deref(), Some("reincarnator-chapter-12"));

    // Chapter detail
    run_job(&services, &scheduler, ScheduledJob::ScrapeChaptersDetail).await;
    let chapters = services
        .chapters
        .find_by_series("asura", "reincarnator")
        .await
        .unwrap();
    assert_eq!(chapters.len(), CHAPTERS);
    for chapter in &chapters {
        assert_eq!(chapter.content_paths.len(), 3, "{} has no content", chapter.slug);
        assert!(!chapter.needs_detail());
    }
    assert!(services.chapters.find_missing_detail().await.unwrap().is_empty());

    let history = scheduler.history(ScheduledJob::ScrapeChaptersDetail).await.unwrap();
    assert_eq!(history.len(), 2);

    cancel.cancel();
    for worker in workers {
        worker.await.unwrap();
    }
}

#[tokio::test]
async fn chapter_list_request_completes_with_twelve_chapters() {
    let fetcher = FixtureFetcher::new().with_page(
        &format!("{}/manga/reincarnator/", ASURA_BASE_URL),
        factories::asura_series_page("reincarnator", CHAPTERS),
    );
    let mut services = helpers::build_services(Arc::new(fetcher));
    let cancel = CancellationToken::new();
    let workers = services.start_workers(cancel.clone());

    let created = services
        .intake
        .create(CreateScrapeRequestParams::chapter_list(
            "asura",
            "reincarnator",
            ASURA_BASE_URL,
            "/manga/reincarnator/",
        ))
        .await
        .unwrap();
    let done =
        helpers::wait_for_terminal(&services.requests, created.id, Duration::from_secs(5)).await;

    assert_eq!(done.status, ScrapeRequestStatus::Completed);
    assert!(done.total_time > 0.0);
    assert!(!done.error);
    assert_eq!(done.retries, 1);
    assert_eq!(
        services.chapters.count("asura", "reincarnator").await.unwrap(),
        CHAPTERS as u32
    );

    cancel.cancel();
    for worker in workers {
        worker.await.unwrap();
    }
}
