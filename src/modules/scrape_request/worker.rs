/// Asynchronous consumer of created scrape requests.
///
/// Per event: decode, crawl with the provider's strategy under a timeout,
/// reconcile the result into the catalog, then write the single terminal
/// status. One consumer task runs per broker partition.
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use super::domain::{
    ScrapeRequest, ScrapeRequestEvent, ScrapeRequestRepository, ScrapeRequestType,
    UpdateScrapeRequestParams,
};
use super::infrastructure::BrokerMessage;
use crate::modules::catalog::domain::{
    ChapterRepository, SeriesLatestUpdate, SeriesRepository, SeriesSearchRepository,
};
use crate::modules::scraping::domain::{
    ChapterListItem, ScrapeOutcome, SeriesListItem, StrategyRegistry,
};
use crate::shared::errors::{AppError, AppResult, ResultExt};
use crate::shared::utils::logger::{LogContext, TimedOperation};
use crate::{log_debug, log_error, log_info, log_warn};

/// Slugs that list pages link with series markup but that are not series
const DENIED_SERIES_SLUGS: &[&str] = &[
    "bookmarks",
    "discord",
    "donate",
    "join-us",
    "latest-update",
    "list-mode",
    "manga",
    "project",
    "series",
];

/// Outcome of a list reconciliation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanOutReport {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub crawl_timeout: Duration,
    /// Concurrent upserts per list result; `None` means one task per item
    pub max_fan_out: Option<usize>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            crawl_timeout: Duration::from_secs(60),
            max_fan_out: None,
        }
    }
}

pub struct ScrapeWorker {
    requests: Arc<dyn ScrapeRequestRepository>,
    series: Arc<dyn SeriesRepository>,
    chapters: Arc<dyn ChapterRepository>,
    search: Arc<dyn SeriesSearchRepository>,
    registry: Arc<StrategyRegistry>,
    settings: WorkerSettings,
}

impl ScrapeWorker {
    pub fn new(
        requests: Arc<dyn ScrapeRequestRepository>,
        series: Arc<dyn SeriesRepository>,
        chapters: Arc<dyn ChapterRepository>,
        search: Arc<dyn SeriesSearchRepository>,
        registry: Arc<StrategyRegistry>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            requests,
            series,
            chapters,
            search,
            registry,
            settings,
        }
    }

    /// Start one consumer per partition; each stops when `cancel` fires or its channel closes
    pub fn spawn(
        self: Arc<Self>,
        receivers: Vec<mpsc::Receiver<BrokerMessage>>,
        cancel: CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        receivers
            .into_iter()
            .enumerate()
            .map(|(partition, receiver)| {
                tokio::spawn(self.clone().consume(partition, receiver, cancel.clone()))
            })
            .collect()
    }

    async fn consume(
        self: Arc<Self>,
        partition: usize,
        mut receiver: mpsc::Receiver<BrokerMessage>,
        cancel: CancellationToken,
    ) {
        log_info!("Scrape worker consuming partition {}", partition);

        loop {
            let message = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                message = receiver.recv() => message,
            };
            match message {
                Some(message) => {
                    self.handle_message(&message.payload, &cancel).await;
                }
                None => break,
            }
        }

        log_info!("Scrape worker stopped on partition {}", partition);
    }

    /// Decode one broker payload and process it.
    ///
    /// Malformed payloads are logged and dropped: without a request ID there is
    /// nothing to mark as failed.
    pub async fn handle_message(
        &self,
        payload: &[u8],
        cancel: &CancellationToken,
    ) -> Option<ScrapeRequest> {
        let event: ScrapeRequestEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                log_warn!("Discarding malformed scrape request event: {}", e);
                return None;
            }
        };

        if event.kind != ScrapeRequestEvent::CREATED {
            log_warn!("Discarding event of unexpected type '{}'", event.kind);
            return None;
        }

        match self.process(event.value, cancel).await {
            Ok(request) => Some(request),
            Err(e) => {
                LogContext::error_with_context(&e, "scrape worker");
                None
            }
        }
    }

    /// Execute one request and record its terminal status
    pub async fn process(
        &self,
        request: ScrapeRequest,
        cancel: &CancellationToken,
    ) -> AppResult<ScrapeRequest> {
        let stored = self
            .requests
            .find(request.id)
            .await
            .within("ScrapeWorker::process")?;
        if stored.status.is_terminal() {
            log_debug!(
                "Skipping request {}: already {}",
                stored.id,
                stored.status
            );
            return Ok(stored);
        }

        let target = stored.target_url();
        let kind = stored.request_type.to_string();
        LogContext::crawl(&stored.provider, &kind, &target, "started", None);
        let timer = TimedOperation::new(&format!("{} {} {}", stored.provider, kind, target));

        let result = match self.crawl(&stored, &target, cancel).await {
            Ok(outcome) => self.reconcile(&stored, outcome).await,
            Err(e) => Err(e),
        };

        let elapsed = timer.elapsed_secs();
        let update = match &result {
            Ok(()) => UpdateScrapeRequestParams::completed(elapsed),
            Err(e) => UpdateScrapeRequestParams::failed(elapsed, e.to_string()),
        };
        let duration_ms = timer.finish_with_info(&update.status.to_string());
        LogContext::crawl(
            &stored.provider,
            &kind,
            &target,
            &update.status.to_string(),
            Some(duration_ms),
        );
        if let Err(e) = &result {
            log_warn!("Request {} failed: {}", stored.id, e);
        }

        self.requests
            .update(stored.id, &update)
            .await
            .within("ScrapeRequestRepository::update")
    }

    /// Run the strategy under the crawl timeout; cancellation aborts it at once
    async fn crawl(
        &self,
        request: &ScrapeRequest,
        target: &str,
        cancel: &CancellationToken,
    ) -> AppResult<ScrapeOutcome> {
        let dispatch = self
            .registry
            .dispatch(&request.provider, request.request_type, target);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled(format!(
                "crawl of {} aborted by shutdown",
                target
            ))),
            outcome = tokio::time::timeout(self.settings.crawl_timeout, dispatch) => {
                outcome.unwrap_or_else(|_| {
                    Err(AppError::Timeout(format!(
                        "crawl of {} exceeded {:?}",
                        target, self.settings.crawl_timeout
                    )))
                })
            }
        }
    }

    async fn reconcile(&self, request: &ScrapeRequest, outcome: ScrapeOutcome) -> AppResult<()> {
        match (request.request_type, outcome) {
            (ScrapeRequestType::SeriesList, ScrapeOutcome::SeriesList(items)) => {
                let report = self.reconcile_series_list(&request.provider, items).await;
                log_info!(
                    "Series list of {}: {} upserted, {} failed, {} skipped",
                    request.provider,
                    report.succeeded,
                    report.failed,
                    report.skipped
                );
                Ok(())
            }
            (ScrapeRequestType::SeriesDetail, ScrapeOutcome::SeriesDetail(detail)) => {
                let slug = request.series_slug()?;
                let series = self
                    .series
                    .update_init(&request.provider, slug, &detail.into())
                    .await
                    .within("SeriesRepository::update_init")?;
                if let Err(e) = self.search.index(&series).await {
                    log_warn!("Failed to index series {}: {}", series.slug, e);
                }
                Ok(())
            }
            (ScrapeRequestType::ChapterList, ScrapeOutcome::ChapterList(items)) => {
                let series = request.series_slug()?;
                let report = self
                    .reconcile_chapter_list(&request.provider, series, items)
                    .await;
                log_info!(
                    "Chapter list of {}/{}: {} upserted, {} failed",
                    request.provider,
                    series,
                    report.succeeded,
                    report.failed
                );
                self.refresh_latest(&request.provider, series).await;
                Ok(())
            }
            (ScrapeRequestType::ChapterDetail, ScrapeOutcome::ChapterDetail(detail)) => {
                let series = request.series_slug()?;
                let chapter = request.chapter_slug()?;
                self.chapters
                    .update_init(&request.provider, series, chapter, &detail.into())
                    .await
                    .within("ChapterRepository::update_init")?;
                Ok(())
            }
            (request_type, outcome) => Err(AppError::InternalError(format!(
                "{} crawl produced a mismatched result ({} items)",
                request_type,
                outcome.item_count()
            ))),
        }
    }

    async fn reconcile_series_list(
        &self,
        provider: &str,
        items: Vec<SeriesListItem>,
    ) -> FanOutReport {
        let (items, denied): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|item| !DENIED_SERIES_SLUGS.contains(&item.slug.as_str()));

        let series = self.series.clone();
        let search = self.search.clone();
        let mut report = self
            .fan_out(items, move |item: SeriesListItem| {
                let series = series.clone();
                let search = search.clone();
                let init = item.into_init(provider);
                async move {
                    let stored = series
                        .upsert_init(&init)
                        .await
                        .within(&format!("upsert series {}", init.slug))?;
                    if let Err(e) = search.index(&stored).await {
                        log_warn!("Failed to index series {}: {}", stored.slug, e);
                    }
                    Ok(())
                }
            })
            .await;

        report.skipped = denied.len();
        report
    }

    async fn reconcile_chapter_list(
        &self,
        provider: &str,
        series_slug: &str,
        items: Vec<ChapterListItem>,
    ) -> FanOutReport {
        let chapters = self.chapters.clone();
        self.fan_out(items, move |item: ChapterListItem| {
            let chapters = chapters.clone();
            let init = item.into_init(provider, series_slug);
            async move {
                chapters
                    .upsert_init(&init)
                    .await
                    .within(&format!("upsert chapter {}/{}", init.series, init.slug))?;
                Ok(())
            }
        })
        .await
    }

    /// Refresh the series' chapter count and latest chapter. Best-effort.
    async fn refresh_latest(&self, provider: &str, series: &str) {
        let update = async {
            let chapters_count = self.chapters.count(provider, series).await?;
            let latest_chapter = self
                .chapters
                .find_latest(provider, series)
                .await?
                .map(|c| c.slug);
            self.series
                .update_latest(
                    provider,
                    series,
                    &SeriesLatestUpdate {
                        chapters_count,
                        latest_chapter,
                    },
                )
                .await
        };

        if let Err(e) = update.await {
            log_warn!(
                "Failed to refresh latest chapter of {}/{}: {}",
                provider,
                series,
                e
            );
        }
    }

    /// Run `op` on every item concurrently and wait for all of them.
    ///
    /// Item failures are logged and counted; they never fail the batch.
    async fn fan_out<T, F, Fut>(&self, items: Vec<T>, op: F) -> FanOutReport
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        let report = Arc::new(Mutex::new(FanOutReport::default()));
        let limiter = self
            .settings
            .max_fan_out
            .map(|cap| Arc::new(Semaphore::new(cap.max(1))));

        let mut tasks = JoinSet::new();
        for item in items {
            let work = op(item);
            let report = report.clone();
            let limiter = limiter.clone();
            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                let result = work.await;

                let mut report = report.lock().unwrap_or_else(|e| e.into_inner());
                match result {
                    Ok(()) => report.succeeded += 1,
                    Err(e) => {
                        report.failed += 1;
                        log_warn!("Skipping item: {}", e);
                    }
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                log_error!("Upsert task aborted: {}", e);
                report.lock().unwrap_or_else(|e| e.into_inner()).failed += 1;
            }
        }

        let report = *report.lock().unwrap_or_else(|e| e.into_inner());
        report
    }
}
