//! Bodies of the periodic jobs.
//!
//! Each job discovers stale catalog data and turns it into scrape requests
//! through the intake service. A failed enqueue is logged and counted; it
//! never aborts the rest of the run.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::modules::catalog::domain::{
    ChapterRepository, Provider, ProviderRepository, SeriesRepository,
};
use crate::modules::scheduler::domain::{JobSummary, ScheduledJob};
use crate::modules::scrape_request::{CreateScrapeRequestParams, ScrapeRequestService};
use crate::modules::scraping::domain::helpers::path_of;
use crate::shared::errors::{AppResult, ResultExt, ServiceResult};
use crate::log_warn;

pub struct ControlLoop {
    intake: Arc<ScrapeRequestService>,
    providers: Arc<dyn ProviderRepository>,
    series: Arc<dyn SeriesRepository>,
    chapters: Arc<dyn ChapterRepository>,
    pending_republish_after: Duration,
}

impl ControlLoop {
    pub fn new(
        intake: Arc<ScrapeRequestService>,
        providers: Arc<dyn ProviderRepository>,
        series: Arc<dyn SeriesRepository>,
        chapters: Arc<dyn ChapterRepository>,
        pending_republish_after: Duration,
    ) -> Self {
        Self {
            intake,
            providers,
            series,
            chapters,
            pending_republish_after,
        }
    }

    pub async fn run(&self, job: ScheduledJob) -> AppResult<JobSummary> {
        let summary = match job {
            ScheduledJob::ScrapeSeriesList => self.scrape_series_list().await,
            ScheduledJob::ScrapeSeriesDetail => self.scrape_series_detail().await,
            ScheduledJob::ScrapeChaptersList => self.scrape_chapters_list().await,
            ScheduledJob::ScrapeChaptersDetail => self.scrape_chapters_detail().await,
            ScheduledJob::RepublishPending => self.republish_pending().await,
        }
        .within(job.name())?;

        info!("Job {} finished: {}", job, summary);
        Ok(summary)
    }

    /// One SERIES_LIST request per active provider
    async fn scrape_series_list(&self) -> AppResult<JobSummary> {
        let providers = self.providers.find_active().await?;
        let mut summary = JobSummary::default();

        for provider in providers {
            let params = CreateScrapeRequestParams::series_list(
                &provider.slug,
                &provider.base_url,
                &provider.list_path,
            );
            let result = self.enqueue(params).await;
            summary.record(&result);
        }
        Ok(summary)
    }

    /// One SERIES_DETAIL request per series missing a thumbnail or synopsis
    async fn scrape_series_detail(&self) -> AppResult<JobSummary> {
        let providers = self.providers_by_slug().await?;
        let stale = self.series.find_missing_detail().await?;
        let mut summary = JobSummary::default();

        for series in stale {
            let Some(provider) = providers.get(&series.provider) else {
                log_warn!("Skipping {}/{}: provider not in catalog", series.provider, series.slug);
                summary.failed += 1;
                continue;
            };
            let params = CreateScrapeRequestParams::series_detail(
                &provider.slug,
                &series.slug,
                &provider.base_url,
                &path_of(&series.source_path),
            );
            let result = self.enqueue(params).await;
            summary.record(&result);
        }
        Ok(summary)
    }

    /// One CHAPTER_LIST request per ongoing series, for every provider
    async fn scrape_chapters_list(&self) -> AppResult<JobSummary> {
        let providers = self.providers.find_all().await?;
        let mut summary = JobSummary::default();

        for provider in providers {
            let ongoing = match self.series.find_ongoing(&provider.slug).await {
                Ok(ongoing) => ongoing,
                Err(e) => {
                    log_warn!("Failed to list ongoing series of {}: {}", provider.slug, e);
                    summary.failed += 1;
                    continue;
                }
            };

            for series in ongoing {
                let params = CreateScrapeRequestParams::chapter_list(
                    &provider.slug,
                    &series.slug,
                    &provider.base_url,
                    &path_of(&series.source_path),
                );
                let result = self.enqueue(params).await;
                summary.record(&result);
            }
        }
        Ok(summary)
    }

    /// One CHAPTER_DETAIL request per chapter without a title or content
    async fn scrape_chapters_detail(&self) -> AppResult<JobSummary> {
        let providers = self.providers_by_slug().await?;
        let stale = self.chapters.find_missing_detail().await?;
        let mut summary = JobSummary::default();

        for chapter in stale {
            let Some(provider) = providers.get(&chapter.provider) else {
                log_warn!("Skipping {}/{}: provider not in catalog", chapter.provider, chapter.slug);
                summary.failed += 1;
                continue;
            };
            let params = CreateScrapeRequestParams::chapter_detail(
                &provider.slug,
                &chapter.series,
                &chapter.slug,
                &provider.base_url,
                &path_of(&chapter.href),
            );
            let result = self.enqueue(params).await;
            summary.record(&result);
        }
        Ok(summary)
    }

    async fn republish_pending(&self) -> AppResult<JobSummary> {
        let outcome = self
            .intake
            .republish_pending(self.pending_republish_after)
            .await?;

        Ok(JobSummary {
            enqueued: outcome.republished,
            failed: outcome.failed,
        })
    }

    async fn providers_by_slug(&self) -> AppResult<HashMap<String, Provider>> {
        Ok(self
            .providers
            .find_all()
            .await?
            .into_iter()
            .map(|provider| (provider.slug.clone(), provider))
            .collect())
    }

    async fn enqueue(&self, params: CreateScrapeRequestParams) -> ServiceResult<()> {
        let label = format!(
            "{} {} {}",
            params.provider,
            params.request_type,
            params.series.as_deref().unwrap_or("-")
        );
        match self.intake.create(params).await {
            Ok(_) => Ok(()),
            Err(e) => {
                log_warn!("Failed to enqueue {}: {}", label, e);
                Err(e)
            }
        }
    }
}
