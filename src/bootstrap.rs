//! Composition root: repositories, decorators, services and background tasks.
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::modules::catalog::domain::{
    CacheRepository, ChapterRepository, ProviderRepository, SeriesRepository,
    SeriesSearchRepository,
};
use crate::modules::catalog::infrastructure::{
    CachingChapterRepository, CachingSeriesRepository, InMemoryChapterRepository,
    InMemoryProviderRepository, InMemorySeriesRepository, InMemorySeriesSearch, MemoryCache,
};
use crate::modules::scheduler::{ControlLoop, InMemoryCronJobRepository, JobExecutor, Scheduler};
use crate::modules::scrape_request::domain::ScrapeRequestRepository;
use crate::modules::scrape_request::infrastructure::{
    BrokerMessage, ChannelBroker, InMemoryScrapeRequestRepository,
};
use crate::modules::scrape_request::worker::WorkerSettings;
use crate::modules::scrape_request::{ScrapeRequestService, ScrapeWorker};
use crate::modules::scraping::infrastructure::{
    default_registry, HttpPageFetcher, PageFetcher, RetryPolicy, SessionPool,
};
use crate::modules::scraping::StrategyRegistry;
use crate::shared::errors::AppResult;
use crate::shared::utils::circuit_breaker::CircuitBreaker;
use crate::shared::AppConfig;
use crate::log_info;

pub struct AppServices {
    pub config: AppConfig,
    pub providers: Arc<dyn ProviderRepository>,
    pub series: Arc<dyn SeriesRepository>,
    pub chapters: Arc<dyn ChapterRepository>,
    pub search: Arc<dyn SeriesSearchRepository>,
    pub cache: Arc<MemoryCache>,
    pub requests: Arc<dyn ScrapeRequestRepository>,
    pub registry: Arc<StrategyRegistry>,
    pub sessions: Arc<SessionPool>,
    pub intake: Arc<ScrapeRequestService>,
    pub worker: Arc<ScrapeWorker>,
    consumers: Vec<mpsc::Receiver<BrokerMessage>>,
}

impl AppServices {
    /// Wire everything against the live source sites
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let fetcher = HttpPageFetcher::new(config.requests_per_second, RetryPolicy::source_site())?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Wire everything with an arbitrary page fetcher behind the strategies
    pub fn with_fetcher(config: AppConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let sessions = Arc::new(SessionPool::new(fetcher, config.max_browser_sessions));
        let registry = Arc::new(default_registry(sessions.clone()));

        // Every provider with a registered strategy starts out active
        let providers: Arc<dyn ProviderRepository> =
            Arc::new(InMemoryProviderRepository::with_providers(registry.providers()));

        let cache = Arc::new(MemoryCache::new());
        let cache_port: Arc<dyn CacheRepository> = cache.clone();
        let series: Arc<dyn SeriesRepository> = Arc::new(CachingSeriesRepository::new(
            Arc::new(InMemorySeriesRepository::new()),
            cache_port.clone(),
        ));
        let chapters: Arc<dyn ChapterRepository> = Arc::new(CachingChapterRepository::new(
            Arc::new(InMemoryChapterRepository::new()),
            cache_port,
        ));
        let search: Arc<dyn SeriesSearchRepository> = Arc::new(InMemorySeriesSearch::new());

        let requests: Arc<dyn ScrapeRequestRepository> =
            Arc::new(InMemoryScrapeRequestRepository::new());
        let (broker, consumers) =
            ChannelBroker::new(config.broker_partitions, config.broker_capacity);
        let broker = broker.with_publish_timeout(config.broker_publish_timeout);
        let breaker = Arc::new(CircuitBreaker::new(
            "scrape-request-intake",
            config.breaker_failure_threshold,
            config.breaker_cooldown,
        ));
        let intake = Arc::new(ScrapeRequestService::new(
            requests.clone(),
            Arc::new(broker),
            breaker,
        ));

        let worker = Arc::new(ScrapeWorker::new(
            requests.clone(),
            series.clone(),
            chapters.clone(),
            search.clone(),
            registry.clone(),
            WorkerSettings {
                crawl_timeout: config.crawl_timeout,
                max_fan_out: config.max_fan_out,
            },
        ));

        log_info!(
            "Wired {} providers, {} broker partitions",
            registry.providers().len(),
            consumers.len()
        );

        Self {
            config,
            providers,
            series,
            chapters,
            search,
            cache,
            requests,
            registry,
            sessions,
            intake,
            worker,
            consumers,
        }
    }

    /// Start one worker consumer per broker partition. Only the first call spawns anything.
    pub fn start_workers(&mut self, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        let consumers = std::mem::take(&mut self.consumers);
        self.worker.clone().spawn(consumers, cancel)
    }

    pub fn scheduler(&self) -> Scheduler {
        let control = ControlLoop::new(
            self.intake.clone(),
            self.providers.clone(),
            self.series.clone(),
            self.chapters.clone(),
            self.config.pending_republish_after,
        );
        let executor = JobExecutor::new(control, Arc::new(InMemoryCronJobRepository::new()));
        Scheduler::new(executor, self.config.schedules.clone())
    }
}
