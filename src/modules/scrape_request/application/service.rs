use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::ports::MessageBroker;
use crate::modules::scrape_request::domain::{
    CreateScrapeRequestParams, ScrapeRequest, ScrapeRequestRepository,
};
use crate::shared::errors::{AppResult, ResultExt, ServiceResult};
use crate::shared::utils::circuit_breaker::{BreakerSnapshot, CircuitBreaker};
use crate::shared::utils::logger::LogContext;
use crate::{log_debug, log_warn};

/// Result of one republish sweep over stale PENDING requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepublishOutcome {
    pub republished: usize,
    /// Publish failures plus requests left untried once the breaker opened
    pub failed: usize,
}

/// Front door for new scrape requests: validate, persist PENDING, publish.
///
/// Persist-and-publish runs under a circuit breaker shared by every caller.
/// Validation happens before the breaker, so bad input never counts as an
/// infrastructure failure.
pub struct ScrapeRequestService {
    repository: Arc<dyn ScrapeRequestRepository>,
    broker: Arc<dyn MessageBroker>,
    breaker: Arc<CircuitBreaker>,
}

impl ScrapeRequestService {
    pub fn new(
        repository: Arc<dyn ScrapeRequestRepository>,
        broker: Arc<dyn MessageBroker>,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            repository,
            broker,
            breaker,
        }
    }

    pub async fn create(&self, params: CreateScrapeRequestParams) -> ServiceResult<ScrapeRequest> {
        let request = ScrapeRequest::new(params).within("ScrapeRequestService::create")?;

        let created = self
            .breaker
            .call(self.persist_and_publish(request))
            .await
            .map_err(|e| {
                let e = e.within("ScrapeRequestService::create");
                LogContext::error_with_context(&e, "scrape request intake");
                e
            })?;

        info!(
            "Accepted {} request {} for {}",
            created.request_type, created.id, created.provider
        );
        Ok(created)
    }

    async fn persist_and_publish(&self, request: ScrapeRequest) -> AppResult<ScrapeRequest> {
        let created = self
            .repository
            .create(&request)
            .await
            .within("ScrapeRequestRepository::create")?;

        // A failed publish leaves the PENDING row for the republish job to pick up
        self.broker
            .created(&created)
            .await
            .within("MessageBroker::created")?;

        Ok(created)
    }

    pub async fn find(&self, id: Uuid) -> ServiceResult<ScrapeRequest> {
        Ok(self
            .repository
            .find(id)
            .await
            .within("ScrapeRequestService::find")?)
    }

    /// PENDING requests older than `min_age`
    pub async fn find_pendings(&self, min_age: Duration) -> ServiceResult<Vec<ScrapeRequest>> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(min_age).unwrap_or_else(|_| chrono::Duration::zero());
        Ok(self
            .repository
            .find_pendings(cutoff)
            .await
            .within("ScrapeRequestService::find_pendings")?)
    }

    /// Publish stale PENDING requests again.
    ///
    /// Goes through the breaker like intake; one failed publish does not stop the rest.
    pub async fn republish_pending(&self, min_age: Duration) -> ServiceResult<RepublishOutcome> {
        let pendings = self.find_pendings(min_age).await?;
        let mut republished = 0;

        for request in &pendings {
            let result = self
                .breaker
                .call(async {
                    self.broker
                        .created(request)
                        .await
                        .within("MessageBroker::created")
                })
                .await;

            match result {
                Ok(()) => republished += 1,
                Err(e) if e.is_circuit_open() => {
                    log_warn!("Stopping republish: {}", e);
                    break;
                }
                Err(e) => log_warn!("Failed to republish request {}: {}", request.id, e),
            }
        }

        log_debug!(
            "Republished {}/{} pending requests",
            republished,
            pendings.len()
        );
        Ok(RepublishOutcome {
            republished,
            failed: pendings.len() - republished,
        })
    }

    pub fn breaker_snapshot(&self) -> BreakerSnapshot {
        self.breaker.snapshot()
    }
}
