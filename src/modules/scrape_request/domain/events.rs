use serde::{Deserialize, Serialize};

use super::entities::ScrapeRequest;

/// Envelope published for every request accepted by intake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRequestEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: ScrapeRequest,
}

impl ScrapeRequestEvent {
    pub const CREATED: &'static str = "scrape_request.created";

    pub fn created(request: ScrapeRequest) -> Self {
        Self {
            kind: Self::CREATED.to_string(),
            value: request,
        }
    }

    /// Broker key: the request ID
    pub fn key(&self) -> String {
        self.value.id.to_string()
    }
}
