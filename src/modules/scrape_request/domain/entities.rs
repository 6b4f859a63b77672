use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::modules::catalog::domain::join_url;
use crate::shared::errors::{AppError, AppResult};

/// What a scrape request asks the worker to crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrapeRequestType {
    SeriesList,
    SeriesDetail,
    ChapterList,
    ChapterDetail,
}

impl ScrapeRequestType {
    pub const ALL: [ScrapeRequestType; 4] = [
        ScrapeRequestType::SeriesList,
        ScrapeRequestType::SeriesDetail,
        ScrapeRequestType::ChapterList,
        ScrapeRequestType::ChapterDetail,
    ];

    /// Types that must name a series
    pub fn addresses_series(self) -> bool {
        !matches!(self, ScrapeRequestType::SeriesList)
    }

    pub fn addresses_chapter(self) -> bool {
        matches!(self, ScrapeRequestType::ChapterDetail)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScrapeRequestType::SeriesList => "SERIES_LIST",
            ScrapeRequestType::SeriesDetail => "SERIES_DETAIL",
            ScrapeRequestType::ChapterList => "CHAPTER_LIST",
            ScrapeRequestType::ChapterDetail => "CHAPTER_DETAIL",
        }
    }
}

impl fmt::Display for ScrapeRequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScrapeRequestType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScrapeRequestType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidInput(format!("unknown request type '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScrapeRequestStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl ScrapeRequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ScrapeRequestStatus::Pending)
    }
}

impl fmt::Display for ScrapeRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScrapeRequestStatus::Pending => "PENDING",
            ScrapeRequestStatus::Completed => "COMPLETED",
            ScrapeRequestStatus::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// The unit of work tracking one crawl attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub request_type: ScrapeRequestType,
    pub base_url: String,
    pub request_path: String,
    pub provider: String,
    pub series: Option<String>,
    pub chapter: Option<String>,
    pub status: ScrapeRequestStatus,
    /// Bumped on every update. Nothing retries yet, so this is not an attempt count.
    pub retries: u32,
    /// Wall-clock seconds of the crawl attempt
    pub total_time: f64,
    pub error: bool,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScrapeRequest {
    /// Build a PENDING request from validated parameters
    pub fn new(params: CreateScrapeRequestParams) -> AppResult<Self> {
        params.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            request_type: params.request_type,
            base_url: params.base_url,
            request_path: params.request_path,
            provider: params.provider,
            series: params.series.filter(|s| !s.trim().is_empty()),
            chapter: params.chapter.filter(|c| !c.trim().is_empty()),
            status: ScrapeRequestStatus::Pending,
            retries: 0,
            total_time: 0.0,
            error: false,
            message: String::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// The crawl target: base URL followed by the request path
    pub fn target_url(&self) -> String {
        join_url(&self.base_url, &self.request_path)
    }

    pub fn series_slug(&self) -> AppResult<&str> {
        self.series
            .as_deref()
            .ok_or_else(|| AppError::InvalidInput(format!("request {} has no series", self.id)))
    }

    pub fn chapter_slug(&self) -> AppResult<&str> {
        self.chapter
            .as_deref()
            .ok_or_else(|| AppError::InvalidInput(format!("request {} has no chapter", self.id)))
    }

    /// Apply the single terminal transition.
    ///
    /// A request moves PENDING -> COMPLETED or PENDING -> FAILED exactly once;
    /// anything else is rejected and leaves the request untouched.
    pub fn apply_update(&mut self, update: &UpdateScrapeRequestParams) -> AppResult<()> {
        if self.status.is_terminal() {
            return Err(AppError::InvalidInput(format!(
                "request {} is already {}",
                self.id, self.status
            )));
        }
        if !update.status.is_terminal() {
            return Err(AppError::InvalidInput(format!(
                "request {} cannot move back to {}",
                self.id, update.status
            )));
        }

        self.status = update.status;
        self.total_time = update.total_time;
        self.error = update.status == ScrapeRequestStatus::Failed;
        self.message = update.message.clone();
        self.retries += 1;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Input of the intake service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateScrapeRequestParams {
    #[serde(rename = "type")]
    pub request_type: ScrapeRequestType,
    /// Ignored on create; new requests always start PENDING
    #[serde(default)]
    pub status: Option<ScrapeRequestStatus>,
    pub base_url: String,
    pub request_path: String,
    pub provider: String,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
}

impl CreateScrapeRequestParams {
    fn base(
        request_type: ScrapeRequestType,
        provider: &str,
        base_url: &str,
        request_path: &str,
    ) -> Self {
        Self {
            request_type,
            status: None,
            base_url: base_url.to_string(),
            request_path: request_path.to_string(),
            provider: provider.to_string(),
            series: None,
            chapter: None,
        }
    }

    pub fn series_list(provider: &str, base_url: &str, request_path: &str) -> Self {
        Self::base(ScrapeRequestType::SeriesList, provider, base_url, request_path)
    }

    pub fn series_detail(provider: &str, series: &str, base_url: &str, request_path: &str) -> Self {
        Self {
            series: Some(series.to_string()),
            ..Self::base(ScrapeRequestType::SeriesDetail, provider, base_url, request_path)
        }
    }

    pub fn chapter_list(provider: &str, series: &str, base_url: &str, request_path: &str) -> Self {
        Self {
            series: Some(series.to_string()),
            ..Self::base(ScrapeRequestType::ChapterList, provider, base_url, request_path)
        }
    }

    pub fn chapter_detail(
        provider: &str,
        series: &str,
        chapter: &str,
        base_url: &str,
        request_path: &str,
    ) -> Self {
        Self {
            series: Some(series.to_string()),
            chapter: Some(chapter.to_string()),
            ..Self::base(ScrapeRequestType::ChapterDetail, provider, base_url, request_path)
        }
    }

    /// Check the fields each request type requires
    pub fn validate(&self) -> AppResult<()> {
        if is_blank(Some(&self.provider)) {
            return Err(AppError::InvalidInput("provider is required".to_string()));
        }
        if is_blank(Some(&self.base_url)) {
            return Err(AppError::InvalidInput("base url is required".to_string()));
        }
        if self.request_type.addresses_series() && is_blank(self.series.as_ref()) {
            return Err(AppError::InvalidInput(format!(
                "series is required for {}",
                self.request_type
            )));
        }
        if self.request_type.addresses_chapter() && is_blank(self.chapter.as_ref()) {
            return Err(AppError::InvalidInput(format!(
                "chapter is required for {}",
                self.request_type
            )));
        }
        Ok(())
    }
}

fn is_blank(value: Option<&String>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// The terminal update the worker writes after a crawl attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateScrapeRequestParams {
    pub status: ScrapeRequestStatus,
    pub total_time: f64,
    pub message: String,
}

impl UpdateScrapeRequestParams {
    pub const COMPLETED_MESSAGE: &'static str = "Completed successfully";

    pub fn completed(total_time: f64) -> Self {
        Self {
            status: ScrapeRequestStatus::Completed,
            total_time,
            message: Self::COMPLETED_MESSAGE.to_string(),
        }
    }

    pub fn failed(total_time: f64, message: impl Into<String>) -> Self {
        Self {
            status: ScrapeRequestStatus::Failed,
            total_time,
            message: message.into(),
        }
    }
}
