use serde::{Deserialize, Serialize};

use crate::modules::catalog::domain::{
    ChapterDetailUpdate, ChapterInit, SeriesDetailUpdate, SeriesInit, SeriesStatus,
};

/// One entry of a series-list page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesListItem {
    pub title: String,
    pub slug: String,
    pub source_path: String,
}

impl SeriesListItem {
    pub fn into_init(self, provider: &str) -> SeriesInit {
        SeriesInit {
            provider: provider.to_string(),
            slug: self.slug,
            title: self.title,
            source_path: self.source_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDetail {
    pub thumbnail_url: String,
    pub synopsis: String,
    pub genres: Vec<String>,
    pub status: Option<SeriesStatus>,
}

impl From<SeriesDetail> for SeriesDetailUpdate {
    fn from(detail: SeriesDetail) -> Self {
        Self {
            thumbnail_url: detail.thumbnail_url,
            synopsis: detail.synopsis,
            genres: detail.genres,
            status: detail.status,
        }
    }
}

/// One entry of a series page's chapter list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterListItem {
    pub short_title: String,
    pub slug: String,
    pub number: f64,
    pub href: String,
}

impl ChapterListItem {
    pub fn into_init(self, provider: &str, series: &str) -> ChapterInit {
        ChapterInit {
            provider: provider.to_string(),
            series: series.to_string(),
            slug: self.slug,
            number: self.number,
            short_title: self.short_title,
            href: self.href,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChapterDetail {
    pub full_title: String,
    pub source_path: String,
    pub content_paths: Vec<String>,
    pub next_slug: Option<String>,
    pub next_path: Option<String>,
    pub prev_slug: Option<String>,
    pub prev_path: Option<String>,
}

impl From<ChapterDetail> for ChapterDetailUpdate {
    fn from(detail: ChapterDetail) -> Self {
        Self {
            full_title: detail.full_title,
            source_path: detail.source_path,
            content_paths: detail.content_paths,
            next_slug: detail.next_slug,
            next_path: detail.next_path,
            prev_slug: detail.prev_slug,
            prev_path: detail.prev_path,
        }
    }
}

/// Result of one crawl, by request type
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    SeriesList(Vec<SeriesListItem>),
    SeriesDetail(SeriesDetail),
    ChapterList(Vec<ChapterListItem>),
    ChapterDetail(ChapterDetail),
}

impl ScrapeOutcome {
    /// Number of records the outcome carries
    pub fn item_count(&self) -> usize {
        match self {
            ScrapeOutcome::SeriesList(items) => items.len(),
            ScrapeOutcome::ChapterList(items) => items.len(),
            ScrapeOutcome::SeriesDetail(_) | ScrapeOutcome::ChapterDetail(_) => 1,
        }
    }
}
