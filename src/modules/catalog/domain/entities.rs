/// Catalog entities scraped from manga sources
///
/// `Provider` is read-only to the core; `Series` and `Chapter` are created as
/// shell records from list pages and enriched from detail pages.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A manga source website
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub slug: String,
    pub name: String,
    pub active: bool,
    pub base_url: String,
    /// Path of the page listing the site's series
    pub list_path: String,
}

impl Provider {
    pub fn list_url(&self) -> String {
        join_url(&self.base_url, &self.list_path)
    }
}

/// Publication status as shown on the series page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeriesStatus {
    /// Series discovered on a list page are presumed ongoing until a detail page says otherwise
    #[default]
    Ongoing,
    Completed,
    Hiatus,
    Dropped,
}

impl std::fmt::Display for SeriesStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesStatus::Ongoing => write!(f, "ongoing"),
            SeriesStatus::Completed => write!(f, "completed"),
            SeriesStatus::Hiatus => write!(f, "hiatus"),
            SeriesStatus::Dropped => write!(f, "dropped"),
        }
    }
}

impl std::str::FromStr for SeriesStatus {
    type Err = String;

    /// Lenient parse of the status label sites print ("Ongoing", "Completed", "On Hiatus", ...).
    /// Labels are matched word by word, so "Pending" or "Suspended" are not read as "end".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        let words: Vec<&str> = label
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();
        let has = |candidates: &[&str]| words.iter().any(|word| candidates.contains(word));

        if has(&["ongoing", "publishing", "releasing"]) || words == ["on", "going"] {
            Ok(SeriesStatus::Ongoing)
        } else if has(&["completed", "complete", "finished", "end", "ended"]) {
            Ok(SeriesStatus::Completed)
        } else if has(&["hiatus"]) {
            Ok(SeriesStatus::Hiatus)
        } else if has(&["dropped", "drop", "cancelled", "canceled"]) {
            Ok(SeriesStatus::Dropped)
        } else {
            Err(format!("Invalid series status: {}", s))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub provider: String,
    /// Unique per provider
    pub slug: String,
    pub title: String,
    pub source_path: String,
    pub thumbnail_url: Option<String>,
    pub synopsis: Option<String>,
    pub genres: Vec<String>,
    pub status: SeriesStatus,
    pub chapters_count: u32,
    pub latest_chapter: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Series {
    pub fn from_init(init: &SeriesInit) -> Self {
        let now = Utc::now();
        Self {
            provider: init.provider.clone(),
            slug: init.slug.clone(),
            title: init.title.clone(),
            source_path: init.source_path.clone(),
            thumbnail_url: None,
            synopsis: None,
            genres: Vec::new(),
            status: SeriesStatus::default(),
            chapters_count: 0,
            latest_chapter: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the list-page fields, keeping everything a detail crawl filled in
    pub fn apply_init(&mut self, init: &SeriesInit) {
        self.title = init.title.clone();
        self.source_path = init.source_path.clone();
        self.updated_at = Utc::now();
    }

    pub fn apply_detail(&mut self, update: &SeriesDetailUpdate) {
        self.thumbnail_url = Some(update.thumbnail_url.clone());
        self.synopsis = Some(update.synopsis.clone());
        self.genres = update.genres.clone();
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }

    pub fn apply_latest(&mut self, update: &SeriesLatestUpdate) {
        self.chapters_count = update.chapters_count;
        self.latest_chapter = update.latest_chapter.clone();
        self.updated_at = Utc::now();
    }

    /// True while the series still lacks a thumbnail or a synopsis
    pub fn needs_detail(&self) -> bool {
        is_blank(&self.thumbnail_url) || is_blank(&self.synopsis)
    }
}

/// Shell record produced from a series-list page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesInit {
    pub provider: String,
    pub slug: String,
    pub title: String,
    pub source_path: String,
}

/// Enrichment produced from a series-detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDetailUpdate {
    pub thumbnail_url: String,
    pub synopsis: String,
    pub genres: Vec<String>,
    pub status: Option<SeriesStatus>,
}

/// Latest-chapter bookkeeping refreshed after a chapter-list crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesLatestUpdate {
    pub chapters_count: u32,
    pub latest_chapter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub provider: String,
    pub series: String,
    /// Unique per series and provider
    pub slug: String,
    pub number: f64,
    pub short_title: String,
    pub href: String,
    pub full_title: Option<String>,
    pub source_path: Option<String>,
    pub next_slug: Option<String>,
    pub next_path: Option<String>,
    pub prev_slug: Option<String>,
    pub prev_path: Option<String>,
    /// Ordered content image paths
    pub content_paths: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    pub fn from_init(init: &ChapterInit) -> Self {
        let now = Utc::now();
        Self {
            provider: init.provider.clone(),
            series: init.series.clone(),
            slug: init.slug.clone(),
            number: init.number,
            short_title: init.short_title.clone(),
            href: init.href.clone(),
            full_title: None,
            source_path: None,
            next_slug: None,
            next_path: None,
            prev_slug: None,
            prev_path: None,
            content_paths: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_init(&mut self, init: &ChapterInit) {
        self.number = init.number;
        self.short_title = init.short_title.clone();
        self.href = init.href.clone();
        self.updated_at = Utc::now();
    }

    pub fn apply_detail(&mut self, update: &ChapterDetailUpdate) {
        self.full_title = Some(update.full_title.clone());
        self.source_path = Some(update.source_path.clone());
        self.content_paths = update.content_paths.clone();
        self.next_slug = update.next_slug.clone();
        self.next_path = update.next_path.clone();
        self.prev_slug = update.prev_slug.clone();
        self.prev_path = update.prev_path.clone();
        self.updated_at = Utc::now();
    }

    /// True while the chapter has no full title or no content images
    pub fn needs_detail(&self) -> bool {
        is_blank(&self.full_title) || self.content_paths.is_empty()
    }
}

/// Shell record produced from a chapter-list page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterInit {
    pub provider: String,
    pub series: String,
    pub slug: String,
    pub number: f64,
    pub short_title: String,
    pub href: String,
}

/// Enrichment produced from a chapter reader page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDetailUpdate {
    pub full_title: String,
    pub source_path: String,
    pub content_paths: Vec<String>,
    pub next_slug: Option<String>,
    pub next_path: Option<String>,
    pub prev_slug: Option<String>,
    pub prev_path: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Concatenate a base URL and a path without doubling the separator
pub fn join_url(base_url: &str, path: &str) -> String {
    match (base_url.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base_url, &path[1..]),
        _ => format!("{}{}", base_url, path),
    }
}
