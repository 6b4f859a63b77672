/// Test data: fixture pages and a page fetcher that serves them
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use yomu_lib::modules::catalog::domain::{ChapterInit, Provider, SeriesInit};
use yomu_lib::modules::scraping::infrastructure::PageFetcher;
use yomu_lib::shared::errors::{AppError, AppResult};

pub const ASURA_BASE_URL: &str = "https://asuratoon.com";

/// Serves canned HTML by URL; unknown URLs answer like a 404
#[derive(Default)]
pub struct FixtureFetcher {
    pages: Mutex<HashMap<String, String>>,
    fetched: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, html: String) -> Self {
        self.pages.lock().unwrap().insert(url.to_string(), html);
        self
    }

    /// Every fetch sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> AppResult<String> {
        self.fetched.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let page = self.pages.lock().unwrap().get(url).cloned();
        page.ok_or_else(|| AppError::ExternalServiceError(format!("HTTP 404: {}", url)))
    }
}

pub fn asura_provider() -> Provider {
    Provider {
        slug: "asura".to_string(),
        name: "Asura Scans".to_string(),
        active: true,
        base_url: ASURA_BASE_URL.to_string(),
        list_path: "/manga/list-mode/".to_string(),
    }
}

/// List page in MangaReader markup; entries are `(path slug, title)`
pub fn asura_series_list_page(entries: &[(&str, &str)]) -> String {
    let items: String = entries
        .iter()
        .map(|(slug, title)| {
            format!(
                r#"<div class="bs"><div class="bsx"><a href="{}/manga/{}/" title="{}">{}</a></div></div>"#,
                ASURA_BASE_URL, slug, title, title
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="listupd">{}</div></body></html>"#,
        items
    )
}

/// Series page with `chapters` chapters, newest first
pub fn asura_series_page(series_slug: &str, chapters: usize) -> String {
    let items: String = (1..=chapters)
        .rev()
        .map(|n| {
            format!(
                r#"<li><a href="{}/1672760368-{}-chapter-{}/"><span class="chapternum">Chapter {}</span></a></li>"#,
                ASURA_BASE_URL, series_slug, n, n
            )
        })
        .collect();
    format!(
        r#"<html><body>
             <div class="thumb"><img src="https://cdn.asura/{slug}.webp" /></div>
             <div class="entry-content" itemprop="description"><p>Synopsis of {slug}.</p></div>
             <div class="imptdt">Status <i>Ongoing</i></div>
             <div class="mgen"><a>Action</a></div>
             <div id="chapterlist"><ul>{items}</ul></div>
           </body></html>"#,
        slug = series_slug,
        items = items
    )
}

pub fn asura_reader_page(title: &str, images: usize) -> String {
    let images: String = (1..=images)
        .map(|n| format!(r#"<img src="https://cdn.asura/page-{}.webp" />"#, n))
        .collect();
    format!(
        r#"<html><body>
             <h1 class="entry-title">{}</h1>
             <div id="readerarea">{}</div>
           </body></html>"#,
        title, images
    )
}

pub fn series_init(provider: &str, slug: &str) -> SeriesInit {
    SeriesInit {
        provider: provider.to_string(),
        slug: slug.to_string(),
        title: slug.replace('-', " "),
        source_path: format!("/manga/{}/", slug),
    }
}

pub fn chapter_init(provider: &str, series: &str, number: u32) -> ChapterInit {
    ChapterInit {
        provider: provider.to_string(),
        series: series.to_string(),
        slug: format!("{}-chapter-{}", series, number),
        number: number as f64,
        short_title: format!("Chapter {}", number),
        href: format!("{}/{}-chapter-{}/", ASURA_BASE_URL, series, number),
    }
}
