//! Selector-driven extraction shared by the WordPress manga themes.
//!
//! Everything here is synchronous: `scraper::Html` is not `Send`, so a page is
//! parsed and dropped before the calling strategy awaits again.

use scraper::{ElementRef, Html, Selector};

use super::{SiteProfile, Theme};
use crate::modules::catalog::domain::SeriesStatus;
use crate::modules::scraping::domain::helpers::{
    absolute_url, clean_text, parse_chapter_number, path_of, remove_duplicate_paths,
    slug_from_path,
};
use crate::modules::scraping::domain::{
    ChapterDetail, ChapterListItem, SeriesDetail, SeriesListItem,
};
use crate::shared::errors::{AppError, AppResult};

fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css)
        .map_err(|e| AppError::InternalError(format!("invalid selector '{}': {:?}", css, e)))
}

fn first_text(root: ElementRef<'_>, css: &str) -> AppResult<Option<String>> {
    let sel = selector(css)?;
    Ok(root
        .select(&sel)
        .map(|el| clean_text(&el.text().collect::<String>()))
        .find(|text| !text.is_empty()))
}

fn image_source(el: ElementRef<'_>, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|attr| el.value().attr(attr))
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:"))
        .map(str::to_string)
}

/// Link target usable as a navigation path; `#` and script links are ignored
fn usable_href(href: Option<&str>) -> Option<&str> {
    href.map(str::trim)
        .filter(|h| !h.is_empty() && !h.starts_with('#') && !h.starts_with("javascript:"))
}

pub fn series_list(html: &str, profile: &SiteProfile) -> AppResult<Vec<SeriesListItem>> {
    let document = Html::parse_document(html);
    let link = selector(profile.series_link)?;

    let items: Vec<SeriesListItem> = document
        .select(&link)
        .filter_map(|el| {
            let href = usable_href(el.value().attr("href"))?;
            let title = el
                .value()
                .attr("title")
                .map(clean_text)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| clean_text(&el.text().collect::<String>()));
            let source_path = path_of(href);
            let slug = slug_from_path(&source_path);
            if title.is_empty() || slug.is_empty() {
                return None;
            }
            Some(SeriesListItem {
                title,
                slug,
                source_path,
            })
        })
        .collect();

    Ok(remove_duplicate_paths(items, |item| item.source_path.as_str()))
}

pub fn series_detail(html: &str, profile: &SiteProfile, page_url: &str) -> AppResult<SeriesDetail> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let thumbnail = selector(profile.thumbnail)?;
    let thumbnail_url = root
        .select(&thumbnail)
        .find_map(|img| image_source(img, profile.image_attrs))
        .map(|src| absolute_url(page_url, &src))
        .unwrap_or_default();

    let synopsis = first_text(root, profile.synopsis)?.unwrap_or_default();

    let genre = selector(profile.genres)?;
    let mut genres: Vec<String> = root
        .select(&genre)
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|g| !g.is_empty())
        .collect();
    genres.dedup();

    let status = first_text(root, profile.status)?.and_then(|s| s.parse::<SeriesStatus>().ok());

    if thumbnail_url.is_empty() && synopsis.is_empty() {
        return Err(AppError::ExternalServiceError(format!(
            "no series details found at {}",
            page_url
        )));
    }

    Ok(SeriesDetail {
        thumbnail_url,
        synopsis,
        genres,
        status,
    })
}

pub fn chapter_list(html: &str, profile: &SiteProfile) -> AppResult<Vec<ChapterListItem>> {
    let document = Html::parse_document(html);
    let item = selector(profile.chapter_item)?;
    let anchor = selector("a[href]")?;
    let label = profile.chapter_label.map(selector).transpose()?;

    let mut chapters = Vec::new();
    for el in document.select(&item) {
        let link = if el.value().name() == "a" {
            Some(el)
        } else {
            el.select(&anchor).next()
        };
        let Some(link) = link else { continue };
        let Some(href) = usable_href(link.value().attr("href")) else {
            continue;
        };

        let short_title = label
            .as_ref()
            .and_then(|l| el.select(l).next())
            .map(|l| clean_text(&l.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| clean_text(&link.text().collect::<String>()));

        let slug = slug_from_path(href);
        let Some(number) = parse_chapter_number(&short_title).or_else(|| parse_chapter_number(&slug))
        else {
            log::debug!("Skipping chapter without a number: {}", href);
            continue;
        };

        chapters.push(ChapterListItem {
            short_title,
            slug,
            number,
            href: href.to_string(),
        });
    }

    Ok(remove_duplicate_paths(chapters, |c| c.href.as_str()))
}

pub fn chapter_detail(html: &str, profile: &SiteProfile, page_url: &str) -> AppResult<ChapterDetail> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let full_title = first_text(root, profile.reader_title)?.unwrap_or_default();

    let image = selector(profile.reader_images)?;
    let mut content_paths: Vec<String> = root
        .select(&image)
        .filter_map(|img| image_source(img, profile.image_attrs))
        .map(|src| absolute_url(page_url, &src))
        .collect();

    if content_paths.is_empty() && profile.theme == Theme::MangaReader {
        content_paths = super::mangareader::reader_script_images(html);
    }
    let content_paths = remove_duplicate_paths(content_paths, |p| p.as_str());

    if content_paths.is_empty() {
        return Err(AppError::ExternalServiceError(format!(
            "no chapter images found at {}",
            page_url
        )));
    }

    let (next_slug, next_path) = navigation(root, profile.next_link)?;
    let (prev_slug, prev_path) = navigation(root, profile.prev_link)?;

    Ok(ChapterDetail {
        full_title,
        source_path: path_of(page_url),
        content_paths,
        next_slug,
        next_path,
        prev_slug,
        prev_path,
    })
}

fn navigation(root: ElementRef<'_>, css: &str) -> AppResult<(Option<String>, Option<String>)> {
    let sel = selector(css)?;
    let path = root
        .select(&sel)
        .find_map(|a| usable_href(a.value().attr("href")))
        .map(path_of)
        .filter(|p| !p.trim_matches('/').is_empty());

    Ok(match path {
        Some(path) => (Some(slug_from_path(&path)), Some(path)),
        None => (None, None),
    })
}
