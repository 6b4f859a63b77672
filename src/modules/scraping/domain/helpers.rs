//! Normalisation shared by every site: slugs, chapter numbers, paths.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static CHAPTER_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:chapter|chap|ch|episode|ep)[\s._-]*(\d+)(?:[.,_-](\d+))?")
        .expect("chapter number pattern")
});

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:[.,](\d+))?").expect("number pattern"));

static NUMERIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:r?\d{4,}-)+").expect("numeric prefix pattern"));

/// Path component of a URL: `https://site/manga/x/?p=1` becomes `/manga/x/`.
///
/// Relative input is returned trimmed, query and fragment removed.
pub fn path_of(url: &str) -> String {
    let trimmed = url.trim();
    match reqwest::Url::parse(trimmed) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Last non-empty segment of a path
pub fn slug_from_path(path: &str) -> String {
    path_of(path)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or_default()
        .to_lowercase()
}

/// Lowercase, ASCII alphanumerics separated by single dashes
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Chapter number from a label or slug ("Chapter 12", "ch-12-5", "Episode 3.5")
pub fn parse_chapter_number(text: &str) -> Option<f64> {
    let captures = CHAPTER_NUMBER
        .captures(text)
        .or_else(|| FIRST_NUMBER.captures(text))?;

    let whole = captures.get(1)?.as_str();
    let number = match captures.get(2) {
        Some(fraction) => format!("{}.{}", whole, fraction.as_str()),
        None => whole.to_string(),
    };
    number.parse().ok()
}

/// Keep the first item of every path, preserving order
pub fn remove_duplicate_paths<T, F>(items: Vec<T>, path: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(path(item).trim_end_matches('/').to_string()))
        .collect()
}

/// Drop the numeric IDs some sites prepend to slugs (`1672760368-reincarnator`)
pub fn strip_numeric_prefix(slug: &str) -> String {
    NUMERIC_PREFIX.replace(slug, "").into_owned()
}

/// Drop the hash-like suffix some sites append to slugs (`reincarnator-a1b2c3d4`)
pub fn strip_hash_suffix(slug: &str) -> String {
    match slug.rsplit_once('-') {
        Some((head, tail))
            if !head.is_empty()
                && tail.len() >= 6
                && tail.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
                && tail.chars().any(|c| c.is_ascii_digit()) =>
        {
            head.to_string()
        }
        _ => slug.to_string(),
    }
}

/// Resolve `href` against `base_url`
pub fn absolute_url(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    match reqwest::Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Collapse runs of whitespace into single spaces
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
