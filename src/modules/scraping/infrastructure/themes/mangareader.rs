use regex::Regex;
use std::sync::LazyLock;

use super::{SiteProfile, Theme};

static READER_IMAGES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""images"\s*:\s*(\[[^\]]*\])"#).expect("reader images pattern")
});

/// MangaReader (themesia) theme
pub fn profile() -> SiteProfile {
    SiteProfile {
        theme: Theme::MangaReader,
        series_link: "div.listupd div.bs div.bsx > a, div.soralist ul li a.series",
        thumbnail: "div.thumb img, div.thumbook img",
        synopsis: "div.entry-content[itemprop='description'], div.synp div.entry-content",
        genres: "div.mgen a, span.mgen a",
        status: "div.imptdt i, div.tsinfo div.imptdt i",
        chapter_item: "#chapterlist li",
        chapter_label: Some("span.chapternum"),
        reader_title: "h1.entry-title",
        reader_images: "#readerarea img",
        next_link: "a.ch-next-btn",
        prev_link: "a.ch-prev-btn",
        image_attrs: &["data-src", "data-lazy-src", "src"],
    }
}

/// Images listed in the `ts_reader.run({...})` bootstrap script.
///
/// Readers that render client-side leave `#readerarea` empty and ship the
/// image list as JSON instead.
pub fn reader_script_images(html: &str) -> Vec<String> {
    READER_IMAGES
        .captures_iter(html)
        .filter_map(|captures| captures.get(1))
        .filter_map(|list| serde_json::from_str::<Vec<String>>(list.as_str()).ok())
        .find(|images| !images.is_empty())
        .unwrap_or_default()
}
