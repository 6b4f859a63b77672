//! WordPress manga themes most sources run on, described as selector profiles.

pub mod extract;
pub mod madara;
pub mod mangareader;

/// Theme family of a source site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    MangaReader,
    Madara,
}

/// CSS selectors locating each field on a site's pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    pub theme: Theme,
    /// Series links on the list page
    pub series_link: &'static str,
    pub thumbnail: &'static str,
    pub synopsis: &'static str,
    pub genres: &'static str,
    pub status: &'static str,
    /// One element per chapter on the series page
    pub chapter_item: &'static str,
    /// Chapter label inside `chapter_item`; the link text when absent
    pub chapter_label: Option<&'static str>,
    pub reader_title: &'static str,
    pub reader_images: &'static str,
    pub next_link: &'static str,
    pub prev_link: &'static str,
    /// Image attributes in order of preference (lazy loaders first)
    pub image_attrs: &'static [&'static str],
}

impl SiteProfile {
    pub fn mangareader() -> Self {
        mangareader::profile()
    }

    pub fn madara() -> Self {
        madara::profile()
    }

    pub fn with_image_attrs(mut self, image_attrs: &'static [&'static str]) -> Self {
        self.image_attrs = image_attrs;
        self
    }

    pub fn with_series_link(mut self, series_link: &'static str) -> Self {
        self.series_link = series_link;
        self
    }

    pub fn with_chapter_item(mut self, chapter_item: &'static str) -> Self {
        self.chapter_item = chapter_item;
        self
    }
}
