use super::{SiteProfile, Theme};

/// Madara (wp-manga) theme
pub fn profile() -> SiteProfile {
    SiteProfile {
        theme: Theme::Madara,
        series_link: "div.page-item-detail div.post-title a, div.page-item-detail h3 a",
        thumbnail: "div.summary_image img",
        synopsis: "div.summary__content, div.description-summary div.summary__content",
        genres: "div.genres-content a",
        status: "div.post-status div.summary-content",
        chapter_item: "li.wp-manga-chapter",
        chapter_label: None,
        reader_title: "h1#chapter-heading",
        reader_images: "div.reading-content img",
        next_link: "a.next_page",
        prev_link: "a.prev_page",
        image_attrs: &["data-src", "data-lazy-src", "src"],
    }
}
