//! Pure extraction of a [`PageSnapshot`] from a captured DOM.
//!
//! Nothing in here touches the browser: every heuristic works on the HTML
//! serialized by the session (with the probe's annotations) plus the
//! computed styles read alongside it.

pub mod colors;
pub mod html;
pub mod images;
pub mod logo;
pub mod product;
pub mod text;

#[cfg(test)]
mod tests;

use crate::crawlers::session::DomSnapshot;
use crate::filter::{THIRD_PARTY_CONTAINERS, is_third_party_url};
use crate::results::{LogoSystemRaw, PageSnapshot};
use crate::utils::{collapse_whitespace, resolve_url, truncate_chars};
use scraper::{ElementRef, Html, Selector};
use text::TextOptions;
use url::Url;

/// Maximum characters of main text kept per page
pub const MAIN_TEXT_CAP: usize = 8000;

/// Characters of body text kept as the above-the-fold sample
pub const ABOVE_FOLD_CAP: usize = 800;

/// Characters of footer text kept
pub const FOOTER_CAP: usize = 500;

/// A candidate needs more than this many characters to count as main content
const MAIN_TEXT_MIN: usize = 100;

const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role=\"main\"]",
    ".main-content",
    "#main-content",
];

const MAIN_STRIP: &[&str] = &["nav", "footer", "header"];
const BODY_STRIP: &[&str] = &["nav", "footer", "header", "aside"];

/// Parsed page with its base URL and the third-party container selector
pub struct PageDocument {
    pub doc: Html,
    pub base: Url,
    third_party: Option<Selector>,
}

impl PageDocument {
    pub fn parse(html: &str, base: Url) -> Self {
        let doc = Html::parse_document(html);
        let third_party = selector(&THIRD_PARTY_CONTAINERS.join(", "));
        Self {
            doc,
            base,
            third_party,
        }
    }

    /// All elements matching `css` in document order; an invalid selector matches nothing
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match selector(css) {
            Some(sel) => self.doc.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    pub fn first(&self, css: &str) -> Option<ElementRef<'_>> {
        selector(css).and_then(|sel| self.doc.select(&sel).next())
    }

    /// Resolve a reference found on this page to an absolute URL
    pub fn resolve(&self, reference: &str) -> Option<String> {
        resolve_url(&self.base, reference)
    }

    /// True when the element sits inside a cookie/chat widget container
    pub fn is_inside_third_party(&self, element: ElementRef<'_>) -> bool {
        let Some(containers) = &self.third_party else {
            return false;
        };
        containers.matches(&element)
            || element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| containers.matches(&a))
    }

    /// Trimmed `content` of the first matching meta tag
    pub fn meta(&self, css: &str) -> Option<String> {
        self.first(css)
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Extract everything the crawl needs from one captured page
pub fn extract_snapshot(dom: &DomSnapshot) -> PageSnapshot {
    let Ok(base) = Url::parse(&dom.url) else {
        ::log::warn!("Cannot extract from page with invalid url: {}", dom.url);
        return PageSnapshot {
            url: dom.url.clone(),
            ..PageSnapshot::default()
        };
    };
    let page = PageDocument::parse(&dom.html, base);

    let structured_data = html::structured_data(&page);
    let og_image = page
        .meta("meta[property=\"og:image\"]")
        .and_then(|u| page.resolve(&u));
    let logo_url = logo::find_logo(&page, &structured_data).or_else(|| og_image.clone());

    let all_vars = colors::merged_custom_properties(&page, &dom.styles);
    let theme_color = page.meta("meta[name=\"theme-color\"]");

    let logo_urls: Vec<String> = logo::logo_system_urls(&page)
        .into_iter()
        .filter(|u| !is_third_party_url(u))
        .collect();

    PageSnapshot {
        url: dom.url.clone(),
        title: html::title(&page),
        meta_description: page.meta("meta[name=\"description\"]"),
        og_title: page.meta("meta[property=\"og:title\"]"),
        og_description: page.meta("meta[property=\"og:description\"]"),
        og_image,
        og_site_name: page.meta("meta[property=\"og:site_name\"]"),
        h1: html::headings(&page, "h1"),
        h2: html::headings(&page, "h2"),
        main_text: main_text(&page),
        above_fold_text: above_fold_text(&page),
        logo_url,
        hero_image: images::hero_image(&page),
        social_links: html::social_links(&page),
        colors: colors::legacy_colors(&all_vars, theme_color.as_deref()),
        color_system_raw: colors::color_system(&all_vars, theme_color.as_deref()),
        element_colors: colors::element_colors(&dom.styles),
        footer_text: footer_text(&page),
        logo_system_raw: LogoSystemRaw {
            logo_urls,
            favicons: html::favicons(&page),
        },
        copy_samples: html::copy_samples(&page),
        all_image_urls: images::collect_image_urls(&page),
        media_kit_links: html::media_kit_links(&page),
        structured_data,
    }
}

/// Main content text, preferring content containers over the whole body
pub fn main_text(page: &PageDocument) -> String {
    let options = TextOptions::default();
    let mut text = String::new();

    for css in MAIN_SELECTORS {
        if let Some(el) = page.first(css) {
            text = text::inner_text(el, MAIN_STRIP, &options);
            if text.chars().count() > MAIN_TEXT_MIN {
                break;
            }
        }
    }

    if text.chars().count() < MAIN_TEXT_MIN {
        if let Some(body) = page.first("body") {
            text = text::inner_text(body, BODY_STRIP, &options);
        }
    }

    truncate_chars(&text, MAIN_TEXT_CAP)
}

fn above_fold_text(page: &PageDocument) -> String {
    let Some(body) = page.first("body") else {
        return String::new();
    };
    let text = text::inner_text(body, &[], &TextOptions::default());
    collapse_whitespace(&truncate_chars(&text, ABOVE_FOLD_CAP))
}

fn footer_text(page: &PageDocument) -> Option<String> {
    let footer = page.first("footer")?;
    let text = collapse_whitespace(&footer.text().collect::<String>());
    if text.is_empty() {
        None
    } else {
        Some(truncate_chars(&text, FOOTER_CAP))
    }
}
