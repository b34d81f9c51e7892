use crate::filter::is_third_party_url;
use crate::parsers::PageDocument;
use crate::parsers::logo::dimension;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Images smaller than this (in px²) never count as the hero
pub const HERO_MIN_AREA: u64 = 50_000;

/// Per-page image list cap
pub const PAGE_IMAGE_CAP: usize = 250;

/// `data:` URIs shorter than this are tracking pixels or placeholders
const DATA_URI_MIN_LEN: usize = 200;

const LAZY_ATTRS: &[&str] = &[
    "data-src",
    "data-lazy-src",
    "data-original",
    "data-bg",
    "data-bg-src",
];

const LAZY_SRCSET_ATTRS: &[&str] = &["data-srcset"];

const BACKGROUND_ATTRS: &[&str] = &["data-bg", "data-background", "data-background-image"];

const BACKGROUND_ELEMENTS: &str = "div, section, header, footer, article, aside, figure, span, a, li";

const HERO_CONTAINERS: &[&str] = &[
    "[class*=\"hero\"]",
    "[class*=\"banner\"]",
    "[class*=\"jumbotron\"]",
    "header",
    "section",
];

const META_IMAGES: &str =
    "meta[property=\"og:image\"], meta[name=\"twitter:image\"], meta[itemprop=\"image\"]";

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*["']?([^"')]+)["']?\s*\)"#).expect("css url pattern is valid")
});

/// Ordered image URL set that folds query-string variants of one asset
/// (same origin and path) onto the query-less URL
#[derive(Debug, Default)]
pub struct ImageSet {
    urls: Vec<String>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn len(&self) -> usize {
        self.urls.len()
    }

    /// Add an absolute URL; returns false if it was filtered or folded
    pub fn insert(&mut self, url: String) -> bool {
        if url.starts_with("data:") {
            if url.len() < DATA_URI_MIN_LEN || self.urls.contains(&url) {
                return false;
            }
            self.urls.push(url);
            return true;
        }
        if is_third_party_url(&url) {
            return false;
        }

        let Some(key) = path_key(&url) else {
            return false;
        };
        let has_query = url.contains('?');
        if let Some(existing) = self.urls.iter_mut().find(|u| path_key(u).as_ref() == Some(&key)) {
            if existing.contains('?') && !has_query {
                *existing = url;
            }
            return false;
        }
        self.urls.push(url);
        true
    }

    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

fn path_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    Some(format!("{}{}", parsed.origin().ascii_serialization(), parsed.path()))
}

/// First URL of every candidate in a `srcset` list
fn srcset_urls(srcset: &str) -> impl Iterator<Item = &str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
}

/// `url(...)` references inside a CSS `background-image` value
pub fn css_urls(value: &str) -> Vec<String> {
    CSS_URL
        .captures_iter(value)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|u| !u.is_empty())
        .collect()
}

/// Every image URL on the page, third-party assets excluded
pub fn collect_image_urls(page: &PageDocument) -> Vec<String> {
    let mut set = ImageSet::new();
    let mut add = |reference: &str| {
        if set.len() >= PAGE_IMAGE_CAP {
            return;
        }
        if let Some(url) = page.resolve(reference) {
            set.insert(url);
        }
    };

    for img in page.select("img") {
        if page.is_inside_third_party(img) {
            continue;
        }
        let el = img.value();
        for attr in ["src", "data-bs-current"] {
            if let Some(v) = el.attr(attr) {
                add(v);
            }
        }
        if let Some(srcset) = el.attr("srcset") {
            srcset_urls(srcset).for_each(&mut add);
        }
        for attr in LAZY_ATTRS {
            if let Some(v) = el.attr(attr) {
                add(v);
            }
        }
        for attr in LAZY_SRCSET_ATTRS {
            if let Some(v) = el.attr(attr) {
                srcset_urls(v).for_each(&mut add);
            }
        }
    }

    for source in page.select("picture source[srcset]") {
        if let Some(srcset) = source.value().attr("srcset") {
            srcset_urls(srcset).for_each(&mut add);
        }
    }

    for video in page.select("video[poster]") {
        if let Some(poster) = video.value().attr("poster") {
            add(poster);
        }
    }

    for el in page.select(BACKGROUND_ELEMENTS) {
        if page.is_inside_third_party(el) {
            continue;
        }
        let value = el.value();
        for css in [value.attr("data-bs-bg"), value.attr("style")].into_iter().flatten() {
            for u in css_urls(css) {
                add(&u);
            }
        }
        for attr in BACKGROUND_ATTRS {
            if let Some(v) = value.attr(attr) {
                add(v);
            }
        }
    }

    for meta in page.select(META_IMAGES) {
        if let Some(content) = meta.value().attr("content") {
            add(content);
        }
    }

    set.into_vec()
}

/// Largest image above the hero threshold, else the first hero-ish background
pub fn hero_image(page: &PageDocument) -> Option<String> {
    let mut best: Option<(u64, String)> = None;

    for img in page.select("img") {
        let el = img.value();
        let Some(src) = el
            .attr("data-bs-current")
            .or_else(|| el.attr("src"))
            .and_then(|s| page.resolve(s))
        else {
            continue;
        };
        let (Some(w), Some(h)) = (
            dimension(img, "data-bs-w", "width"),
            dimension(img, "data-bs-h", "height"),
        ) else {
            continue;
        };
        let area = u64::from(w) * u64::from(h);
        if area > HERO_MIN_AREA && best.as_ref().is_none_or(|(a, _)| area > *a) {
            best = Some((area, src));
        }
    }

    if let Some((_, src)) = best {
        return Some(src);
    }

    HERO_CONTAINERS.iter().find_map(|css| {
        let el = page.first(css)?;
        let value = el.value();
        let background = value.attr("data-bs-bg").or_else(|| value.attr("style"))?;
        css_urls(background)
            .first()
            .and_then(|u| page.resolve(u))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> PageDocument {
        PageDocument::parse(html, Url::parse("https://acme.test/").unwrap())
    }

    #[test]
    fn test_image_set_prefers_query_less_variant() {
        let mut set = ImageSet::new();
        assert!(set.insert("https://acme.test/a.jpg?v=3".to_string()));
        assert!(!set.insert("https://acme.test/a.jpg".to_string()));
        assert!(!set.insert("https://acme.test/a.jpg?v=4".to_string()));
        assert!(!set.insert("https://cdn.cookieyes.com/x.png".to_string()));
        assert!(!set.insert("data:image/gif;base64,R0lGOD".to_string()));
        assert_eq!(set.into_vec(), vec!["https://acme.test/a.jpg"]);
    }

    #[test]
    fn test_collect_image_urls_from_all_sources() {
        let doc = page(
            r#"<head><meta property="og:image" content="/og.png"></head><body>
            <img src="/a.jpg" srcset="/a-480.jpg 480w, /a-960.jpg 960w">
            <img data-src="/lazy.jpg">
            <picture><source srcset="/pic.webp 1x"></picture>
            <video poster="/poster.jpg"></video>
            <div style="background-image: url('/bg.jpg')"></div>
            <section data-bs-bg="url(&quot;https://acme.test/computed.jpg&quot;)"></section>
            <div id="cookieyes"><img src="/widget.png"></div>
            </body>"#,
        );
        let urls = collect_image_urls(&doc);
        let expected = [
            "https://acme.test/a.jpg",
            "https://acme.test/a-480.jpg",
            "https://acme.test/a-960.jpg",
            "https://acme.test/lazy.jpg",
            "https://acme.test/pic.webp",
            "https://acme.test/poster.jpg",
            "https://acme.test/bg.jpg",
            "https://acme.test/computed.jpg",
            "https://acme.test/og.png",
        ];
        assert_eq!(urls, expected);
    }

    #[test]
    fn test_hero_image_largest_above_threshold() {
        let doc = page(
            r#"<body>
            <img src="/small.jpg" data-bs-w="200" data-bs-h="200">
            <img src="/wide.jpg" data-bs-w="1600" data-bs-h="600">
            <img src="/big.jpg" width="1200" height="900">
            </body>"#,
        );
        assert_eq!(hero_image(&doc).as_deref(), Some("https://acme.test/big.jpg"));
    }

    #[test]
    fn test_hero_image_falls_back_to_background() {
        let doc = page(
            r#"<body>
            <img src="/icon.png" width="32" height="32">
            <div class="home-hero" style="background-image:url(/hero-bg.jpg)"></div>
            </body>"#,
        );
        assert_eq!(hero_image(&doc).as_deref(), Some("https://acme.test/hero-bg.jpg"));
    }

    #[test]
    fn test_css_urls() {
        assert_eq!(
            css_urls(r#"linear-gradient(red, blue), url("a.png"), url(b.jpg)"#),
            vec!["a.png", "b.jpg"]
        );
        assert!(css_urls("none").is_empty());
    }
}
