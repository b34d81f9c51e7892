use crate::parsers::PageDocument;
use crate::results::{CopySamples, Favicon, SocialLink};
use crate::utils::{collapse_whitespace, truncate_chars};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Host suffix to platform name; `x.com` reports as twitter
const SOCIAL_PLATFORMS: &[(&str, &str)] = &[
    ("instagram.com", "instagram"),
    ("facebook.com", "facebook"),
    ("linkedin.com", "linkedin"),
    ("twitter.com", "twitter"),
    ("x.com", "twitter"),
    ("tiktok.com", "tiktok"),
    ("youtube.com", "youtube"),
];

const BUTTON_SELECTOR: &str = "button, [role=\"button\"], input[type=\"submit\"], .btn, [class*=\"button\"], a[class*=\"cta\"], a[class*=\"button\"]";

const COPY_TEXT_CAP: usize = 80;
const COPY_SAMPLES_PER_PAGE: usize = 25;
const MEDIA_KIT_LINKS_PER_PAGE: usize = 20;

static CTA_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)get started|sign up|learn more|book now|contact us")
        .expect("cta pattern is valid")
});

static MEDIA_KIT_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"brand|press|media-kit|mediakit|media_kit|press-kit|logo.*download")
        .expect("media kit pattern is valid")
});

pub fn title(page: &PageDocument) -> Option<String> {
    page.first("title")
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Non-empty heading texts for `tag`, in document order
pub fn headings(page: &PageDocument, tag: &str) -> Vec<String> {
    page.select(tag)
        .into_iter()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Platform name for a social profile URL
pub fn social_platform(url: &Url) -> Option<&'static str> {
    let host = url.host_str()?.to_ascii_lowercase();
    SOCIAL_PLATFORMS
        .iter()
        .find(|(domain, _)| host == *domain || host.ends_with(&format!(".{}", domain)))
        .map(|(_, platform)| *platform)
}

/// First link per platform, in document order
pub fn social_links(page: &PageDocument) -> Vec<SocialLink> {
    let mut links: Vec<SocialLink> = Vec::new();

    for anchor in page.select("a[href]") {
        let Some(href) = anchor.value().attr("href").and_then(|h| page.resolve(h)) else {
            continue;
        };
        let Ok(url) = Url::parse(&href) else {
            continue;
        };
        if let Some(platform) = social_platform(&url) {
            if !links.iter().any(|l| l.platform == platform) {
                links.push(SocialLink {
                    platform: platform.to_string(),
                    url: href,
                });
            }
        }
    }

    links
}

/// Parsed JSON-LD blocks; malformed blocks are skipped
pub fn structured_data(page: &PageDocument) -> Vec<serde_json::Value> {
    page.select("script[type=\"application/ld+json\"]")
        .into_iter()
        .filter_map(|script| {
            let body = script.text().collect::<String>();
            let body = body.trim();
            if body.is_empty() {
                return None;
            }
            match serde_json::from_str::<serde_json::Value>(body) {
                Ok(serde_json::Value::Null) => None,
                Ok(value) => Some(value),
                Err(e) => {
                    ::log::debug!("Skipping malformed JSON-LD on {}: {}", page.base, e);
                    None
                }
            }
        })
        .collect()
}

/// Icon links (favicon, apple-touch-icon, shortcut icon)
pub fn favicons(page: &PageDocument) -> Vec<Favicon> {
    let mut icons: Vec<Favicon> = Vec::new();

    for link in page.select("link[rel][href]") {
        let el = link.value();
        let rel = el.attr("rel").unwrap_or_default().to_ascii_lowercase();
        if !(rel.contains("icon") || rel.contains("apple-touch") || rel.contains("shortcut")) {
            continue;
        }
        let Some(href) = el.attr("href").and_then(|h| page.resolve(h)) else {
            continue;
        };
        if icons.iter().any(|f| f.href == href) {
            continue;
        }
        icons.push(Favicon {
            href,
            sizes: el.attr("sizes").map(str::to_string),
            mime_type: el.attr("type").map(str::to_string),
            rel,
        });
    }

    icons
}

/// Button labels and call-to-action link texts
pub fn copy_samples(page: &PageDocument) -> CopySamples {
    let mut samples = CopySamples::default();

    for el in page.select(BUTTON_SELECTOR) {
        let raw = if el.value().name() == "input" {
            el.value().attr("value").unwrap_or_default().to_string()
        } else {
            el.text().collect::<String>()
        };
        push_sample(&mut samples.button_texts, &raw);
    }

    for anchor in page.select("a[href]") {
        let text = anchor.text().collect::<String>();
        let class = anchor.value().attr("class").unwrap_or_default().to_ascii_lowercase();
        let is_cta = class.contains("cta")
            || class.contains("primary")
            || class.contains("signup")
            || CTA_TEXT.is_match(&text);
        if is_cta {
            push_sample(&mut samples.cta_texts, &text);
        }
    }

    samples.button_texts.truncate(COPY_SAMPLES_PER_PAGE);
    samples.cta_texts.truncate(COPY_SAMPLES_PER_PAGE);
    samples
}

fn push_sample(list: &mut Vec<String>, raw: &str) {
    let text = truncate_chars(&collapse_whitespace(raw), COPY_TEXT_CAP);
    if !text.is_empty() && !list.contains(&text) {
        list.push(text);
    }
}

/// Links that look like press/brand/media-kit resources
pub fn media_kit_links(page: &PageDocument) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();

    for anchor in page.select("a[href]") {
        let href = anchor.value().attr("href").unwrap_or_default();
        if !MEDIA_KIT_HREF.is_match(&href.to_ascii_lowercase()) {
            continue;
        }
        if let Some(resolved) = page.resolve(href) {
            if !links.contains(&resolved) {
                links.push(resolved);
            }
        }
        if links.len() >= MEDIA_KIT_LINKS_PER_PAGE {
            break;
        }
    }

    links
}
