use crate::filter::is_third_party_url;
use crate::parsers::PageDocument;
use crate::utils::bare_host;
use scraper::ElementRef;
use serde_json::Value;
use url::Url;

/// Inputs to the per-image logo score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogoCandidate {
    /// Inside a header, nav, or banner-like container
    pub in_header: bool,
    /// Closest enclosing link points at the site root
    pub links_home: bool,
    /// class/id/alt (or a close wrapper) mentions logo or brand
    pub logo_attrs: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

const HEADER_WEIGHT: i32 = 3;
const HOME_LINK_WEIGHT: i32 = 2;
const LOGO_ATTR_WEIGHT: i32 = 2;
const PLAUSIBLE_SIZE_WEIGHT: i32 = 1;
const TINY_PENALTY: i32 = -2;

const LOGO_MIN_PX: u32 = 40;
const LOGO_MAX_PX: u32 = 500;
const TINY_PX: u32 = 20;

/// Wrapper levels inspected for a `logo` class/id (`.logo img`)
const WRAPPER_DEPTH: usize = 3;

/// Score one image as a logo; only positive scores qualify
pub fn score_logo_candidate(candidate: &LogoCandidate) -> i32 {
    let mut score = 0;
    if candidate.in_header {
        score += HEADER_WEIGHT;
    }
    if candidate.links_home {
        score += HOME_LINK_WEIGHT;
    }
    if candidate.logo_attrs {
        score += LOGO_ATTR_WEIGHT;
    }
    if let Some(side) = largest_side(candidate.width, candidate.height) {
        if (LOGO_MIN_PX..=LOGO_MAX_PX).contains(&side) {
            score += PLAUSIBLE_SIZE_WEIGHT;
        }
        if side < TINY_PX {
            score += TINY_PENALTY;
        }
    }
    score
}

fn largest_side(width: Option<u32>, height: Option<u32>) -> Option<u32> {
    match (width, height) {
        (Some(w), Some(h)) => Some(w.max(h)),
        (Some(w), None) => Some(w),
        (None, Some(h)) => Some(h),
        (None, None) => None,
    }
}

/// Page logo: JSON-LD `Organization.logo`, then the best DOM candidate
pub fn find_logo(page: &PageDocument, structured_data: &[Value]) -> Option<String> {
    if let Some(logo) = structured_data_logo(structured_data) {
        if let Some(resolved) = page.resolve(&logo) {
            return Some(resolved);
        }
    }
    dom_logo(page)
}

/// `logo` of the first `Organization` node, searching `@graph` arrays too
pub fn structured_data_logo(structured_data: &[Value]) -> Option<String> {
    structured_data.iter().find_map(organization_logo)
}

fn organization_logo(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(organization_logo),
        Value::Object(map) => {
            if is_type(value, "Organization") {
                if let Some(logo) = map.get("logo").and_then(logo_value) {
                    return Some(logo);
                }
            }
            map.get("@graph").and_then(organization_logo)
        }
        _ => None,
    }
}

fn is_type(value: &Value, expected: &str) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == expected,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(expected)),
        _ => false,
    }
}

fn logo_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(map) => map
            .get("url")
            .or_else(|| map.get("contentUrl"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Array(items) => items.iter().find_map(logo_value),
        _ => None,
    }
}

/// Highest-scoring `<img>` among header-ish and logo-ish images
pub fn dom_logo(page: &PageDocument) -> Option<String> {
    let mut best: Option<(i32, String)> = None;

    for img in page.select("img") {
        if page.is_inside_third_party(img) {
            continue;
        }
        let Some(src) = image_source(page, img) else {
            continue;
        };
        if is_third_party_url(&src) {
            continue;
        }

        let candidate = LogoCandidate {
            in_header: in_header_container(img),
            links_home: links_to_root(page, img),
            logo_attrs: has_logo_attrs(img),
            width: dimension(img, "data-bs-w", "width"),
            height: dimension(img, "data-bs-h", "height"),
        };
        if !candidate.in_header && !candidate.logo_attrs {
            continue;
        }

        let score = score_logo_candidate(&candidate);
        ::log::trace!("Logo candidate {} scored {}", src, score);
        if score > 0 && best.as_ref().is_none_or(|(s, _)| score > *s) {
            best = Some((score, src));
        }
    }

    best.map(|(_, src)| src)
}

/// Logo-ish images for the logo bundle, in document order
pub fn logo_system_urls(page: &PageDocument) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();

    for img in page.select("img[src]") {
        if page.is_inside_third_party(img) {
            continue;
        }
        let el = img.value();
        let class = el.attr("class").unwrap_or_default().to_ascii_lowercase();
        let id = el.attr("id").unwrap_or_default().to_ascii_lowercase();
        let alt = el.attr("alt").unwrap_or_default().to_ascii_lowercase();
        if !(class.contains("logo") || id.contains("logo") || alt.contains("logo") || class.contains("brand")) {
            continue;
        }
        if let Some(src) = image_source(page, img) {
            if !urls.contains(&src) {
                urls.push(src);
            }
        }
    }

    urls
}

fn image_source(page: &PageDocument, img: ElementRef<'_>) -> Option<String> {
    let el = img.value();
    el.attr("src")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| el.attr("data-src"))
        .and_then(|s| page.resolve(s))
}

fn attr_lower(el: ElementRef<'_>, name: &str) -> String {
    el.value().attr(name).unwrap_or_default().to_ascii_lowercase()
}

fn in_header_container(img: ElementRef<'_>) -> bool {
    img.ancestors().filter_map(ElementRef::wrap).any(|a| {
        let name = a.value().name();
        if name == "header" || name == "nav" {
            return true;
        }
        if attr_lower(a, "role") == "banner" {
            return true;
        }
        let marks = format!("{} {}", attr_lower(a, "class"), attr_lower(a, "id"));
        ["header", "navbar", "masthead", "banner", "topbar", "site-nav"]
            .iter()
            .any(|m| marks.contains(m))
            || marks.split_whitespace().any(|t| t == "nav")
    })
}

fn has_logo_attrs(img: ElementRef<'_>) -> bool {
    let own = format!(
        "{} {} {}",
        attr_lower(img, "class"),
        attr_lower(img, "id"),
        attr_lower(img, "alt")
    );
    if own.contains("logo") || own.contains("brand") {
        return true;
    }
    img.ancestors()
        .filter_map(ElementRef::wrap)
        .take(WRAPPER_DEPTH)
        .any(|a| {
            let marks = format!("{} {}", attr_lower(a, "class"), attr_lower(a, "id"));
            marks.contains("logo")
        })
}

fn links_to_root(page: &PageDocument, img: ElementRef<'_>) -> bool {
    let Some(anchor) = img
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "a")
    else {
        return false;
    };
    let Some(href) = anchor.value().attr("href").and_then(|h| page.resolve(h)) else {
        return false;
    };
    let Ok(target) = Url::parse(&href) else {
        return false;
    };
    bare_host(&target) == bare_host(&page.base)
        && matches!(target.path(), "/" | "" | "/index.html" | "/home")
}

/// Pixel dimension from the probe annotation, else the HTML attribute
pub(crate) fn dimension(img: ElementRef<'_>, annotated: &str, attribute: &str) -> Option<u32> {
    let el = img.value();
    el.attr(annotated)
        .and_then(parse_px)
        .or_else(|| el.attr(attribute).and_then(parse_px))
}

fn parse_px(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok().filter(|v| *v > 0)
}
