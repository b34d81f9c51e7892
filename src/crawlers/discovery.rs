use crate::filter::{UrlFilter, normalize_url};
use crate::parsers::PageDocument;
use crate::results::PageType;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// A same-site link classified as one of the key page types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub url: String,
    pub page_type: PageType,
}

/// Ordered (type, path patterns) table; the first matching type wins
static KEY_PAGE_PATTERNS: LazyLock<Vec<(PageType, Vec<Regex>)>> = LazyLock::new(|| {
    let table: [(PageType, &[&str]); 4] = [
        (PageType::About, &["about", "who-we-are", "our-story", "company"]),
        (
            PageType::Services,
            &["service", "what-we-do", "solution", "offer", "product"],
        ),
        (PageType::Contact, &["contact", "get-in-touch", "reach-us"]),
        (PageType::Pricing, &["pric", "plan", "package"]),
    ];
    table
        .into_iter()
        .map(|(page_type, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(p).expect("key page pattern is valid"))
                .collect();
            (page_type, compiled)
        })
        .collect()
});

/// Page type for a URL path, if it matches the key page table
pub fn classify_path(path: &str) -> Option<PageType> {
    let path = path.to_ascii_lowercase();
    KEY_PAGE_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(&path)))
        .map(|(page_type, _)| *page_type)
}

/// Classify the page's same-site links, keeping the first link per type in
/// document order
pub fn discover(page: &PageDocument, base_domain: &str) -> Vec<DiscoveredLink> {
    let filter = UrlFilter::for_domain(base_domain);
    let mut found: Vec<DiscoveredLink> = Vec::new();

    for anchor in page.select("a[href]") {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(resolved) = page.resolve(href) else {
            continue;
        };
        let Ok(url) = Url::parse(&resolved) else {
            continue;
        };
        if !filter.should_follow(&url) {
            continue;
        }

        let Some(page_type) = classify_path(url.path()) else {
            continue;
        };
        if found.iter().any(|l| l.page_type == page_type) {
            continue;
        }

        let url = normalize_url(&url).to_string();
        ::log::debug!("Discovered {} page: {}", page_type.as_str(), url);
        found.push(DiscoveredLink { url, page_type });
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> PageDocument {
        PageDocument::parse(html, Url::parse("https://www.acme.test/").unwrap())
    }

    #[test]
    fn test_classify_path_table_order() {
        assert_eq!(classify_path("/About-Us"), Some(PageType::About));
        assert_eq!(classify_path("/our-story"), Some(PageType::About));
        assert_eq!(classify_path("/what-we-do"), Some(PageType::Services));
        assert_eq!(classify_path("/products/mugs"), Some(PageType::Services));
        assert_eq!(classify_path("/get-in-touch"), Some(PageType::Contact));
        assert_eq!(classify_path("/pricing"), Some(PageType::Pricing));
        // about wins over pricing when both match
        assert_eq!(classify_path("/company/plans"), Some(PageType::About));
        assert_eq!(classify_path("/blog"), None);
        assert_eq!(classify_path("/"), None);
    }

    #[test]
    fn test_discover_first_link_per_type() {
        let doc = page(
            r#"<body>
            <a href="/blog">Blog</a>
            <a href="/contact#form">Contact</a>
            <a href="/about">About</a>
            <a href="https://acme.test/about-team">Team</a>
            <a href="https://other.test/pricing">Partner pricing</a>
            <a href="/services/design">Design</a>
            <a href="/brochure-pricing.pdf">Brochure</a>
            <a href="/plans">Plans</a>
            <a href="mailto:hi@acme.test">Mail</a>
            </body>"#,
        );
        let links = discover(&doc, "acme.test");
        assert_eq!(
            links,
            vec![
                DiscoveredLink {
                    url: "https://www.acme.test/contact".to_string(),
                    page_type: PageType::Contact
                },
                DiscoveredLink {
                    url: "https://www.acme.test/about".to_string(),
                    page_type: PageType::About
                },
                DiscoveredLink {
                    url: "https://www.acme.test/services/design".to_string(),
                    page_type: PageType::Services
                },
                DiscoveredLink {
                    url: "https://www.acme.test/plans".to_string(),
                    page_type: PageType::Pricing
                },
            ]
        );
    }

    #[test]
    fn test_discover_is_deterministic() {
        let html = r#"<a href="/pricing">P</a><a href="/about">A</a><a href="/contact">C</a>"#;
        let first = discover(&page(html), "www.acme.test");
        let second = discover(&page(html), "www.acme.test");
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }
}
