use crate::results::{AggregatedScrape, Favicon};

/// Signals read off one merged logo-bundle URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogoUrlSignals {
    pub names_logo: bool,
    pub is_svg: bool,
    pub names_brand: bool,
    pub names_icon: bool,
    pub is_data_uri: bool,
}

impl LogoUrlSignals {
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        let path = lower.split(['?', '#']).next().unwrap_or(&lower);
        Self {
            names_logo: path.contains("logo"),
            is_svg: path.ends_with(".svg") || lower.starts_with("data:image/svg"),
            names_brand: path.contains("brand"),
            names_icon: path.contains("favicon") || path.contains("icon"),
            is_data_uri: lower.starts_with("data:"),
        }
    }
}

/// Score of a logo-bundle URL; higher is more likely the primary logo
pub fn score_logo_url(signals: LogoUrlSignals) -> i32 {
    let mut score = 0;
    if signals.names_logo {
        score += 3;
    }
    if signals.is_svg {
        score += 2;
    }
    if signals.names_brand {
        score += 1;
    }
    if signals.names_icon {
        score -= 2;
    }
    if signals.is_data_uri {
        score -= 1;
    }
    score
}

/// Largest edge declared in a favicon's `sizes`, e.g. `180x180` or `16x16 32x32`
fn declared_size(favicon: &Favicon) -> u32 {
    favicon
        .sizes
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|size| {
            let lower = size.to_ascii_lowercase();
            let (w, h) = lower.split_once('x')?;
            Some(w.parse::<u32>().ok()?.max(h.parse::<u32>().ok()?))
        })
        .max()
        .unwrap_or(0)
}

/// Apple touch icons first, then the largest declared size
pub fn best_favicon(favicons: &[Favicon]) -> Option<&Favicon> {
    favicons
        .iter()
        .enumerate()
        .max_by_key(|(index, f)| {
            let touch = f.rel.to_ascii_lowercase().contains("apple-touch");
            // earlier entries win ties
            (touch, declared_size(f), std::cmp::Reverse(*index))
        })
        .map(|(_, f)| f)
}

/// Logo for the scan result: the home page's scored pick, else the best URL of
/// the merged logo bundle, else the best favicon
pub fn pick_logo(scrape: &AggregatedScrape) -> Option<String> {
    if let Some(logo) = scrape.logo_url.as_ref().filter(|l| !l.trim().is_empty()) {
        return Some(logo.clone());
    }

    let bundled = scrape
        .logo_system_raw
        .logo_urls
        .iter()
        .enumerate()
        .max_by_key(|(index, url)| {
            (
                score_logo_url(LogoUrlSignals::from_url(url)),
                std::cmp::Reverse(*index),
            )
        })
        .map(|(_, url)| url.clone());
    if bundled.is_some() {
        return bundled;
    }

    best_favicon(&scrape.logo_system_raw.favicons).map(|f| f.href.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn favicon(href: &str, rel: &str, sizes: Option<&str>) -> Favicon {
        Favicon {
            href: href.to_string(),
            sizes: sizes.map(str::to_string),
            mime_type: None,
            rel: rel.to_string(),
        }
    }

    #[test]
    fn test_home_logo_wins() {
        let mut scrape = AggregatedScrape {
            logo_url: Some("https://acme.test/logo.png".to_string()),
            ..AggregatedScrape::default()
        };
        scrape.logo_system_raw.logo_urls = vec!["https://acme.test/brand-logo.svg".to_string()];
        assert_eq!(pick_logo(&scrape).as_deref(), Some("https://acme.test/logo.png"));
    }

    #[test]
    fn test_bundle_url_scoring() {
        let mut scrape = AggregatedScrape::default();
        scrape.logo_system_raw.logo_urls = vec![
            "https://acme.test/img/header.png".to_string(),
            "https://acme.test/img/icon-logo.png".to_string(),
            "https://acme.test/img/acme-logo.svg?v=3".to_string(),
        ];
        assert_eq!(
            pick_logo(&scrape).as_deref(),
            Some("https://acme.test/img/acme-logo.svg?v=3")
        );
    }

    #[test]
    fn test_score_logo_url() {
        assert_eq!(score_logo_url(LogoUrlSignals::from_url("https://a.test/logo.svg")), 5);
        assert_eq!(score_logo_url(LogoUrlSignals::from_url("https://a.test/favicon.ico")), -2);
        assert_eq!(score_logo_url(LogoUrlSignals::from_url("https://a.test/brand.png")), 1);
    }

    #[test]
    fn test_favicon_fallback() {
        let mut scrape = AggregatedScrape::default();
        scrape.logo_system_raw.favicons = vec![
            favicon("https://acme.test/favicon.ico", "icon", None),
            favicon("https://acme.test/icon-512.png", "icon", Some("512x512")),
            favicon("https://acme.test/apple.png", "apple-touch-icon", Some("180x180")),
        ];
        assert_eq!(pick_logo(&scrape).as_deref(), Some("https://acme.test/apple.png"));

        scrape.logo_system_raw.favicons.pop();
        assert_eq!(pick_logo(&scrape).as_deref(), Some("https://acme.test/icon-512.png"));
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(pick_logo(&AggregatedScrape::default()), None);
    }
}
