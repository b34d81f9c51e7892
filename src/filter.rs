use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Hosts of cookie-consent, chat, and analytics vendors whose assets never
/// belong to the brand being scanned
static THIRD_PARTY_DOMAINS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)cookieyes|onetrust|cookiebot|hubspot|intercom|drift|tawk|livechat|tidio|crisp\.chat|zendesk|freshdesk|olark|purechat|chatra|smartsupp|userlike|gorgias|facebook\.net|fbcdn|google-analytics|googletagmanager|hotjar|clarity\.ms",
    )
    .expect("third-party domain pattern is valid")
});

/// Containers injected by third-party widgets
pub const THIRD_PARTY_CONTAINERS: &[&str] = &[
    "#cookieyes",
    "#cky-consent",
    "[class*=\"cookieyes\"]",
    "#onetrust-consent-sdk",
    "[class*=\"cookiebot\"]",
    "[class*=\"cookie-banner\"]",
    "[class*=\"cookie-consent\"]",
    "[class*=\"cookie-notice\"]",
    "#tidio-chat",
    "[class*=\"intercom\"]",
    "[class*=\"drift-\"]",
    "[class*=\"tawk-\"]",
    "[class*=\"chat-widget\"]",
    "[class*=\"livechat\"]",
];

/// True when the URL points at a known widget/analytics vendor
pub fn is_third_party_url(url: &str) -> bool {
    !url.is_empty() && THIRD_PARTY_DOMAINS.is_match(url)
}

/// Assets and documents are never classified pages
static ASSET_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|svg|css|js|ico|woff|woff2|ttf|eot|pdf|zip)$")
        .expect("asset extension pattern is valid")
});

/// Decides which discovered links stay on the scanned site
#[derive(Debug, Clone)]
pub struct UrlFilter {
    /// Host links must belong to (a leading `www.` is ignored on both sides)
    required_domain: String,
}

impl UrlFilter {
    pub fn for_domain(domain: &str) -> Self {
        Self {
            required_domain: domain.to_string(),
        }
    }

    /// Determine if a resolved link should be considered for the crawl
    pub fn should_follow(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if !self.is_in_domain_scope(url) {
            return false;
        }

        !ASSET_EXTENSION.is_match(url.path())
    }

    fn is_in_domain_scope(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => strip_www(host).eq_ignore_ascii_case(strip_www(&self.required_domain)),
            None => false,
        }
    }
}

/// The URL with its fragment removed
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
