use url::Url;

/// Turn user input such as `acme.com` into an absolute `https://` URL
pub fn normalize_input_url(input: &str) -> Result<Url, url::ParseError> {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{}", trimmed))
    }
}

/// Resolve a possibly relative reference against the page URL
pub fn resolve_url(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with("javascript:") {
        return None;
    }
    base.join(reference).ok().map(|u| u.to_string())
}

/// Truncate to at most `max` characters without splitting a code point
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Collapse all runs of whitespace into single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First meaningful label of a host, e.g. `www.acme.co.uk` -> `acme`
pub fn domain_label(domain: &str) -> String {
    let host = domain.strip_prefix("www.").unwrap_or(domain);
    host.split('.').next().unwrap_or(host).to_string()
}

/// Host of `url` with a leading `www.` removed
pub fn bare_host(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| h.strip_prefix("www.").unwrap_or(h).to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_input_url() {
        assert_eq!(
            normalize_input_url("acme.com").unwrap().as_str(),
            "https://acme.com/"
        );
        assert_eq!(
            normalize_input_url("  http://acme.com/shop ").unwrap().as_str(),
            "http://acme.com/shop"
        );
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://acme.com/about/").unwrap();
        assert_eq!(
            resolve_url(&base, "/logo.png").as_deref(),
            Some("https://acme.com/logo.png")
        );
        assert_eq!(
            resolve_url(&base, "team.jpg").as_deref(),
            Some("https://acme.com/about/team.jpg")
        );
        assert_eq!(resolve_url(&base, "javascript:void(0)"), None);
        assert_eq!(resolve_url(&base, "   "), None);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_domain_label() {
        assert_eq!(domain_label("www.acme.co.uk"), "acme");
        assert_eq!(domain_label("shop.example"), "shop");
    }
}
