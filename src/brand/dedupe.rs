use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

static SIZE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[-_.]\d+x\d+$").expect("size suffix pattern is valid"));

static DENSITY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[@\-_](\d+)x$").expect("density suffix pattern is valid"));

static VARIANT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[-_](?:thumb|small|medium|large|min|scaled|mini|tiny|big|full|original)$")
        .expect("variant suffix pattern is valid")
});

static HASH_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[-.]([a-f0-9]{8,})$").expect("hash suffix pattern is valid"));

static SIZE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+x\d+").expect("size token pattern is valid"));

static THUMB_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[@\-_](?:thumb|small|mini|tiny)").expect("thumb marker pattern is valid")
});

/// Identity shared by the size, density and cache-busting variants of one
/// asset: lowercase origin plus the path with those markers stripped from the
/// filename. Unparseable input and `data:` URIs are their own key.
pub fn canonical_image_key(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) if !url.cannot_be_a_base() => format!(
            "{}{}",
            url.origin().ascii_serialization().to_ascii_lowercase(),
            path_base(url.path())
        ),
        _ => raw.to_string(),
    }
}

fn path_base(path: &str) -> String {
    let (dir, file) = match path.rfind('/') {
        Some(idx) => path.split_at(idx + 1),
        None => ("", path),
    };
    let (name, ext) = match file.rfind('.') {
        Some(idx) => file.split_at(idx),
        None => (file, ""),
    };

    // density before size: hero-300x200@2x
    let name = DENSITY_SUFFIX.replace(name, "");
    let name = SIZE_SUFFIX.replace(&name, "");
    let name = VARIANT_SUFFIX.replace(&name, "");
    let name = HASH_SUFFIX.replace(&name, "");

    format!("{}{}{}", dir, name, ext)
}

/// Which of several variants to keep; higher wins
pub fn preference_score(raw: &str) -> u32 {
    let Ok(url) = Url::parse(raw) else {
        return 0;
    };
    let path = url.path();
    let name = &path[path.rfind('/').map_or(0, |i| i + 1)..];

    let mut score = 0;
    if url.query().is_none_or(str::is_empty) {
        score += 10;
    }
    if !SIZE_TOKEN.is_match(name) {
        score += 5;
    }
    if !THUMB_MARKER.is_match(name) {
        score += 3;
    }
    score
}

/// Collapse image variants to one URL per canonical key.
///
/// Output keeps the order in which each key was first seen; a later variant
/// only replaces the kept one when it scores strictly higher.
pub fn dedupe_image_urls(urls: &[String], max_count: Option<usize>) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut kept: HashMap<String, String> = HashMap::new();

    for url in urls.iter().filter(|u| !u.trim().is_empty()) {
        let key = canonical_image_key(url);
        match kept.get(&key) {
            Some(existing) if preference_score(url) <= preference_score(existing) => {}
            Some(_) => {
                kept.insert(key, url.clone());
            }
            None => {
                order.push(key.clone());
                kept.insert(key, url.clone());
            }
        }
    }

    let out = order.into_iter().filter_map(|key| kept.remove(&key));
    match max_count {
        Some(max) => out.take(max).collect(),
        None => out.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_variants_share_a_key() {
        let base = canonical_image_key("https://acme.test/img/hero.jpg");
        assert_eq!(base, "https://acme.test/img/hero.jpg");
        for variant in [
            "https://acme.test/img/hero.jpg?w=600",
            "https://acme.test/img/hero-300x200.jpg",
            "https://acme.test/img/hero@2x.jpg",
            "https://acme.test/img/hero-thumb.jpg",
            "https://acme.test/img/hero.3f9a1c2d7e.jpg",
            "https://ACME.test/img/hero_1024x768.jpg",
            "https://acme.test/img/hero-300x200@2x.jpg",
            "https://acme.test/img/hero_768x512-2x.jpg",
        ] {
            assert_eq!(canonical_image_key(variant), base, "{}", variant);
        }
        assert_ne!(canonical_image_key("https://acme.test/img/team.jpg"), base);
        assert_eq!(canonical_image_key("not a url"), "not a url");
    }

    #[test]
    fn test_query_less_variant_is_preferred() {
        let out = dedupe_image_urls(
            &urls(&["https://acme.test/a.jpg?x=1", "https://acme.test/a.jpg"]),
            None,
        );
        assert_eq!(out, vec!["https://acme.test/a.jpg"]);
    }

    #[test]
    fn test_preference_score() {
        assert_eq!(preference_score("https://acme.test/a.jpg"), 18);
        assert_eq!(preference_score("https://acme.test/a.jpg?v=2"), 8);
        assert_eq!(preference_score("https://acme.test/a-300x200.jpg"), 13);
        assert_eq!(preference_score("https://acme.test/a-thumb.jpg"), 15);
        assert_eq!(preference_score("garbage"), 0);
    }

    #[test]
    fn test_ties_keep_first_and_order_is_stable() {
        let out = dedupe_image_urls(
            &urls(&[
                "https://acme.test/b.png",
                "https://acme.test/a-small.png",
                "https://acme.test/b.png",
                "https://acme.test/a.png",
                "https://acme.test/c@2x.png",
                "https://acme.test/c@3x.png",
            ]),
            None,
        );
        assert_eq!(
            out,
            vec![
                "https://acme.test/b.png",
                "https://acme.test/a.png",
                "https://acme.test/c@2x.png"
            ]
        );
    }

    #[test]
    fn test_data_uris_are_their_own_key() {
        let png = "data:image/png;base64,iVBORw0KGgo/AAAA-300x200";
        assert_eq!(canonical_image_key(png), png);

        let out = dedupe_image_urls(
            &urls(&[png, "data:image/png;base64,iVBORw0KGgo/AAAA", png]),
            None,
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let cases: Vec<Vec<&str>> = vec![
            vec![
                "https://acme.test/x.jpg?1",
                "https://acme.test/x-640x480.jpg",
                "https://cdn.acme.test/y.webp",
                "",
                "https://acme.test/z-large.png",
                "https://acme.test/z.png?cache=1",
            ],
            vec![
                "https://ACME.test/Logo.svg",
                "https://acme.test/Logo.svg",
                "https://Acme.Test/Logo@2x.svg?v=3",
                "https://acme.test/logo.svg",
            ],
            vec![
                "data:image/svg+xml;base64,PHN2Zz4=",
                "https://acme.test/hero-300x200@2x.jpg",
                "data:image/svg+xml;base64,PHN2Zz4=",
                "https://acme.test/hero.jpg",
                "https://acme.test/hero-thumb.jpg?w=90",
            ],
            vec![
                "not a url",
                "https://acme.test/a.1a2b3c4d5e.png",
                "https://acme.test/a.png",
                "https://acme.test/a_small.png",
                "   ",
                "not a url",
            ],
            vec![],
        ];

        for case in cases {
            let once = dedupe_image_urls(&urls(&case), None);
            let twice = dedupe_image_urls(&once, None);
            assert_eq!(once, twice, "{:?}", case);
        }

        let mixed = dedupe_image_urls(
            &urls(&[
                "https://ACME.test/Logo.svg",
                "https://acme.test/Logo.svg",
                "https://Acme.Test/Logo@2x.svg?v=3",
                "https://acme.test/logo.svg",
            ]),
            None,
        );
        assert_eq!(
            mixed,
            vec!["https://ACME.test/Logo.svg", "https://acme.test/logo.svg"]
        );
    }

    #[test]
    fn test_max_count() {
        let input: Vec<String> = (0..10).map(|i| format!("https://acme.test/{}.jpg", i)).collect();
        let out = dedupe_image_urls(&input, Some(4));
        assert_eq!(out.len(), 4);
        assert_eq!(out[3], "https://acme.test/3.jpg");
    }
}
