use crate::results::AggregatedScrape;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const LIGHT_VARIANT_CAP: usize = 5;
const HORIZONTAL_CAP: usize = 3;

static ICON_MARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)icon|mark|symbol").expect("icon mark pattern is valid"));

static WORDMARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)wordmark|word-mark|text").expect("wordmark pattern is valid"));

static APP_ICON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"apple|touch|192|512").expect("app icon pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaviconRef {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Logo variants found across the crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoSystem {
    pub primary_logo: Option<String>,
    pub secondary_logo: Option<String>,
    pub icon_mark: Option<String>,
    pub wordmark: Option<String>,
    pub light_variants: Vec<String>,
    pub horizontal_logos: Vec<String>,
    pub favicons: Vec<FaviconRef>,
    pub app_icons: Vec<String>,
    pub touch_icons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusColors {
    pub success: Vec<String>,
    pub warning: Vec<String>,
    pub error: Vec<String>,
    pub info: Vec<String>,
}

/// Custom property values grouped by the role their names suggest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSystem {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    pub accent: Vec<String>,
    pub neutrals: Vec<String>,
    pub background: Vec<String>,
    pub surface: Vec<String>,
    pub border: Vec<String>,
    pub status: StatusColors,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandAssets {
    pub css_variables: IndexMap<String, String>,
    pub svg_logos: Vec<String>,
    pub og_images: Vec<String>,
    pub media_kit_urls: Vec<String>,
    pub all_images: Vec<String>,
}

/// Extended brand sections built from the raw bundles of a scrape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandKit {
    pub logo_system: LogoSystem,
    pub color_system: ColorSystem,
    pub assets: BrandAssets,
}

pub fn build_brand_kit(scrape: &AggregatedScrape) -> BrandKit {
    BrandKit {
        logo_system: logo_system(scrape),
        color_system: color_system(scrape),
        assets: assets(scrape),
    }
}

fn logo_system(scrape: &AggregatedScrape) -> LogoSystem {
    let urls = &scrape.logo_system_raw.logo_urls;
    let favicons = &scrape.logo_system_raw.favicons;

    LogoSystem {
        primary_logo: scrape.logo_url.clone().or_else(|| urls.first().cloned()),
        secondary_logo: urls.get(1).cloned(),
        icon_mark: urls
            .iter()
            .find(|u| ICON_MARK.is_match(u))
            .or_else(|| urls.get(2))
            .cloned(),
        wordmark: urls
            .iter()
            .find(|u| WORDMARK.is_match(u))
            .or_else(|| urls.first())
            .cloned(),
        light_variants: urls.iter().skip(3).take(LIGHT_VARIANT_CAP).cloned().collect(),
        horizontal_logos: urls.iter().take(HORIZONTAL_CAP).cloned().collect(),
        favicons: favicons
            .iter()
            .map(|f| FaviconRef {
                url: f.href.clone(),
                sizes: f.sizes.clone(),
                mime_type: f.mime_type.clone(),
            })
            .collect(),
        app_icons: favicons
            .iter()
            .filter(|f| APP_ICON.is_match(&f.href))
            .map(|f| f.href.clone())
            .collect(),
        touch_icons: favicons
            .iter()
            .filter(|f| f.rel.contains("touch") || f.rel.contains("apple"))
            .map(|f| f.href.clone())
            .collect(),
    }
}

fn color_system(scrape: &AggregatedScrape) -> ColorSystem {
    let vars = &scrape.color_system_raw;
    let by_role = |role: &str| -> Vec<String> {
        vars.iter()
            .filter(|(name, _)| name.to_ascii_lowercase().contains(role))
            .map(|(_, value)| value.clone())
            .collect()
    };
    let primary = match by_role("primary") {
        found if found.is_empty() => scrape.colors.iter().take(2).cloned().collect(),
        found => found,
    };
    let background = match by_role("background") {
        found if found.is_empty() => by_role("bg"),
        found => found,
    };

    ColorSystem {
        primary,
        secondary: by_role("secondary"),
        accent: by_role("accent"),
        neutrals: by_role("neutral"),
        background,
        surface: by_role("surface"),
        border: by_role("border"),
        status: StatusColors {
            success: by_role("success"),
            warning: by_role("warning"),
            error: by_role("error"),
            info: by_role("info"),
        },
    }
}

fn assets(scrape: &AggregatedScrape) -> BrandAssets {
    BrandAssets {
        css_variables: scrape.color_system_raw.clone(),
        svg_logos: scrape
            .logo_system_raw
            .logo_urls
            .iter()
            .filter(|u| u.to_ascii_lowercase().contains("svg"))
            .cloned()
            .collect(),
        og_images: scrape.og_image.iter().cloned().collect(),
        media_kit_urls: scrape.media_kit_urls.clone(),
        all_images: scrape.all_image_urls.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::Favicon;

    fn scrape() -> AggregatedScrape {
        let mut scrape = AggregatedScrape {
            og_image: Some("https://acme.test/og.jpg".to_string()),
            colors: vec!["#112233".to_string(), "#ff6600".to_string(), "#00aa55".to_string()],
            media_kit_urls: vec!["https://acme.test/press-kit.zip".to_string()],
            ..AggregatedScrape::default()
        };
        scrape.logo_system_raw.logo_urls = vec![
            "https://acme.test/logo.svg".to_string(),
            "https://acme.test/logo-white.png".to_string(),
            "https://acme.test/logo-dark.png".to_string(),
            "https://acme.test/logo-symbol.png".to_string(),
            "https://acme.test/logo-alt.png".to_string(),
        ];
        scrape.logo_system_raw.favicons = vec![
            Favicon {
                href: "https://acme.test/favicon.ico".to_string(),
                sizes: None,
                mime_type: Some("image/x-icon".to_string()),
                rel: "icon".to_string(),
            },
            Favicon {
                href: "https://acme.test/touch-180.png".to_string(),
                sizes: Some("180x180".to_string()),
                mime_type: None,
                rel: "apple-touch-icon".to_string(),
            },
        ];
        for (name, value) in [
            ("--color-primary", "#112233"),
            ("--color-primary-light", "#334455"),
            ("--bg-page", "#fafafa"),
            ("--color-error", "#d32f2f"),
            ("--border-subtle", "#e0e0e0"),
        ] {
            scrape.color_system_raw.insert(name.to_string(), value.to_string());
        }
        scrape
    }

    #[test]
    fn test_logo_system() {
        let kit = build_brand_kit(&scrape());
        let logos = kit.logo_system;
        assert_eq!(logos.primary_logo.as_deref(), Some("https://acme.test/logo.svg"));
        assert_eq!(logos.secondary_logo.as_deref(), Some("https://acme.test/logo-white.png"));
        assert_eq!(logos.icon_mark.as_deref(), Some("https://acme.test/logo-symbol.png"));
        assert_eq!(logos.wordmark.as_deref(), Some("https://acme.test/logo.svg"));
        assert_eq!(logos.light_variants, vec!["https://acme.test/logo-symbol.png", "https://acme.test/logo-alt.png"]);
        assert_eq!(logos.horizontal_logos.len(), 3);
        assert_eq!(logos.favicons.len(), 2);
        assert_eq!(logos.app_icons, vec!["https://acme.test/touch-180.png"]);
        assert_eq!(logos.touch_icons, vec!["https://acme.test/touch-180.png"]);
    }

    #[test]
    fn test_color_roles() {
        let colors = build_brand_kit(&scrape()).color_system;
        assert_eq!(colors.primary, vec!["#112233", "#334455"]);
        assert_eq!(colors.background, vec!["#fafafa"]);
        assert_eq!(colors.border, vec!["#e0e0e0"]);
        assert_eq!(colors.status.error, vec!["#d32f2f"]);
        assert!(colors.secondary.is_empty());
    }

    #[test]
    fn test_primary_falls_back_to_legacy_colors() {
        let mut data = scrape();
        data.color_system_raw.clear();
        let colors = build_brand_kit(&data).color_system;
        assert_eq!(colors.primary, vec!["#112233", "#ff6600"]);
    }

    #[test]
    fn test_assets() {
        let assets = build_brand_kit(&scrape()).assets;
        assert_eq!(assets.svg_logos, vec!["https://acme.test/logo.svg"]);
        assert_eq!(assets.og_images, vec!["https://acme.test/og.jpg"]);
        assert_eq!(assets.media_kit_urls.len(), 1);
        assert_eq!(assets.css_variables.len(), 5);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(build_brand_kit(&scrape())).unwrap();
        assert!(json["logoSystem"]["primaryLogo"].is_string());
        assert!(json["assets"]["cssVariables"].is_object());
    }
}
