use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Kind of page visited during a crawl, in aggregation priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Home,
    About,
    Services,
    Contact,
    Pricing,
}

impl PageType {
    /// Position in the fixed merge order (home first)
    pub fn priority(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Home => "home",
            PageType::About => "about",
            PageType::Services => "services",
            PageType::Contact => "contact",
            PageType::Pricing => "pricing",
        }
    }
}

/// A social profile link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

/// A `<link rel="icon">`-style descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favicon {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub rel: String,
}

/// Raw logo candidates found on a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoSystemRaw {
    pub logo_urls: Vec<String>,
    pub favicons: Vec<Favicon>,
}

/// Button and call-to-action strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopySamples {
    pub button_texts: Vec<String>,
    pub cta_texts: Vec<String>,
}

/// Structured extraction result from one page visit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    /// URL of the page as loaded
    pub url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub og_site_name: Option<String>,
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    /// Main body text, capped at `parsers::MAIN_TEXT_CAP` characters
    pub main_text: String,
    pub above_fold_text: String,
    pub logo_url: Option<String>,
    pub hero_image: Option<String>,
    pub social_links: Vec<SocialLink>,
    /// JSON-LD payloads, as parsed
    pub structured_data: Vec<serde_json::Value>,
    /// Legacy single color tokens (well-known custom properties, theme-color)
    pub colors: Vec<String>,
    pub footer_text: Option<String>,
    pub logo_system_raw: LogoSystemRaw,
    /// CSS custom properties with color-ish names and color values
    pub color_system_raw: IndexMap<String, String>,
    pub copy_samples: CopySamples,
    pub all_image_urls: Vec<String>,
    pub media_kit_links: Vec<String>,
    /// Computed colors sampled off header/nav/button/link elements
    pub element_colors: Vec<String>,
}

/// A snapshot tagged with the kind of page it came from
#[derive(Debug, Clone, PartialEq)]
pub struct CrawledPage {
    pub page_type: PageType,
    pub snapshot: PageSnapshot,
}

/// Merged record of every page visited in one crawl
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedScrape {
    pub url: String,
    pub domain: String,

    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub og_site_name: Option<String>,
    pub logo_url: Option<String>,
    pub hero_image: Option<String>,
    pub colors: Vec<String>,
    pub footer_text: Option<String>,

    pub all_h1: Vec<String>,
    pub all_h2: Vec<String>,
    pub all_main_text: String,
    pub social_links: Vec<SocialLink>,
    pub structured_data: Vec<serde_json::Value>,

    pub about_page_text: Option<String>,
    pub services_page_text: Option<String>,
    pub contact_page_text: Option<String>,
    pub pricing_page_text: Option<String>,

    pub logo_system_raw: LogoSystemRaw,
    pub color_system_raw: IndexMap<String, String>,
    pub copy_samples: CopySamples,
    pub all_image_urls: Vec<String>,
    pub media_kit_urls: Vec<String>,
    pub element_colors: Vec<String>,

    /// Pages that contributed, in merge order
    pub pages_visited: Vec<PageType>,
}

/// A catalog item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

/// The three brand color slots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopColors {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub accent: Option<String>,
}

/// What the business sells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellingType {
    Products,
    Saas,
    Services,
}

/// Externally consumed result of one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub business_name: String,
    pub tagline: Option<String>,
    pub logo_url: Option<String>,
    pub colors: TopColors,
    pub mission: Option<String>,
    pub products: Vec<Product>,
    pub all_images: Vec<String>,
    pub social_links: Vec<SocialLink>,
    pub selling_type: Option<SellingType>,
    pub website_url: String,
    pub domain: String,
}
