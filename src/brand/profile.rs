use crate::results::{AggregatedScrape, SocialLink};
use crate::utils::{domain_label, truncate_chars};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// Cap on the homepage text carried in a profile
pub const HOMEPAGE_TEXT_CAP: usize = 5000;

const MAX_SERVICES: usize = 10;

/// Node types whose `name` is the business name inside a JSON-LD `@graph`
const BUSINESS_TYPES: &[&str] = &["Organization", "LocalBusiness", "Store", "Restaurant"];

/// JSON-LD types that describe the page, not the business
const NON_INDUSTRY_TYPES: &[&str] = &["WebSite", "WebPage", "BreadcrumbList", "SearchAction"];

static TITLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[|–—-]\s*").expect("title separator pattern is valid"));

/// Fields derivable from a scrape without any external call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProfile {
    pub business_name: String,
    pub tagline: Option<String>,
    pub industry: Option<String>,
    pub website_url: String,
    pub domain: String,
    pub logo_url: Option<String>,
    pub hero_image_url: Option<String>,
    pub brand_colors: Vec<String>,
    pub og_image: Option<String>,
    pub social_links: Vec<SocialLink>,
    pub services: Vec<String>,
    pub about_text: Option<String>,
    pub homepage_text: Option<String>,
}

pub fn extract_profile(scrape: &AggregatedScrape) -> ExtractedProfile {
    let business_name = structured_data_name(&scrape.structured_data)
        .or_else(|| non_empty(scrape.og_site_name.as_deref()))
        .or_else(|| name_from_title(scrape.title.as_deref()))
        .unwrap_or_else(|| domain_label(&scrape.domain));

    let tagline = scrape
        .all_h1
        .first()
        .and_then(|h| non_empty(Some(h.as_str())))
        .or_else(|| non_empty(scrape.og_description.as_deref()));

    let services = scrape
        .all_h2
        .iter()
        .filter(|h| (4..80).contains(&h.chars().count()))
        .take(MAX_SERVICES)
        .cloned()
        .collect();

    ExtractedProfile {
        business_name,
        tagline,
        industry: industry(&scrape.structured_data),
        website_url: scrape.url.clone(),
        domain: scrape.domain.clone(),
        logo_url: scrape.logo_url.clone(),
        hero_image_url: scrape.hero_image.clone(),
        brand_colors: scrape.colors.clone(),
        og_image: scrape.og_image.clone(),
        social_links: scrape.social_links.clone(),
        services,
        about_text: scrape.about_page_text.clone(),
        homepage_text: Some(truncate_chars(&scrape.all_main_text, HOMEPAGE_TEXT_CAP)),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// `@type` as a list, whether given as a string or an array
fn types_of(node: &Value) -> Vec<&str> {
    match node.get("@type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Top-level JSON-LD items, with script blocks holding an array flattened
fn json_ld_items(structured_data: &[Value]) -> Vec<&Value> {
    fn walk<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
        match value {
            Value::Array(items) => items.iter().for_each(|item| walk(item, out)),
            other => out.push(other),
        }
    }
    let mut out = Vec::new();
    structured_data.iter().for_each(|item| walk(item, &mut out));
    out
}

fn graph_nodes(item: &Value) -> &[Value] {
    item.get("@graph")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn structured_data_name(structured_data: &[Value]) -> Option<String> {
    for item in json_ld_items(structured_data) {
        if let Some(name) = non_empty(item.get("name").and_then(Value::as_str)) {
            return Some(name);
        }
        for node in graph_nodes(item) {
            let is_business = types_of(node).iter().any(|t| BUSINESS_TYPES.contains(t));
            if is_business {
                if let Some(name) = non_empty(node.get("name").and_then(Value::as_str)) {
                    return Some(name);
                }
            }
        }
    }
    None
}

/// Leading segment of a title like `Acme Studio | Design`, or the whole title
/// when that segment is implausibly short or long
fn name_from_title(title: Option<&str>) -> Option<String> {
    let title = title.map(str::trim).filter(|t| !t.is_empty())?;
    let first = TITLE_SEPARATOR.split(title).next().unwrap_or(title).trim();
    let len = first.chars().count();
    if len > 1 && len < 60 {
        Some(first.to_string())
    } else {
        Some(title.to_string())
    }
}

fn industry(structured_data: &[Value]) -> Option<String> {
    let pick = |node: &Value| {
        types_of(node)
            .into_iter()
            .find(|t| !NON_INDUSTRY_TYPES.contains(t))
            .map(str::to_string)
    };
    for item in json_ld_items(structured_data) {
        if let Some(found) = pick(item) {
            return Some(found);
        }
        if let Some(found) = graph_nodes(item).iter().find_map(pick) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scrape() -> AggregatedScrape {
        AggregatedScrape {
            url: "https://www.acme.test/".to_string(),
            domain: "www.acme.test".to_string(),
            ..AggregatedScrape::default()
        }
    }

    #[test]
    fn test_name_cascade() {
        let mut data = scrape();
        assert_eq!(extract_profile(&data).business_name, "acme");

        data.title = Some("Acme Studio | Brand Design".to_string());
        assert_eq!(extract_profile(&data).business_name, "Acme Studio");

        data.title = Some("Acme Studio – Brand Design".to_string());
        assert_eq!(extract_profile(&data).business_name, "Acme Studio");

        data.og_site_name = Some("Acme".to_string());
        assert_eq!(extract_profile(&data).business_name, "Acme");

        data.structured_data = vec![json!({
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "WebSite", "name": "Acme website"},
                {"@type": "LocalBusiness", "name": "Acme Studio LLC"}
            ]
        })];
        assert_eq!(extract_profile(&data).business_name, "Acme Studio LLC");

        data.structured_data.insert(0, json!({"@type": "Organization", "name": "Acme Inc"}));
        assert_eq!(extract_profile(&data).business_name, "Acme Inc");
    }

    #[test]
    fn test_top_level_json_ld_arrays() {
        let mut data = scrape();
        data.structured_data = vec![json!([
            {"@type": "WebSite", "url": "https://acme.test/"},
            {"@type": "Organization", "name": "Acme Array Co"}
        ])];

        let profile = extract_profile(&data);
        assert_eq!(profile.business_name, "Acme Array Co");
        assert_eq!(profile.industry.as_deref(), Some("Organization"));

        data.structured_data = vec![json!([[{"@graph": [{"@type": "Store", "name": "Nested Store"}]}]])];
        let profile = extract_profile(&data);
        assert_eq!(profile.business_name, "Nested Store");
        assert_eq!(profile.industry.as_deref(), Some("Store"));
    }

    #[test]
    fn test_title_with_short_leading_segment_is_kept_whole() {
        assert_eq!(name_from_title(Some("A - Studio")).as_deref(), Some("A - Studio"));
        assert_eq!(name_from_title(Some("   ")), None);
    }

    #[test]
    fn test_tagline_and_industry() {
        let mut data = scrape();
        data.og_description = Some("Design for small businesses".to_string());
        data.structured_data = vec![
            json!({"@type": "WebSite", "potentialAction": {"@type": "SearchAction"}}),
            json!({"@graph": [{"@type": "BreadcrumbList"}, {"@type": ["WebPage", "Bakery"]}]}),
        ];

        let profile = extract_profile(&data);
        assert_eq!(profile.tagline.as_deref(), Some("Design for small businesses"));
        assert_eq!(profile.industry.as_deref(), Some("Bakery"));

        data.all_h1 = vec!["We design brands".to_string()];
        assert_eq!(extract_profile(&data).tagline.as_deref(), Some("We design brands"));
    }

    #[test]
    fn test_services_and_text_caps() {
        let mut data = scrape();
        data.all_h2 = vec!["FAQ".to_string(), "Brand identity".to_string(), "x".repeat(80)];
        data.all_h2.extend((0..12).map(|i| format!("Service {}", i)));
        data.all_main_text = "a".repeat(6000);
        data.about_page_text = Some("About us".to_string());

        let profile = extract_profile(&data);
        assert_eq!(profile.services.len(), 10);
        assert_eq!(profile.services[0], "Brand identity");
        assert_eq!(profile.services[1], "Service 0");
        assert_eq!(profile.homepage_text.map(|t| t.len()), Some(HOMEPAGE_TEXT_CAP));
        assert_eq!(profile.about_text.as_deref(), Some("About us"));
    }
}
