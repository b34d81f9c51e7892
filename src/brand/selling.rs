use crate::results::{AggregatedScrape, SellingType};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static SAAS_VOCABULARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bfree trial\b|\bper month\b|/mo\b|\bper user\b|\bsign up\b|\bsaas\b|\bdashboard\b|\bintegrations?\b|\bsubscription\b",
    )
    .expect("saas vocabulary pattern is valid")
});

/// JSON-LD types of businesses selling services rather than goods
const SERVICE_TYPES: &[&str] = &[
    "Service",
    "ProfessionalService",
    "LocalBusiness",
    "HomeAndConstructionBusiness",
    "LegalService",
    "FinancialService",
    "HealthAndBeautyBusiness",
    "MedicalBusiness",
    "EmploymentAgency",
    "TravelAgency",
];

/// Classify what the business sells.
///
/// A product catalog wins outright, then subscription signals, then service
/// signals. `None` when nothing points anywhere.
pub fn infer_selling_type(scrape: &AggregatedScrape, has_catalog_items: bool) -> Option<SellingType> {
    if has_catalog_items {
        return Some(SellingType::Products);
    }

    let saas_text = [
        scrape.pricing_page_text.as_deref(),
        Some(scrape.all_main_text.as_str()),
        scrape.meta_description.as_deref(),
    ];
    if scrape.pricing_page_text.is_some()
        || saas_text.into_iter().flatten().any(|t| SAAS_VOCABULARY.is_match(t))
    {
        return Some(SellingType::Saas);
    }

    if scrape.services_page_text.is_some() || scrape.structured_data.iter().any(has_service_type) {
        return Some(SellingType::Services);
    }

    None
}

fn has_service_type(item: &Value) -> bool {
    if let Value::Array(items) = item {
        return items.iter().any(has_service_type);
    }
    let typed = |node: &Value| match node.get("@type") {
        Some(Value::String(t)) => SERVICE_TYPES.contains(&t.as_str()),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|t| SERVICE_TYPES.contains(&t)),
        _ => false,
    };
    typed(item)
        || item
            .get("@graph")
            .and_then(Value::as_array)
            .is_some_and(|nodes| nodes.iter().any(typed))
}
