use crate::crawlers::session::DomSnapshot;
use crate::parsers::{PageDocument, html};
use crate::results::Product;
use crate::utils::collapse_whitespace;
use serde_json::Value;
use url::Url;

/// Images kept for a single product
pub const PRODUCT_IMAGE_CAP: usize = 20;

const PRODUCT_IMAGES: &str =
    "[class*=\"product\"] img, [data-product] img, .product-single__photo img, main img";

/// Fields of a schema.org `Product` block
#[derive(Debug, Default, PartialEq)]
struct StructuredProduct {
    name: Option<String>,
    description: Option<String>,
    images: Vec<String>,
    price: Option<String>,
}

/// Product details from a captured product page; `url` is the address the
/// caller asked for and `id` the identifier to assign
pub fn extract_product(dom: &DomSnapshot, url: &str, id: String) -> Product {
    let Ok(base) = Url::parse(&dom.url) else {
        return Product {
            id,
            url: url.to_string(),
            ..Product::default()
        };
    };
    let page = PageDocument::parse(&dom.html, base);
    let structured = html::structured_data(&page)
        .iter()
        .find_map(structured_product)
        .unwrap_or_default();

    let title = structured
        .name
        .clone()
        .or_else(|| page.meta("meta[property=\"og:title\"]"))
        .or_else(|| page.first("h1").map(|h| collapse_whitespace(&h.text().collect::<String>())))
        .filter(|t| !t.is_empty())
        .or_else(|| html::title(&page))
        .unwrap_or_default();

    let description = structured
        .description
        .clone()
        .or_else(|| page.meta("meta[property=\"og:description\"]"))
        .or_else(|| page.meta("meta[name=\"description\"]"))
        .unwrap_or_default();

    let mut images: Vec<String> = Vec::new();
    let mut push = |reference: &str| {
        if images.len() >= PRODUCT_IMAGE_CAP {
            return;
        }
        if let Some(resolved) = page.resolve(reference) {
            if !images.contains(&resolved) {
                images.push(resolved);
            }
        }
    };
    structured.images.iter().for_each(|i| push(i));
    if let Some(og) = page.meta("meta[property=\"og:image\"]") {
        push(&og);
    }
    for img in page.select(PRODUCT_IMAGES) {
        let el = img.value();
        if let Some(src) = el.attr("data-bs-current").or_else(|| el.attr("src")) {
            push(src);
        }
    }

    let price = structured.price.clone().or_else(|| page_price(&page));

    Product {
        id,
        title,
        description,
        images,
        url: url.to_string(),
        price,
        vendor: None,
    }
}

fn page_price(page: &PageDocument) -> Option<String> {
    page.first("[class*=\"price\"]")
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|p| !p.is_empty())
        .or_else(|| page.meta("meta[property=\"product:price:amount\"]"))
}

fn structured_product(value: &Value) -> Option<StructuredProduct> {
    if let Value::Array(items) = value {
        return items.iter().find_map(structured_product);
    }
    if let Some(graph) = value.get("@graph") {
        if let Some(found) = structured_product(graph) {
            return Some(found);
        }
    }
    if value.get("@type").and_then(Value::as_str) != Some("Product") {
        return None;
    }

    let text = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let images = match value.get("image") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(|i| match i {
                Value::String(s) => Some(s.clone()),
                other => other.get("url").and_then(Value::as_str).map(str::to_string),
            })
            .collect(),
        Some(obj @ Value::Object(_)) => obj
            .get("url")
            .and_then(Value::as_str)
            .map(|s| vec![s.to_string()])
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let offer = match value.get("offers") {
        Some(Value::Array(offers)) => offers.first(),
        other => other,
    };
    let price = offer.and_then(|o| o.get("price")).and_then(|p| match p {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    Some(StructuredProduct {
        name: text("name"),
        description: text("description"),
        images,
        price,
    })
}
