//! Product catalog probing over plain HTTP, independent of the browser.

use crate::error::CatalogError;
use crate::results::Product;
use crate::utils::collapse_whitespace;
use async_trait::async_trait;
use scraper::Html;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Products requested per catalog page
pub const CATALOG_PAGE_SIZE: usize = 250;

/// Catalog pages fetched at most
pub const CATALOG_MAX_PAGES: usize = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// What a catalog probe found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogProbe {
    /// The site answered with a product list
    pub is_catalog: bool,
    pub items: Vec<Product>,
}

#[async_trait]
pub trait CatalogProber: Send + Sync {
    /// Never fails; an unreachable catalog is reported as "not a catalog"
    async fn probe(&self, domain: &str) -> CatalogProbe;
}

#[derive(Debug, Deserialize)]
struct ShopifyProductsResponse {
    #[serde(default)]
    products: Vec<ShopifyProduct>,
}

#[derive(Debug, Deserialize)]
struct ShopifyProduct {
    id: Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body_html: Option<String>,
    #[serde(default)]
    handle: String,
    #[serde(default)]
    vendor: Option<String>,
    #[serde(default)]
    images: Vec<ShopifyImage>,
    #[serde(default)]
    variants: Vec<ShopifyVariant>,
}

#[derive(Debug, Deserialize)]
struct ShopifyImage {
    src: String,
}

#[derive(Debug, Deserialize)]
struct ShopifyVariant {
    #[serde(default)]
    price: Option<Value>,
}

/// Reads a Shopify store's public `/products.json`
pub struct ShopifyProber {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl ShopifyProber {
    pub fn new() -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: None,
        })
    }

    /// Send every request to `base_url` instead of `https://{domain}`
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn store_url(&self, domain: &str) -> String {
        match &self.base_url {
            Some(base) => base.clone(),
            None => format!("https://{}", domain),
        }
    }

    /// One page of the catalog; `Ok(None)` when the store refuses the page
    async fn fetch_page(
        &self,
        store: &str,
        page: usize,
    ) -> Result<Option<Vec<ShopifyProduct>>, CatalogError> {
        let response = self
            .client
            .get(format!("{}/products.json", store))
            .query(&[
                ("limit", CATALOG_PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            ::log::debug!("Catalog page {} of {} returned {}", page, store, response.status());
            return match page {
                1 => Err(CatalogError::Status(response.status().as_u16())),
                _ => Ok(None),
            };
        }

        let body: ShopifyProductsResponse = response.json().await?;
        Ok(Some(body.products))
    }

    /// All catalog products, up to [`CATALOG_MAX_PAGES`] pages
    pub async fn fetch_products(&self, domain: &str) -> Result<Vec<Product>, CatalogError> {
        let store = self.store_url(domain);
        let mut items = Vec::new();

        for page in 1..=CATALOG_MAX_PAGES {
            let products = match self.fetch_page(&store, page).await {
                Ok(Some(products)) => products,
                Ok(None) => break,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    ::log::warn!("Stopping catalog fetch of {} at page {}: {}", store, page, e);
                    break;
                }
            };

            let count = products.len();
            items.extend(products.into_iter().map(|p| to_product(&store, p)));
            if count < CATALOG_PAGE_SIZE {
                break;
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl CatalogProber for ShopifyProber {
    async fn probe(&self, domain: &str) -> CatalogProbe {
        match self.fetch_products(domain).await {
            Ok(items) => {
                ::log::info!("Catalog probe of {} found {} products", domain, items.len());
                CatalogProbe {
                    is_catalog: true,
                    items,
                }
            }
            Err(e) => {
                ::log::debug!("{} has no readable catalog: {}", domain, e);
                CatalogProbe::default()
            }
        }
    }
}

/// Prober for callers that skip catalog detection
pub struct NoopProber;

#[async_trait]
impl CatalogProber for NoopProber {
    async fn probe(&self, _domain: &str) -> CatalogProbe {
        CatalogProbe::default()
    }
}

fn to_product(store: &str, product: ShopifyProduct) -> Product {
    let id = match product.id {
        Value::String(s) => s,
        other => other.to_string(),
    };
    let price = product
        .variants
        .into_iter()
        .next()
        .and_then(|v| v.price)
        .and_then(|price| match price {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    Product {
        id,
        title: product.title,
        description: strip_html(product.body_html.as_deref().unwrap_or_default()),
        images: product.images.into_iter().map(|i| i.src).collect(),
        url: format!("{}/products/{}", store, product.handle),
        price,
        vendor: product.vendor.filter(|v| !v.is_empty()),
    }
}

/// Plain text of an HTML fragment, entities decoded and whitespace collapsed
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn shopify_product(id: u64) -> Value {
        json!({
            "id": id,
            "title": format!("Mug {}", id),
            "body_html": "<p>Hand-thrown <strong>stoneware</strong>&nbsp;mug &amp; saucer</p>",
            "handle": format!("mug-{}", id),
            "vendor": "Acme Ceramics",
            "images": [{"src": format!("https://cdn.acme.test/mug-{}.jpg", id)}],
            "variants": [{"price": "24.00"}, {"price": "30.00"}]
        })
    }

    async fn mount_page(server: &MockServer, page: &str, products: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("limit", "250"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": products })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Hand-thrown <strong>stoneware</strong>&nbsp;mug &amp; saucer</p>"),
            "Hand-thrown stoneware mug & saucer"
        );
        assert_eq!(strip_html(""), "");
    }

    #[tokio::test]
    async fn test_single_short_page() {
        let server = MockServer::start().await;
        mount_page(&server, "1", vec![shopify_product(1), shopify_product(2)]).await;

        let prober = ShopifyProber::new().unwrap().with_base_url(server.uri());
        let probe = prober.probe("acme.test").await;

        assert!(probe.is_catalog);
        assert_eq!(probe.items.len(), 2);
        let first = &probe.items[0];
        assert_eq!(first.id, "1");
        assert_eq!(first.title, "Mug 1");
        assert_eq!(first.description, "Hand-thrown stoneware mug & saucer");
        assert_eq!(first.price.as_deref(), Some("24.00"));
        assert_eq!(first.vendor.as_deref(), Some("Acme Ceramics"));
        assert_eq!(first.url, format!("{}/products/mug-1", server.uri()));
        assert_eq!(first.images, vec!["https://cdn.acme.test/mug-1.jpg"]);
    }

    #[tokio::test]
    async fn test_paginates_full_pages_up_to_the_cap() {
        let server = MockServer::start().await;
        for page in ["1", "2", "3"] {
            mount_page(&server, page, (0..250).map(shopify_product).collect()).await;
        }
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("page", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [shopify_product(999)] })))
            .expect(0)
            .mount(&server)
            .await;

        let prober = ShopifyProber::new().unwrap().with_base_url(server.uri());
        let items = prober.fetch_products("acme.test").await.unwrap();
        assert_eq!(items.len(), 750);
    }

    #[tokio::test]
    async fn test_empty_catalog_is_still_a_catalog() {
        let server = MockServer::start().await;
        mount_page(&server, "1", Vec::new()).await;

        let prober = ShopifyProber::new().unwrap().with_base_url(server.uri());
        let probe = prober.probe("acme.test").await;
        assert!(probe.is_catalog);
        assert!(probe.items.is_empty());
    }

    #[tokio::test]
    async fn test_non_shopify_site_is_not_a_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let prober = ShopifyProber::new().unwrap().with_base_url(server.uri());
        assert_eq!(prober.probe("acme.test").await, CatalogProbe::default());
    }

    #[tokio::test]
    async fn test_invalid_json_is_not_a_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>store</html>"))
            .mount(&server)
            .await;

        let prober = ShopifyProber::new().unwrap().with_base_url(server.uri());
        assert!(!prober.probe("acme.test").await.is_catalog);
    }
}
