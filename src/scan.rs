//! The scan pipeline: crawl and catalog probe fanned out under one deadline,
//! then the heuristics that freeze a [`ScanResult`].

use crate::brand::{
    BrandKit, ExtractedProfile, build_brand_kit, dedupe_image_urls, extract_profile,
    infer_selling_type, pick_logo, pick_top_colors,
};
use crate::catalog::{CatalogProbe, CatalogProber, ShopifyProber};
use crate::config::ScanConfig;
use crate::crawlers::{CrawlOrchestrator, SessionLauncher, WebDriverLauncher, extract};
use crate::deadline::Deadline;
use crate::error::{CrawlError, NavigationError, ScanError};
use crate::parsers::product::extract_product;
use crate::results::{AggregatedScrape, Product, ScanResult};
use crate::summary::{BrandSummarizer, OpenAiSummarizer};
use crate::utils::normalize_input_url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A scan result together with the intermediate records it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedScan {
    pub result: ScanResult,
    pub profile: ExtractedProfile,
    pub brand_kit: BrandKit,
}

/// Runs brand scans against live sites
pub struct Scanner {
    config: ScanConfig,
    launcher: Arc<dyn SessionLauncher>,
    prober: Arc<dyn CatalogProber>,
    summarizer: Arc<dyn BrandSummarizer>,
}

impl Scanner {
    /// Scanner backed by WebDriver, the Shopify catalog endpoint and OpenAI
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let prober = ShopifyProber::new().map_err(|e| ScanError::Internal(e.to_string()))?;
        let summarizer = OpenAiSummarizer::from_env(config.openai_model.clone())
            .map_err(|e| ScanError::Internal(e.to_string()))?;

        Ok(Self {
            launcher: Arc::new(WebDriverLauncher::new(&config)),
            prober: Arc::new(prober),
            summarizer: Arc::new(summarizer),
            config,
        })
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn SessionLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn with_prober(mut self, prober: Arc<dyn CatalogProber>) -> Self {
        self.prober = prober;
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn BrandSummarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan the site at `url` within the configured deadline
    pub async fn scan(&self, url: &str) -> Result<ScanResult, ScanError> {
        self.scan_extended(url).await.map(|scan| scan.result)
    }

    /// Scan and keep the profile and brand kit alongside the result
    pub async fn scan_extended(&self, url: &str) -> Result<ExtendedScan, ScanError> {
        let start = normalize_input_url(url).map_err(|e| {
            ScanError::from(CrawlError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            })
        })?;
        let domain = start.host_str().unwrap_or_default().to_string();

        let deadline = Deadline::start(self.config.deadline());
        ::log::info!("Scanning {} with a {:?} budget", start, self.config.deadline());

        let orchestrator = CrawlOrchestrator::new(self.launcher.clone(), self.config.crawl_limits());
        let token = deadline.token();
        let input = start.to_string();
        let crawl = tokio::spawn(async move { orchestrator.crawl(&input, &token).await });

        let prober = self.prober.clone();
        let probe = deadline.bounded(self.config.catalog_timeout(), async {
            prober.probe(&domain).await
        });

        let (crawled, probe) = deadline
            .race(async { tokio::join!(crawl, probe) })
            .await
            .map_err(|_| ScanError::TimedOut)?;

        let scrape = crawled.map_err(|e| ScanError::Internal(format!("crawl task failed: {}", e)))??;
        let probe = probe.unwrap_or_else(|| {
            ::log::warn!("Catalog probe of {} timed out", domain);
            CatalogProbe::default()
        });

        let profile = extract_profile(&scrape);
        let mission = deadline
            .bounded(
                self.config.summary_timeout(),
                self.summarizer.summarize(
                    &profile.business_name,
                    profile.tagline.as_deref(),
                    profile.homepage_text.as_deref().unwrap_or_default(),
                    profile.about_text.as_deref(),
                ),
            )
            .await
            .flatten();

        let result = self.freeze(&scrape, &profile, probe, mission);
        ::log::info!(
            "Scan of {} complete: {} images, {} products",
            start,
            result.all_images.len(),
            result.products.len()
        );

        Ok(ExtendedScan {
            result,
            brand_kit: build_brand_kit(&scrape),
            profile,
        })
    }

    fn freeze(
        &self,
        scrape: &AggregatedScrape,
        profile: &ExtractedProfile,
        probe: CatalogProbe,
        mission: Option<String>,
    ) -> ScanResult {
        let has_catalog_items = probe.is_catalog && !probe.items.is_empty();
        ScanResult {
            business_name: profile.business_name.clone(),
            tagline: profile.tagline.clone(),
            logo_url: pick_logo(scrape),
            colors: pick_top_colors(scrape),
            mission,
            selling_type: infer_selling_type(scrape, has_catalog_items),
            products: probe.items,
            all_images: dedupe_image_urls(&scrape.all_image_urls, Some(self.config.max_images)),
            social_links: scrape.social_links.clone(),
            website_url: scrape.url.clone(),
            domain: scrape.domain.clone(),
        }
    }

    /// Scrape one product page into a catalog item
    pub async fn scrape_product(&self, url: &str) -> Result<Product, ScanError> {
        let target = normalize_input_url(url).map_err(|e| {
            ScanError::from(CrawlError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            })
        })?;
        let deadline = Deadline::start(self.config.deadline());
        let mut session = self.launcher.launch().await.map_err(ScanError::from)?;

        let limits = self.config.crawl_limits();
        let nav_timeout = self.config.product_nav_timeout();
        let outcome = deadline
            .race(async {
                match session.navigate(target.as_str(), nav_timeout).await {
                    Ok(()) => {}
                    Err(NavigationError::Timeout) => return Err(ScanError::TimedOut),
                    Err(NavigationError::Failed(reason)) => {
                        return Err(ScanError::from(CrawlError::HomeUnreachable {
                            url: target.to_string(),
                            reason,
                        }));
                    }
                }
                tokio::time::sleep(limits.settle_delay).await;
                let page = extract(session.as_mut(), false, &limits)
                    .await
                    .map_err(|e| ScanError::Internal(e.to_string()))?;
                Ok(extract_product(&page.dom, target.as_str(), manual_product_id()))
            })
            .await;
        session.close().await;

        match outcome {
            Ok(product) => product,
            Err(_) => Err(ScanError::TimedOut),
        }
    }
}

fn manual_product_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("manual-{}", millis)
}
