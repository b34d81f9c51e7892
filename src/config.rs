use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for a brand scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// User agent presented by the headless browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Browser window size (width, height)
    #[serde(default = "default_viewport")]
    pub viewport: (u32, u32),

    /// Total pages visited per crawl, home page included
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Navigation timeout for the home page
    #[serde(default = "default_home_nav_timeout_ms")]
    pub home_nav_timeout_ms: u64,

    /// Secondary wait for `<body>` after a home page navigation timeout
    #[serde(default = "default_body_wait_timeout_ms")]
    pub body_wait_timeout_ms: u64,

    /// Navigation timeout for classified subpages
    #[serde(default = "default_subpage_nav_timeout_ms")]
    pub subpage_nav_timeout_ms: u64,

    /// Navigation timeout for a single product page scrape
    #[serde(default = "default_product_nav_timeout_ms")]
    pub product_nav_timeout_ms: u64,

    /// Hard cap on the lazy-load scroll loop
    #[serde(default = "default_lazy_load_cap_ms")]
    pub lazy_load_cap_ms: u64,

    /// Settle delay after scrolling, before extraction
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Settle delay after removing overlays
    #[serde(default = "default_overlay_settle_ms")]
    pub overlay_settle_ms: u64,

    /// Global wall-clock budget for a scan
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Safety timeout for the catalog probe
    #[serde(default = "default_catalog_timeout_ms")]
    pub catalog_timeout_ms: u64,

    /// Safety timeout for the brand summary call
    #[serde(default = "default_summary_timeout_ms")]
    pub summary_timeout_ms: u64,

    /// Maximum number of images in a scan result
    #[serde(default = "default_max_images")]
    pub max_images: usize,

    /// Chat model used for the brand summary
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
}

/// Timing and size limits handed to the crawl orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    pub max_pages: usize,
    pub home_nav_timeout: Duration,
    pub body_wait_timeout: Duration,
    pub subpage_nav_timeout: Duration,
    pub lazy_load_cap: Duration,
    pub settle_delay: Duration,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        ScanConfig::default().crawl_limits()
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_viewport() -> (u32, u32) {
    (1280, 720)
}

fn default_max_pages() -> usize {
    6
}

fn default_home_nav_timeout_ms() -> u64 {
    18_000
}

fn default_body_wait_timeout_ms() -> u64 {
    8_000
}

fn default_subpage_nav_timeout_ms() -> u64 {
    12_000
}

fn default_product_nav_timeout_ms() -> u64 {
    15_000
}

fn default_lazy_load_cap_ms() -> u64 {
    5_000
}

fn default_settle_delay_ms() -> u64 {
    1_200
}

fn default_overlay_settle_ms() -> u64 {
    300
}

fn default_deadline_ms() -> u64 {
    55_000
}

fn default_catalog_timeout_ms() -> u64 {
    15_000
}

fn default_summary_timeout_ms() -> u64 {
    12_000
}

fn default_max_images() -> usize {
    300
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            user_agent: default_user_agent(),
            viewport: default_viewport(),
            max_pages: default_max_pages(),
            home_nav_timeout_ms: default_home_nav_timeout_ms(),
            body_wait_timeout_ms: default_body_wait_timeout_ms(),
            subpage_nav_timeout_ms: default_subpage_nav_timeout_ms(),
            product_nav_timeout_ms: default_product_nav_timeout_ms(),
            lazy_load_cap_ms: default_lazy_load_cap_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            overlay_settle_ms: default_overlay_settle_ms(),
            deadline_ms: default_deadline_ms(),
            catalog_timeout_ms: default_catalog_timeout_ms(),
            summary_timeout_ms: default_summary_timeout_ms(),
            max_images: default_max_images(),
            openai_model: default_openai_model(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Override the WebDriver URL with `WEBDRIVER_URL` when it is set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    pub fn crawl_limits(&self) -> CrawlLimits {
        CrawlLimits {
            max_pages: self.max_pages.max(1),
            home_nav_timeout: Duration::from_millis(self.home_nav_timeout_ms),
            body_wait_timeout: Duration::from_millis(self.body_wait_timeout_ms),
            subpage_nav_timeout: Duration::from_millis(self.subpage_nav_timeout_ms),
            lazy_load_cap: Duration::from_millis(self.lazy_load_cap_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog_timeout_ms)
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_millis(self.summary_timeout_ms)
    }

    pub fn product_nav_timeout(&self) -> Duration {
        Duration::from_millis(self.product_nav_timeout_ms)
    }

    pub fn overlay_settle(&self) -> Duration {
        Duration::from_millis(self.overlay_settle_ms)
    }
}
