use brand_scan::ScanConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "brand-scan")]
#[command(about = "Scan a business website for its brand: logo, colors, copy, images and socials")]
#[command(version)]
pub struct Args {
    /// Website to scan (a bare domain such as `acme.com` is accepted)
    pub url: String,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL (overrides config and WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Total pages visited per crawl, home page included
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Global scan deadline in seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Include the profile and brand kit in the output
    #[arg(long, conflicts_with = "product")]
    pub extended: bool,

    /// Treat the URL as a single product page
    #[arg(long)]
    pub product: bool,
}

impl Args {
    /// Configuration from the file (or defaults), the environment, then flags
    pub fn scan_config(&self) -> Result<ScanConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::from_file(path)?,
            None => ScanConfig::default(),
        }
        .with_env_overrides();

        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(secs) = self.deadline_secs {
            config.deadline_ms = secs * 1000;
        }
        Ok(config)
    }
}
