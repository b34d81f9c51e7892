use crate::config::ScanConfig;
use crate::crawlers::scripts;
use crate::crawlers::session::{ComputedStyles, DomSnapshot, PageSession, SessionLauncher};
use crate::error::{CrawlError, NavigationError, SessionError};
use async_trait::async_trait;
use fantoccini::wd::{TimeoutConfiguration, WebDriverCompatibleCommand};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;
use url::Url;

/// Extra slack on top of the driver-side page load timeout before the
/// client gives up on its own
const NAVIGATION_GRACE: Duration = Duration::from_secs(2);

/// Script timeout; must exceed the lazy-load cap
const SCRIPT_TIMEOUT: Duration = Duration::from_secs(20);

/// A Chrome DevTools Protocol call passed through chromedriver
#[derive(Debug)]
struct ExecuteCdp {
    method: &'static str,
    params: Value,
}

impl ExecuteCdp {
    /// Runs `source` in every new document before the page's own scripts
    fn add_script_on_new_document(source: &str) -> Self {
        Self {
            method: "Page.addScriptToEvaluateOnNewDocument",
            params: json!({ "source": source }),
        }
    }
}

impl WebDriverCompatibleCommand for ExecuteCdp {
    fn endpoint(&self, base_url: &Url, session_id: Option<&str>) -> Result<Url, url::ParseError> {
        base_url.join(&format!(
            "session/{}/goog/cdp/execute",
            session_id.unwrap_or_default()
        ))
    }

    fn method_and_body(&self, _request_url: &Url) -> (http::Method, Option<String>) {
        let body = json!({ "cmd": self.method, "params": self.params });
        (http::Method::POST, Some(body.to_string()))
    }
}

/// Launches headless Chrome sessions through a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    webdriver_url: String,
    user_agent: String,
    viewport: (u32, u32),
    overlay_settle: Duration,
}

impl WebDriverLauncher {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            user_agent: config.user_agent.clone(),
            viewport: config.viewport,
            overlay_settle: config.overlay_settle(),
        }
    }

    /// Chrome capabilities with the automation fingerprints switched off
    fn capabilities(&self) -> Map<String, Value> {
        let (width, height) = self.viewport;
        let caps = json!({
            "browserName": "chrome",
            "pageLoadStrategy": "eager",
            "goog:chromeOptions": {
                "args": [
                    "--headless=new",
                    "--no-sandbox",
                    "--disable-setuid-sandbox",
                    "--disable-dev-shm-usage",
                    "--disable-blink-features=AutomationControlled",
                    "--lang=en-US",
                    format!("--user-agent={}", self.user_agent),
                    format!("--window-size={},{}", width, height),
                ],
                "excludeSwitches": ["enable-automation"],
                "useAutomationExtension": false,
                "prefs": { "intl.accept_languages": "en-US,en" }
            }
        });
        match caps {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    async fn connect(&self, url: &str) -> Result<Client, fantoccini::error::NewSessionError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        builder.connect(url).await
    }

    /// Connects to the configured WebDriver, then to common local defaults
    async fn connect_to_webdriver(&self) -> Result<Client, SessionError> {
        match self.connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        let fallback_urls = [
            "http://localhost:9515", // ChromeDriver default
            "http://127.0.0.1:4444",
        ];

        for url in fallback_urls.iter() {
            if *url == self.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = self.connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(SessionError::Connect(self.webdriver_url.clone()))
    }
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn PageSession>, CrawlError> {
        let client = self.connect_to_webdriver().await?;

        let timeouts = TimeoutConfiguration::new(Some(SCRIPT_TIMEOUT), None, None);
        if let Err(e) = client.update_timeouts(timeouts).await {
            ::log::warn!("Could not set script timeout: {}", e);
        }

        let stealth_registered = match client
            .issue_cmd(ExecuteCdp::add_script_on_new_document(scripts::STEALTH_SCRIPT))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                ::log::warn!("Stealth patch not registered, patching after each navigation: {}", e);
                false
            }
        };

        ::log::info!("Browser session launched");
        Ok(Box::new(WebDriverSession {
            client,
            overlay_settle: self.overlay_settle,
            stealth_registered,
        }))
    }
}

/// One WebDriver session driving a single tab
pub struct WebDriverSession {
    client: Client,
    overlay_settle: Duration,
    /// The stealth patch runs before page scripts in every document
    stealth_registered: bool,
}

impl WebDriverSession {
    /// Patch the loaded page when the driver couldn't register the script
    async fn apply_stealth(&self) {
        if self.stealth_registered {
            return;
        }
        if let Err(e) = self.client.execute(scripts::STEALTH_SCRIPT, Vec::new()).await {
            ::log::debug!("Stealth patch not applied: {}", e);
        }
    }
}

#[async_trait]
impl PageSession for WebDriverSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), NavigationError> {
        let started = std::time::Instant::now();

        let timeouts = TimeoutConfiguration::new(Some(SCRIPT_TIMEOUT), Some(timeout), None);
        if let Err(e) = self.client.update_timeouts(timeouts).await {
            ::log::debug!("Could not set page load timeout: {}", e);
        }

        let result = tokio::time::timeout(timeout + NAVIGATION_GRACE, self.client.goto(url)).await;

        match result {
            Ok(Ok(())) => {
                ::log::debug!(
                    "Loaded {} in {:.2} seconds",
                    url,
                    started.elapsed().as_secs_f64()
                );
                self.apply_stealth().await;
                Ok(())
            }
            Ok(Err(e)) => Err(handle_navigation_error(e, url)),
            Err(_) => {
                ::log::warn!("Client-side timeout navigating to {}", url);
                Err(NavigationError::Timeout)
            }
        }
    }

    async fn wait_for_body(&mut self, timeout: Duration) -> Result<(), NavigationError> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css("body"))
            .await
        {
            Ok(_) => {
                self.apply_stealth().await;
                Ok(())
            }
            Err(e) => Err(handle_navigation_error(e, "<body>")),
        }
    }

    async fn dismiss_overlays(&mut self) -> Result<(), SessionError> {
        let outcome = self
            .client
            .execute(&scripts::dismiss_overlays_script(), Vec::new())
            .await?;
        ::log::debug!("Overlay dismissal: {}", outcome);
        tokio::time::sleep(self.overlay_settle).await;
        Ok(())
    }

    async fn trigger_lazy_load(&mut self, cap: Duration) -> Result<(), SessionError> {
        let cap_ms = cap.as_millis() as u64;
        let scrolled = self
            .client
            .execute_async(scripts::LAZY_LOAD_SCRIPT, vec![json!(cap_ms)])
            .await?;
        ::log::debug!("Lazy-load scroll covered {} px", scrolled);
        Ok(())
    }

    async fn capture(&mut self) -> Result<DomSnapshot, SessionError> {
        let probe = self.client.execute(scripts::PROBE_SCRIPT, Vec::new()).await;
        let styles = match probe {
            Ok(value) => serde_json::from_value::<ComputedStyles>(value).unwrap_or_else(|e| {
                ::log::warn!("Unexpected style probe payload: {}", e);
                ComputedStyles::default()
            }),
            Err(e) => {
                ::log::warn!("Style probe failed: {}", e);
                ComputedStyles::default()
            }
        };

        let html = self.client.source().await?;
        let url = self.client.current_url().await?.to_string();

        Ok(DomSnapshot { url, html, styles })
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.client.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        } else {
            ::log::info!("Browser session closed");
        }
    }
}

/// Maps a WebDriver command error onto the navigation taxonomy
fn handle_navigation_error(error: fantoccini::error::CmdError, url: &str) -> NavigationError {
    let message = error.to_string();
    if is_timeout_message(&message) {
        ::log::warn!("Timed out loading {}", url);
        NavigationError::Timeout
    } else {
        if message.contains("Unable to find session") {
            ::log::warn!("Lost session while loading {}", url);
        } else {
            ::log::error!("Failed to load {}: {}", url, message);
        }
        NavigationError::Failed(message)
    }
}

fn is_timeout_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("timeout") || lower.contains("timed out")
}
