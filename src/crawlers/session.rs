use crate::error::{CrawlError, NavigationError, SessionError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Styles only the live page knows, read by the in-page probe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputedStyles {
    /// Custom properties from the computed style of `<html>`
    pub root_vars: Vec<(String, String)>,
    /// Custom properties declared in `:root` rules of same-origin stylesheets
    pub sheet_vars: Vec<(String, String)>,
    /// Background/foreground colors of header, nav, button and link elements
    pub element_colors: Vec<String>,
}

/// Serialized DOM of the current page plus its computed styles
///
/// Before serialization the probe annotates `<img>` elements with
/// `data-bs-w`/`data-bs-h` (natural size) and elements carrying a computed
/// background image with `data-bs-bg`, so the pure extractor can score
/// candidates without a live page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomSnapshot {
    pub url: String,
    pub html: String,
    pub styles: ComputedStyles,
}

impl DomSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            styles: ComputedStyles::default(),
        }
    }
}

/// A single browser page owned exclusively by one crawl
#[async_trait]
pub trait PageSession: Send {
    /// Navigate and wait for DOM content, bounded by `timeout`
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), NavigationError>;

    /// Wait for `<body>` to exist after a slow navigation
    async fn wait_for_body(&mut self, timeout: Duration) -> Result<(), NavigationError>;

    /// Click consent buttons and remove chat/cookie overlays
    async fn dismiss_overlays(&mut self) -> Result<(), SessionError>;

    /// Scroll through the page so deferred content materializes, at most `cap`
    async fn trigger_lazy_load(&mut self, cap: Duration) -> Result<(), SessionError>;

    /// Serialize the current DOM and computed styles
    async fn capture(&mut self) -> Result<DomSnapshot, SessionError>;

    /// Release the page and its browser; always called once per session
    async fn close(self: Box<Self>);
}

/// Opens fresh browser sessions, one per crawl
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PageSession>, CrawlError>;
}
