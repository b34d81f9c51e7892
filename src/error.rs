use thiserror::Error;

/// Outcome of a single failed navigation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// The page did not finish loading within the navigation timeout
    #[error("navigation timed out")]
    Timeout,

    /// Any other navigation failure (DNS, TLS, refused connection, lost session)
    #[error("navigation failed: {0}")]
    Failed(String),
}

/// Errors raised by a browser session outside of navigation.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to WebDriver: {0}")]
    Connect(String),

    #[error("in-page script failed: {0}")]
    Script(String),

    #[error("browser session is closed")]
    Closed,
}

impl From<fantoccini::error::CmdError> for SessionError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        if err.to_string().contains("Unable to find session") {
            SessionError::Closed
        } else {
            SessionError::Script(err.to_string())
        }
    }
}

/// Fatal crawl outcomes. Subpage failures never show up here.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("crawl was cancelled before the home page completed")]
    Cancelled,

    #[error("failed to launch browser session: {0}")]
    Launch(#[from] SessionError),

    #[error("home page {url} timed out and never produced a DOM")]
    HomeTimedOut { url: String },

    #[error("home page {url} is unreachable: {reason}")]
    HomeUnreachable { url: String, reason: String },
}

/// Errors surfaced by the scan pipeline to its caller.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The global deadline (or the home page navigation) ran out of time
    #[error("scan timed out")]
    TimedOut,

    #[error(transparent)]
    Crawl(CrawlError),

    #[error("internal scan failure: {0}")]
    Internal(String),
}

impl From<CrawlError> for ScanError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Cancelled | CrawlError::HomeTimedOut { .. } => ScanError::TimedOut,
            other => ScanError::Crawl(other),
        }
    }
}

impl ScanError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScanError::TimedOut)
    }

    /// Message suitable for an end user; never exposes site or network details.
    pub fn user_message(&self) -> &'static str {
        if self.is_timeout() {
            "Website took too long to load. Try again or use a different URL."
        } else {
            "Failed to scan website. The site may be blocking automated access or is unavailable."
        }
    }
}

/// Errors from the catalog (Shopify) prober.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),

    #[error("catalog endpoint returned status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Network(err.to_string())
    }
}

/// Errors from the brand summary generator.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for SummaryError {
    fn from(err: reqwest::Error) -> Self {
        SummaryError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_map_to_timed_out() {
        let err: ScanError = CrawlError::HomeTimedOut {
            url: "https://slow.example".to_string(),
        }
        .into();
        assert!(err.is_timeout());

        let err: ScanError = CrawlError::Cancelled.into();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_unreachable_is_not_a_timeout() {
        let err: ScanError = CrawlError::HomeUnreachable {
            url: "https://gone.example".to_string(),
            reason: "dns".to_string(),
        }
        .into();
        assert!(!err.is_timeout());
        assert_ne!(err.user_message(), ScanError::TimedOut.user_message());
    }
}
