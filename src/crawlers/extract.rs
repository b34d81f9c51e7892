use crate::config::CrawlLimits;
use crate::crawlers::session::{DomSnapshot, PageSession};
use crate::error::SessionError;
use crate::parsers::extract_snapshot;
use crate::results::PageSnapshot;

/// A captured page: the DOM it was extracted from plus the extraction
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub dom: DomSnapshot,
    pub snapshot: PageSnapshot,
}

/// Prepare the current page and extract a snapshot from it.
///
/// Overlays are always dismissed first. A `full` extraction (the home page)
/// also scrolls through the page, capped at `limits.lazy_load_cap`, and waits
/// `limits.settle_delay` for deferred images to start loading. Only a failed
/// capture is an error; overlay and scroll failures degrade silently.
pub async fn extract(
    session: &mut dyn PageSession,
    full: bool,
    limits: &CrawlLimits,
) -> Result<ExtractedPage, SessionError> {
    if let Err(e) = session.dismiss_overlays().await {
        ::log::debug!("Overlay dismissal failed: {}", e);
    }

    if full {
        if let Err(e) = session.trigger_lazy_load(limits.lazy_load_cap).await {
            ::log::debug!("Lazy-load scroll failed: {}", e);
        }
        tokio::time::sleep(limits.settle_delay).await;
    }

    let dom = session.capture().await?;
    let snapshot = extract_snapshot(&dom);
    ::log::debug!(
        "Extracted {}: {} chars of text, {} images",
        snapshot.url,
        snapshot.main_text.chars().count(),
        snapshot.all_image_urls.len()
    );

    Ok(ExtractedPage { dom, snapshot })
}
