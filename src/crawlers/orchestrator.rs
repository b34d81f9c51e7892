use crate::brand::aggregate::aggregate;
use crate::config::CrawlLimits;
use crate::crawlers::discovery::{DiscoveredLink, discover};
use crate::crawlers::extract::{ExtractedPage, extract};
use crate::crawlers::session::{PageSession, SessionLauncher};
use crate::error::{CrawlError, NavigationError};
use crate::filter::normalize_url;
use crate::parsers::PageDocument;
use crate::results::{AggregatedScrape, CrawledPage, PageType};
use crate::utils::normalize_input_url;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Where a crawl currently is. Home failures are terminal, subpage failures
/// only move on to the next queued page.
#[derive(Debug)]
enum CrawlState {
    NavigatingHome,
    ExtractingHome,
    DiscoveringLinks(Box<ExtractedPage>),
    NavigatingSubpage(usize),
    ExtractingSubpage(usize),
    Aggregating,
}

impl CrawlState {
    fn name(&self) -> &'static str {
        match self {
            CrawlState::NavigatingHome => "navigating-home",
            CrawlState::ExtractingHome => "extracting-home",
            CrawlState::DiscoveringLinks(_) => "discovering-links",
            CrawlState::NavigatingSubpage(_) => "navigating-subpage",
            CrawlState::ExtractingSubpage(_) => "extracting-subpage",
            CrawlState::Aggregating => "aggregating",
        }
    }
}

/// Sequences one browser session through the home page and its key pages
pub struct CrawlOrchestrator {
    launcher: Arc<dyn SessionLauncher>,
    limits: CrawlLimits,
}

impl CrawlOrchestrator {
    pub fn new(launcher: Arc<dyn SessionLauncher>, limits: CrawlLimits) -> Self {
        Self { launcher, limits }
    }

    /// Crawl the site at `input` and merge every visited page.
    ///
    /// Fails only when the home page never produces a DOM or when `cancel`
    /// fires before the home page completes. The session is closed on every
    /// exit path once it has been launched.
    pub async fn crawl(
        &self,
        input: &str,
        cancel: &CancellationToken,
    ) -> Result<AggregatedScrape, CrawlError> {
        let start = normalize_input_url(input).map_err(|e| CrawlError::InvalidUrl {
            url: input.to_string(),
            reason: e.to_string(),
        })?;
        let Some(domain) = start.host_str().map(str::to_string) else {
            return Err(CrawlError::InvalidUrl {
                url: input.to_string(),
                reason: "missing host".to_string(),
            });
        };

        if cancel.is_cancelled() {
            return Err(CrawlError::Cancelled);
        }

        let started = Instant::now();
        let mut session = self.launcher.launch().await?;
        let outcome = self.run(session.as_mut(), &start, &domain, cancel).await;
        session.close().await;

        match &outcome {
            Ok(scrape) => ::log::info!(
                "Crawled {} ({} pages) in {:.2} seconds",
                start,
                scrape.pages_visited.len(),
                started.elapsed().as_secs_f64()
            ),
            Err(e) => ::log::warn!("Crawl of {} failed: {}", start, e),
        }
        outcome
    }

    async fn run(
        &self,
        session: &mut dyn PageSession,
        start: &Url,
        domain: &str,
        cancel: &CancellationToken,
    ) -> Result<AggregatedScrape, CrawlError> {
        let mut queue: Vec<DiscoveredLink> = Vec::new();
        let mut pages: Vec<CrawledPage> = Vec::new();
        let mut state = CrawlState::NavigatingHome;

        loop {
            ::log::debug!("Crawl state: {}", state.name());
            state = match state {
                CrawlState::NavigatingHome => {
                    self.navigate_home(session, start).await?;
                    CrawlState::ExtractingHome
                }
                CrawlState::ExtractingHome => {
                    if cancel.is_cancelled() {
                        return Err(CrawlError::Cancelled);
                    }
                    let home = extract(session, true, &self.limits).await.map_err(|e| {
                        CrawlError::HomeUnreachable {
                            url: start.to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                    CrawlState::DiscoveringLinks(Box::new(home))
                }
                CrawlState::DiscoveringLinks(home) => {
                    let home = *home;
                    queue = self.build_queue(&home, start, domain);
                    pages.push(CrawledPage {
                        page_type: PageType::Home,
                        snapshot: home.snapshot,
                    });
                    self.next_subpage(0, &queue)
                }
                CrawlState::NavigatingSubpage(index) => {
                    if cancel.is_cancelled() {
                        ::log::warn!(
                            "Crawl cancelled; skipping {} remaining pages",
                            queue.len() - index
                        );
                        CrawlState::Aggregating
                    } else {
                        let link = &queue[index];
                        match session
                            .navigate(&link.url, self.limits.subpage_nav_timeout)
                            .await
                        {
                            Ok(()) => CrawlState::ExtractingSubpage(index),
                            Err(e) => {
                                ::log::warn!(
                                    "Skipping {} page {}: {}",
                                    link.page_type.as_str(),
                                    link.url,
                                    e
                                );
                                self.next_subpage(index + 1, &queue)
                            }
                        }
                    }
                }
                CrawlState::ExtractingSubpage(index) => {
                    let link = &queue[index];
                    match extract(session, false, &self.limits).await {
                        Ok(page) => pages.push(CrawledPage {
                            page_type: link.page_type,
                            snapshot: page.snapshot,
                        }),
                        Err(e) => ::log::warn!("Skipping extraction of {}: {}", link.url, e),
                    }
                    self.next_subpage(index + 1, &queue)
                }
                CrawlState::Aggregating => {
                    return Ok(aggregate(start.as_str(), domain, pages));
                }
            };
        }
    }

    /// Navigate home; a timeout downgrades to waiting for `<body>`
    async fn navigate_home(
        &self,
        session: &mut dyn PageSession,
        start: &Url,
    ) -> Result<(), CrawlError> {
        match session
            .navigate(start.as_str(), self.limits.home_nav_timeout)
            .await
        {
            Ok(()) => Ok(()),
            Err(NavigationError::Timeout) => {
                ::log::warn!(
                    "Home page {} slow to load; waiting up to {:?} for <body>",
                    start,
                    self.limits.body_wait_timeout
                );
                session
                    .wait_for_body(self.limits.body_wait_timeout)
                    .await
                    .map_err(|_| CrawlError::HomeTimedOut {
                        url: start.to_string(),
                    })
            }
            Err(NavigationError::Failed(reason)) => Err(CrawlError::HomeUnreachable {
                url: start.to_string(),
                reason,
            }),
        }
    }

    /// Key pages to visit after home, capped so the crawl never exceeds
    /// `max_pages` in total
    fn build_queue(&self, home: &ExtractedPage, start: &Url, domain: &str) -> Vec<DiscoveredLink> {
        let Ok(base) = Url::parse(&home.dom.url) else {
            return Vec::new();
        };
        let home_urls = [
            normalize_url(start).to_string(),
            normalize_url(&base).to_string(),
        ];
        let document = PageDocument::parse(&home.dom.html, base);

        discover(&document, domain)
            .into_iter()
            .filter(|link| !home_urls.contains(&link.url))
            .take(self.limits.max_pages.saturating_sub(1))
            .collect()
    }

    fn next_subpage(&self, index: usize, queue: &[DiscoveredLink]) -> CrawlState {
        if index < queue.len() {
            CrawlState::NavigatingSubpage(index)
        } else {
            CrawlState::Aggregating
        }
    }
}
