use super::fake_site::{FakeResponse, FakeSite, HOME_WITH_KEY_PAGES, full_site, quick_limits, subpage};
use crate::crawlers::CrawlOrchestrator;
use crate::error::{CrawlError, ScanError};
use crate::results::PageType;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn orchestrator(site: &FakeSite, max_pages: usize) -> CrawlOrchestrator {
    CrawlOrchestrator::new(Arc::new(site.clone()), quick_limits(max_pages))
}

#[cfg(test)]
mod page_queue {
    use super::*;

    #[tokio::test]
    async fn test_visits_home_and_every_key_page() {
        let site = full_site();
        let scrape = orchestrator(&site, 6)
            .crawl("acme.test", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            scrape.pages_visited,
            vec![
                PageType::Home,
                PageType::About,
                PageType::Services,
                PageType::Contact,
                PageType::Pricing
            ]
        );
        assert_eq!(scrape.domain, "acme.test");
        assert_eq!(scrape.url, "https://acme.test/");
        assert_eq!(
            scrape.about_page_text.as_deref(),
            Some("About\n\nFounded in 2009 by two illustrators.")
        );
        assert_eq!(site.launched(), 1);
        assert_eq!(site.closed(), 1);
    }

    #[tokio::test]
    async fn test_page_cap_limits_total_visits() {
        let site = full_site();
        let scrape = orchestrator(&site, 3)
            .crawl("https://acme.test/", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(site.navigations().len(), 3);
        assert_eq!(
            scrape.pages_visited,
            vec![PageType::Home, PageType::About, PageType::Services]
        );
    }

    #[tokio::test]
    async fn test_single_page_budget_skips_discovery_queue() {
        let site = full_site();
        let scrape = orchestrator(&site, 1)
            .crawl("https://acme.test/", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(site.navigations(), vec!["https://acme.test/"]);
        assert_eq!(scrape.pages_visited, vec![PageType::Home]);
    }

    #[tokio::test]
    async fn test_subpage_failures_are_skipped() {
        let site = full_site()
            .respond("https://acme.test/about", FakeResponse::Timeout)
            .respond(
                "https://acme.test/services",
                FakeResponse::Fail("net::ERR_CONNECTION_REFUSED".to_string()),
            )
            .respond("https://acme.test/contact", FakeResponse::Hang);
        let scrape = orchestrator(&site, 6)
            .crawl("https://acme.test/", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(site.navigations().len(), 5);
        assert_eq!(scrape.pages_visited, vec![PageType::Home, PageType::Pricing]);
        assert!(scrape.about_page_text.is_none());
        assert_eq!(
            scrape.pricing_page_text.as_deref(),
            Some("Pricing\n\nProjects start at $2,000.")
        );
    }

    #[tokio::test]
    async fn test_subpage_timeout_never_waits_for_body() {
        let site = full_site().respond(
            "https://acme.test/about",
            FakeResponse::SlowBody(subpage("About", "Late but present.")),
        );
        let scrape = orchestrator(&site, 6)
            .crawl("https://acme.test/", &CancellationToken::new())
            .await
            .unwrap();

        assert!(!scrape.pages_visited.contains(&PageType::About));
    }
}

#[cfg(test)]
mod home_page {
    use super::*;

    #[tokio::test]
    async fn test_slow_home_falls_back_to_body_wait() {
        let site = FakeSite::new().respond(
            "https://acme.test/",
            FakeResponse::SlowBody(HOME_WITH_KEY_PAGES.to_string()),
        );
        let scrape = orchestrator(&site, 6)
            .crawl("https://acme.test/", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(scrape.title.as_deref(), Some("Acme Studio | Design"));
        // every subpage is missing from the fake site and gets skipped
        assert_eq!(scrape.pages_visited, vec![PageType::Home]);
        assert_eq!(site.navigations().len(), 5);
    }

    #[tokio::test]
    async fn test_home_timeout_without_body_is_a_timeout() {
        let site = FakeSite::new().respond("https://acme.test/", FakeResponse::Timeout);
        let err = orchestrator(&site, 6)
            .crawl("https://acme.test/", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::HomeTimedOut { .. }));
        assert!(ScanError::from(err).is_timeout());
        assert_eq!(site.closed(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_home_is_fatal() {
        let site = FakeSite::new().respond(
            "https://acme.test/",
            FakeResponse::Fail("net::ERR_NAME_NOT_RESOLVED".to_string()),
        );
        let err = orchestrator(&site, 6)
            .crawl("https://acme.test/", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::HomeUnreachable { .. }));
        assert!(!ScanError::from(err).is_timeout());
        assert_eq!(site.closed(), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_never_launches() {
        let site = full_site();
        let err = orchestrator(&site, 6)
            .crawl("https://", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::InvalidUrl { .. }));
        assert_eq!(site.launched(), 0);
    }
}

#[cfg(test)]
mod cancellation {
    use super::*;

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let site = full_site();
        let token = CancellationToken::new();
        token.cancel();

        let err = orchestrator(&site, 6)
            .crawl("https://acme.test/", &token)
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::Cancelled));
        assert_eq!(site.launched(), 0);
        assert_eq!(site.closed(), 0);
    }

    #[tokio::test]
    async fn test_cancel_after_home_keeps_home_data() {
        let token = CancellationToken::new();
        let site = full_site().cancel_after("https://acme.test/", token.clone());

        let scrape = orchestrator(&site, 6)
            .crawl("https://acme.test/", &token)
            .await
            .unwrap();

        assert_eq!(site.navigations(), vec!["https://acme.test/"]);
        assert_eq!(scrape.pages_visited, vec![PageType::Home]);
        assert_eq!(scrape.title.as_deref(), Some("Acme Studio | Design"));
        assert_eq!(scrape.logo_url.as_deref(), Some("https://acme.test/logo.png"));
        assert_eq!(site.closed(), 1);
    }

    #[tokio::test]
    async fn test_cancel_between_subpages_stops_queue() {
        let token = CancellationToken::new();
        let site = full_site().cancel_after("https://acme.test/about", token.clone());

        let scrape = orchestrator(&site, 6)
            .crawl("https://acme.test/", &token)
            .await
            .unwrap();

        assert_eq!(scrape.pages_visited, vec![PageType::Home, PageType::About]);
        assert_eq!(site.navigations().len(), 2);
        assert_eq!(site.closed(), 1);
    }
}
