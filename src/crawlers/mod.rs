//! Browser-driven crawling: the session seam, its WebDriver implementation,
//! link discovery and the orchestrator that sequences a crawl.

pub mod discovery;
pub mod extract;
pub mod orchestrator;
pub mod scripts;
pub mod session;
pub mod web;

#[cfg(test)]
pub(crate) mod tests;

pub use discovery::{DiscoveredLink, discover};
pub use extract::{ExtractedPage, extract};
pub use orchestrator::CrawlOrchestrator;
pub use session::{ComputedStyles, DomSnapshot, PageSession, SessionLauncher};
pub use web::WebDriverLauncher;
