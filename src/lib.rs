//! Brand scanning for business websites.
//!
//! A scan drives one headless browser session through a site's home page and
//! a handful of classified key pages, extracts brand signals from each, merges
//! them and derives the brand fields of a [`ScanResult`], all inside a single
//! wall-clock budget.

pub mod brand;
pub mod catalog;
pub mod config;
pub mod crawlers;
pub mod deadline;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod scan;
pub mod summary;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ScanConfig;
pub use error::{CrawlError, ScanError};
pub use results::{AggregatedScrape, Product, ScanResult};
pub use scan::{ExtendedScan, Scanner};
