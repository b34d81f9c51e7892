//! Post-crawl passes: merging page snapshots, deduplicating images and the
//! heuristics that turn an aggregated scrape into brand fields.

pub mod aggregate;
pub mod colors;
pub mod dedupe;
pub mod kit;
pub mod logo;
pub mod profile;
pub mod selling;

pub use aggregate::aggregate;
pub use colors::pick_top_colors;
pub use dedupe::{canonical_image_key, dedupe_image_urls};
pub use kit::{BrandKit, build_brand_kit};
pub use logo::pick_logo;
pub use profile::{ExtractedProfile, extract_profile};
pub use selling::infer_selling_type;
