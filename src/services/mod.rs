//! Service layer: sources of fetched records.
//!
//! - `RecordFetcher`: the seam the crawl pipeline depends on
//! - `ArxivFetcher`: listing page + Atom API implementation
//! - `listing` / `atom`: synchronous parsers used by the fetcher

mod arxiv;
pub mod atom;
pub mod listing;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Record;

pub use arxiv::ArxivFetcher;

/// Source of freshly fetched records for a category.
///
/// An `Err` fails only the category it was called for.
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    async fn fetch(&self, category: &str) -> Result<Vec<Record>>;
}
