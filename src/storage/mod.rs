//! Storage abstractions for index persistence.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── index.json            # id -> record mapping (checkpointed per category)
//! ├── stats.json            # Last crawl statistics
//! ├── papers/               # One detail file per record
//! │   └── 2401_12345v1.json
//! └── subjects/             # Paginated summaries, rebuilt every run
//!     └── cs.AI/
//!         ├── page_1.json
//!         └── page_2.json
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CrawlStats, Index, Page, Record};

// Re-export for convenience
pub use local::LocalStorage;

/// Outcome of reading the persisted index.
///
/// Absent and corrupt are kept apart so the caller picks the recovery policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexLoad {
    /// No index has been written yet
    Absent,
    /// An index exists but could not be parsed
    Corrupt { reason: String },
    /// Index parsed successfully
    Loaded(Index),
}

/// Trait for index storage backends.
#[async_trait]
pub trait IndexStorage: Send + Sync {
    /// Read the persisted index.
    async fn load_index(&self) -> Result<IndexLoad>;

    /// Persist the full index, replacing the previous document.
    async fn save_index(&self, index: &Index) -> Result<()>;

    /// Write the per-record detail file.
    ///
    /// Returns the path relative to the storage root.
    async fn write_record(&self, record: &Record) -> Result<String>;

    /// Replace the summary pages of a category.
    ///
    /// Pages numbered beyond `pages.len()` left over from earlier runs are removed.
    async fn write_category_pages(&self, category: &str, pages: &[Page]) -> Result<usize>;

    /// Persist statistics for the last crawl.
    async fn write_stats(&self, stats: &CrawlStats) -> Result<()>;

    /// Load statistics for the last crawl, if any.
    async fn load_stats(&self) -> Result<Option<CrawlStats>>;

    /// Human-readable location of the index document.
    fn index_location(&self) -> String;
}
