// src/models/mod.rs

//! Domain models for the indexer.

mod config;
mod index;
mod record;
mod stats;

pub use config::{
    Config, CrawlerConfig, ExportConfig, LoadPolicy, PaginationConfig, PathsConfig,
};
pub use index::Index;
pub use record::{Record, Summary};
pub use stats::CrawlStats;

/// One page of category summaries.
pub type Page = Vec<Summary>;
