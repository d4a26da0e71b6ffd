//! Pipeline entry points.
//!
//! - `run_crawler`: fetch each category, merge into the index, rebuild its pages
//! - `run_export`: project the index into static-site content
//! - `run_validate`: check the configuration

pub mod crawl;
pub mod export;
pub mod index;
pub mod paginate;
pub mod throttle;
pub mod validate;

pub use crawl::run_crawler;
pub use export::{ExportReport, run_export};
pub use index::{IndexStore, MergeOutcome};
pub use throttle::{Shutdown, shutdown_channel};
pub use validate::run_validate;
