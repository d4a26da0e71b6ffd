// src/lib.rs

//! paperdex library
//!
//! Incrementally indexes arXiv category listings, keeps paginated per-category
//! summaries on disk and exports the index as static-site content.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
