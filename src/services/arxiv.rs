// src/services/arxiv.rs

//! arXiv record fetcher.
//!
//! Two stages per category: download the "recent" listing page to collect
//! identifiers, then resolve them in batches through the Atom query API.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, Record};
use crate::services::{RecordFetcher, atom, listing};
use crate::utils::{http, url};

/// Fetches category listings and metadata from arXiv.
pub struct ArxivFetcher {
    config: Arc<CrawlerConfig>,
    client: Client,
}

impl ArxivFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: Arc<CrawlerConfig>) -> Result<Self> {
        let client = http::create_async_client(&config)?;
        Ok(Self { config, client })
    }

    /// Collect identifiers from a category listing page.
    pub async fn fetch_ids(&self, category: &str) -> Result<Vec<String>> {
        let listing_url = url::listing_url(
            &self.config.listing_base_url,
            category,
            self.config.listing_show,
        )?;
        log::info!("Fetching list page for {}", category);
        let html = http::fetch_text(&self.client, &listing_url).await?;
        listing::extract_ids(&html)
    }

    /// Resolve identifiers into records, preserving listing order.
    pub async fn fetch_metadata(&self, ids: &[String]) -> Result<Vec<Record>> {
        let batch_size = self.config.batch_size.max(1);
        let concurrency = self.config.max_concurrent.max(1);

        let batches: Vec<Vec<String>> = ids.chunks(batch_size).map(<[String]>::to_vec).collect();
        let records: Vec<Vec<Record>> = stream::iter(batches)
            .map(|batch| async move { self.fetch_batch(&batch).await })
            .buffered(concurrency)
            .try_collect()
            .await?;

        Ok(records.into_iter().flatten().collect())
    }

    async fn fetch_batch(&self, batch: &[String]) -> Result<Vec<Record>> {
        let query = url::query_url(&self.config.api_base_url, batch)?;
        log::debug!("Querying metadata for {} ids", batch.len());
        let feed = http::fetch_text(&self.client, &query).await?;
        atom::parse_feed(&feed)
    }
}

#[async_trait]
impl RecordFetcher for ArxivFetcher {
    async fn fetch(&self, category: &str) -> Result<Vec<Record>> {
        let ids = self
            .fetch_ids(category)
            .await
            .map_err(|e| AppError::fetch(category, e))?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }
        log::info!("Found {} ids for {}", ids.len(), category);

        self.fetch_metadata(&ids)
            .await
            .map_err(|e| AppError::fetch(category, e))
    }
}
