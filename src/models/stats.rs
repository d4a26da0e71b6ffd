use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics for a single crawl run, persisted as `stats.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Categories configured for the run
    pub categories: usize,
    pub categories_failed: usize,
    /// Categories never attempted because the run was cancelled
    #[serde(default)]
    pub categories_skipped: usize,
    pub new_records: usize,
    pub updated_records: usize,
    /// Records in the index at the end of the run
    pub index_size: usize,
    /// Run stopped early on a shutdown request
    #[serde(default)]
    pub cancelled: bool,
}

impl CrawlStats {
    pub fn categories_succeeded(&self) -> usize {
        self.categories
            .saturating_sub(self.categories_failed + self.categories_skipped)
    }
}
