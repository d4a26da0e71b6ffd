// src/pipeline/crawl.rs

//! Incremental crawl pipeline.
//!
//! For each category, in order: fetch → merge → rebuild pages → save the
//! index, then wait for the throttle before the next category. The index is
//! checkpointed after every category, so an interrupted run keeps everything
//! merged so far. Shutdown is only honored between categories.

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, CrawlStats};
use crate::pipeline::index::IndexStore;
use crate::pipeline::paginate::write_category_pages;
use crate::pipeline::throttle::{Shutdown, Throttle, Tick, is_shutdown};
use crate::services::RecordFetcher;
use crate::storage::IndexStorage;
use crate::utils::log;

/// Run the crawler over `config.categories`.
///
/// Fetch failures skip their category. Write failures abort the run before
/// the current category is saved.
pub async fn run_crawler(
    config: &Config,
    storage: &dyn IndexStorage,
    fetcher: &dyn RecordFetcher,
    mut shutdown: Shutdown,
) -> Result<CrawlStats> {
    let start_time = Utc::now();
    log::header("Crawl - Fetching category listings");

    let mut store = IndexStore::open(storage, config.load_policy).await?;
    let mut throttle = Throttle::from_secs(config.crawler.delay_secs);

    let total = config.categories.len();
    let mut categories_failed = 0;
    let mut categories_skipped = 0;
    let mut new_records = 0;
    let mut updated_records = 0;
    let mut cancelled = false;

    for (i, category) in config.categories.iter().enumerate() {
        let proceed = if i == 0 {
            !is_shutdown(&shutdown)
        } else {
            throttle.wait(&mut shutdown).await == Tick::Ready
        };
        if !proceed {
            ::log::warn!(
                "Shutdown requested; stopping before {} ({} of {} categories left)",
                category,
                total - i,
                total
            );
            cancelled = true;
            categories_skipped = total - i;
            break;
        }

        log::step(i + 1, total, category);

        let records = match fetcher.fetch(category).await {
            Ok(records) => records,
            Err(e) => {
                ::log::warn!("Failed to fetch {}: {}", category, e);
                categories_failed += 1;
                continue;
            }
        };

        if records.is_empty() {
            ::log::info!("No records found for {}", category);
            continue;
        }

        let outcome = store.merge(category, records).await?;
        new_records += outcome.added.len();
        updated_records += outcome.updated.len();

        write_category_pages(storage, category, store.index(), config.pagination.page_size)
            .await?;
        store.save().await?;
    }

    let stats = CrawlStats {
        start_time,
        end_time: Utc::now(),
        categories: total,
        categories_failed,
        categories_skipped,
        new_records,
        updated_records,
        index_size: store.index().len(),
        cancelled,
    };
    storage.write_stats(&stats).await?;

    log::summary(
        "Crawl finished",
        &[
            (
                "categories",
                format!("{}/{} succeeded", stats.categories_succeeded(), total),
            ),
            ("new records", stats.new_records.to_string()),
            ("updated records", stats.updated_records.to_string()),
            ("index size", stats.index_size.to_string()),
            ("index", storage.index_location()),
        ],
    );
    if cancelled {
        ::log::warn!("Crawl was cancelled; remaining categories were not processed");
    } else {
        log::success("Crawl complete");
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::error::AppError;
    use crate::models::{Index, Page, Record};
    use crate::pipeline::throttle::shutdown_channel;
    use crate::storage::{IndexLoad, LocalStorage};

    /// Serves canned records per category; unknown categories fail.
    struct StubFetcher {
        responses: HashMap<String, Vec<Record>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn new(responses: Vec<(&str, Vec<Record>)>) -> Self {
            Self {
                responses: responses
                    .into_iter()
                    .map(|(c, r)| (c.to_string(), r))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RecordFetcher for StubFetcher {
        async fn fetch(&self, category: &str) -> Result<Vec<Record>> {
            self.calls.lock().unwrap().push(category.to_string());
            self.responses
                .get(category)
                .cloned()
                .ok_or_else(|| AppError::fetch(category, "listing unavailable"))
        }
    }

    fn record(id: &str, title: &str, categories: &[&str]) -> Record {
        let mut r = Record::new(id);
        r.title = title.to_string();
        r.categories = categories.iter().map(|c| c.to_string()).collect();
        r.published = Some("2024-01-01".to_string());
        r
    }

    fn config(categories: &[&str]) -> Config {
        let mut config = Config::default();
        config.categories = categories.iter().map(|c| c.to_string()).collect();
        config.crawler.delay_secs = 0;
        config
    }

    async fn load(storage: &LocalStorage) -> Index {
        match storage.load_index().await.unwrap() {
            IndexLoad::Loaded(index) => index,
            other => panic!("expected loaded index, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_single_category_from_empty_index() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let fetcher = StubFetcher::new(vec![("cs.AI", vec![record("abc123", "T", &["cs.AI"])])]);
        let (_tx, rx) = shutdown_channel();

        let stats = run_crawler(&config(&["cs.AI"]), &storage, &fetcher, rx)
            .await
            .unwrap();

        assert_eq!(stats.new_records, 1);
        let index = load(&storage).await;
        assert_eq!(index.len(), 1);
        assert!(index.get("abc123").unwrap().storage_path.is_some());

        let page: Page = storage
            .read_json("subjects/cs.AI/page_1.json")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.len(), 1);
        assert!(!storage.path("subjects/cs.AI/page_2.json").exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_category() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let fetcher = StubFetcher::new(vec![
            ("cs.AI", vec![record("a", "A", &["cs.AI"])]),
            ("cs.LG", vec![record("b", "B", &["cs.LG"])]),
        ]);
        let (_tx, rx) = shutdown_channel();

        let stats = run_crawler(
            &config(&["cs.AI", "broken", "cs.LG"]),
            &storage,
            &fetcher,
            rx,
        )
        .await
        .unwrap();

        assert_eq!(stats.categories, 3);
        assert_eq!(stats.categories_failed, 1);
        assert_eq!(stats.categories_succeeded(), 2);
        assert_eq!(load(&storage).await.len(), 2);
        assert_eq!(*fetcher.calls.lock().unwrap(), vec!["cs.AI", "broken", "cs.LG"]);

        let persisted: CrawlStats = storage.read_json("stats.json").await.unwrap().unwrap();
        assert_eq!(persisted.new_records, 2);
    }

    #[tokio::test]
    async fn test_cross_listed_record_updates_in_place() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let fetcher = StubFetcher::new(vec![
            ("cs.AI", vec![record("x", "Old", &["cs.AI", "cs.LG"])]),
            ("cs.LG", vec![record("x", "New", &["cs.AI", "cs.LG"])]),
        ]);
        let (_tx, rx) = shutdown_channel();

        let stats = run_crawler(&config(&["cs.AI", "cs.LG"]), &storage, &fetcher, rx)
            .await
            .unwrap();

        assert_eq!(stats.new_records, 1);
        assert_eq!(stats.updated_records, 1);
        let index = load(&storage).await;
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("x").unwrap().title, "New");
        assert_eq!(
            index.get("x").unwrap().storage_path.as_deref(),
            Some("papers/x.json")
        );
    }

    #[tokio::test]
    async fn test_shutdown_before_start_processes_nothing() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let fetcher = StubFetcher::new(vec![("cs.AI", vec![record("a", "A", &["cs.AI"])])]);
        let (tx, rx) = shutdown_channel();
        tx.send(true).unwrap();

        let stats = run_crawler(&config(&["cs.AI"]), &storage, &fetcher, rx)
            .await
            .unwrap();

        assert!(stats.cancelled);
        assert_eq!(stats.categories_skipped, 1);
        assert_eq!(stats.categories_succeeded(), 0);
        assert!(fetcher.calls.lock().unwrap().is_empty());
        assert_eq!(storage.load_index().await.unwrap(), IndexLoad::Absent);
    }

    #[tokio::test]
    async fn test_detail_write_failure_aborts_before_save() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        // A regular file where the detail directory should be.
        storage.write_bytes("papers", b"").await.unwrap();
        let fetcher = StubFetcher::new(vec![
            ("cs.AI", vec![record("a", "A", &["cs.AI"])]),
            ("cs.LG", vec![record("b", "B", &["cs.LG"])]),
        ]);
        let (_tx, rx) = shutdown_channel();

        let result = run_crawler(&config(&["cs.AI", "cs.LG"]), &storage, &fetcher, rx).await;

        assert!(matches!(result, Err(AppError::Io(_))));
        assert_eq!(storage.load_index().await.unwrap(), IndexLoad::Absent);
        assert!(!storage.path("subjects/cs.AI/page_1.json").exists());
        assert!(!storage.path("stats.json").exists());
        assert_eq!(*fetcher.calls.lock().unwrap(), vec!["cs.AI"]);
    }

    #[tokio::test]
    async fn test_corrupt_index_fail_fast_aborts() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage.write_bytes("index.json", b"not json").await.unwrap();
        let fetcher = StubFetcher::new(vec![]);
        let (_tx, rx) = shutdown_channel();

        let mut config = config(&["cs.AI"]);
        config.load_policy = crate::models::LoadPolicy::FailFast;

        let result = run_crawler(&config, &storage, &fetcher, rx).await;
        assert!(matches!(result, Err(AppError::CorruptIndex { .. })));
        assert!(fetcher.calls.lock().unwrap().is_empty());
    }
}
