//! Index store: load, merge and checkpoint the record index.
//!
//! Merge policy for an incoming record:
//! - unseen id: write its detail file, stamp `storage_path` and `first_seen`,
//!   insert a full copy
//! - seen id: overwrite `title`, `summary`, `authors`, `categories`,
//!   `published` and `url` in place; everything else is left alone
//!
//! Nothing is ever removed. A record that drops out of later listings stays
//! in the index unchanged.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Index, LoadPolicy, Record};
use crate::storage::{IndexLoad, IndexStorage};
use crate::utils::today;

/// Result of merging one category's records.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MergeOutcome {
    pub category: String,
    /// Ids inserted for the first time
    pub added: Vec<String>,
    /// Ids whose metadata changed
    pub updated: Vec<String>,
    /// Ids seen again with identical metadata
    pub unchanged: usize,
}

impl MergeOutcome {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty()
    }
}

/// The single writer of the persisted index.
pub struct IndexStore<'a> {
    storage: &'a dyn IndexStorage,
    index: Index,
}

impl<'a> IndexStore<'a> {
    /// Load the persisted index and apply `policy` to a corrupt document.
    pub async fn open(storage: &'a dyn IndexStorage, policy: LoadPolicy) -> Result<Self> {
        let index = match storage.load_index().await? {
            IndexLoad::Loaded(index) => {
                log::info!(
                    "Loaded index {} ({} records)",
                    storage.index_location(),
                    index.len()
                );
                index
            }
            IndexLoad::Absent => {
                log::info!("No index at {}; starting fresh", storage.index_location());
                Index::new()
            }
            IndexLoad::Corrupt { reason } => match policy {
                LoadPolicy::Fallback => {
                    log::warn!(
                        "Failed to read index {}: {}. Starting fresh; previously indexed records are forgotten until fetched again",
                        storage.index_location(),
                        reason
                    );
                    Index::new()
                }
                LoadPolicy::FailFast => {
                    return Err(AppError::corrupt_index(storage.index_location(), reason));
                }
            },
        };

        Ok(Self { storage, index })
    }

    /// Wrap an already loaded index.
    pub fn from_index(storage: &'a dyn IndexStorage, index: Index) -> Self {
        Self { storage, index }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Merge freshly fetched records for `category`.
    ///
    /// Records are applied in the order given. A failed detail write aborts the
    /// merge; the caller must not save in that case.
    pub async fn merge(&mut self, category: &str, incoming: Vec<Record>) -> Result<MergeOutcome> {
        let mut outcome = MergeOutcome {
            category: category.to_string(),
            ..MergeOutcome::default()
        };

        for mut record in incoming {
            record.dedup_categories();

            match self.index.update_existing(&record) {
                Some(true) => outcome.updated.push(record.id.clone()),
                Some(false) => outcome.unchanged += 1,
                None => {
                    record.first_seen = Some(today());
                    record.storage_path = None;
                    let path = self.storage.write_record(&record).await?;
                    record.storage_path = Some(path);

                    outcome.added.push(record.id.clone());
                    self.index.insert_new(record);
                }
            }
        }

        log::info!(
            "Category {}: {} new, {} updated, {} unchanged",
            category,
            outcome.added.len(),
            outcome.updated.len(),
            outcome.unchanged
        );
        Ok(outcome)
    }

    /// Persist the full index.
    pub async fn save(&self) -> Result<()> {
        self.storage.save_index(&self.index).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    fn raw(id: &str, title: &str, categories: &[&str]) -> Record {
        let mut r = Record::new(id);
        r.title = title.to_string();
        r.url = format!("http://arxiv.org/abs/{id}");
        r.published = Some("2024-01-01".to_string());
        r.categories = categories.iter().map(|c| c.to_string()).collect();
        r
    }

    #[tokio::test]
    async fn test_first_merge_inserts_and_writes_detail() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut store = IndexStore::open(&storage, LoadPolicy::Fallback).await.unwrap();

        let outcome = store
            .merge("cs.AI", vec![raw("abc123", "Title", &["cs.AI"])])
            .await
            .unwrap();

        assert_eq!(outcome.added, vec!["abc123"]);
        let record = store.index().get("abc123").unwrap();
        assert_eq!(record.storage_path.as_deref(), Some("papers/abc123.json"));
        assert!(record.first_seen.is_some());
        assert!(storage.path("papers/abc123.json").exists());
    }

    #[tokio::test]
    async fn test_remerge_preserves_storage_path() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let mut existing = raw("abc123", "Old Title", &["cs.AI"]);
        existing.storage_path = Some("papers/abc123.json".to_string());
        existing.first_seen = Some("2023-12-31".to_string());
        let mut index = Index::new();
        index.insert_new(existing);

        let mut store = IndexStore::from_index(&storage, index);
        let mut incoming = raw("abc123", "New Title", &["cs.AI", "cs.LG"]);
        incoming.storage_path = Some("elsewhere.json".to_string());

        let outcome = store.merge("cs.AI", vec![incoming]).await.unwrap();
        assert_eq!(outcome.updated, vec!["abc123"]);
        assert!(outcome.added.is_empty());

        let record = store.index().get("abc123").unwrap();
        assert_eq!(record.title, "New Title");
        assert_eq!(record.categories, vec!["cs.AI", "cs.LG"]);
        assert_eq!(record.storage_path.as_deref(), Some("papers/abc123.json"));
        assert_eq!(record.first_seen.as_deref(), Some("2023-12-31"));
        // No detail file is written on update.
        assert!(!storage.path("papers/abc123.json").exists());
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut store = IndexStore::open(&storage, LoadPolicy::Fallback).await.unwrap();

        let batch = vec![
            raw("a", "A", &["cs.AI"]),
            raw("b", "B", &["cs.AI", "math.ST"]),
        ];
        store.merge("cs.AI", batch.clone()).await.unwrap();
        let once = store.index().clone();

        let outcome = store.merge("cs.AI", batch).await.unwrap();
        assert!(!outcome.has_changes());
        assert_eq!(outcome.unchanged, 2);
        assert_eq!(store.index(), &once);
    }

    #[tokio::test]
    async fn test_duplicate_ids_in_one_batch_stay_unique() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut store = IndexStore::open(&storage, LoadPolicy::Fallback).await.unwrap();

        let outcome = store
            .merge(
                "cs.AI",
                vec![raw("dup", "First", &["cs.AI"]), raw("dup", "Second", &["cs.AI"])],
            )
            .await
            .unwrap();

        assert_eq!(outcome.added, vec!["dup"]);
        assert_eq!(outcome.updated, vec!["dup"]);
        assert_eq!(store.index().len(), 1);
        assert_eq!(store.index().get("dup").unwrap().title, "Second");
    }

    #[tokio::test]
    async fn test_open_policies_on_corrupt_index() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage.write_bytes("index.json", b"[oops").await.unwrap();

        let store = IndexStore::open(&storage, LoadPolicy::Fallback).await.unwrap();
        assert!(store.index().is_empty());

        let result = IndexStore::open(&storage, LoadPolicy::FailFast).await;
        assert!(matches!(result, Err(AppError::CorruptIndex { .. })));
    }

    #[tokio::test]
    async fn test_save_then_reopen() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut store = IndexStore::open(&storage, LoadPolicy::FailFast).await.unwrap();
        store
            .merge("cs.AI", vec![raw("a", "A", &["cs.AI"])])
            .await
            .unwrap();
        store.save().await.unwrap();
        store.save().await.unwrap();

        let reopened = IndexStore::open(&storage, LoadPolicy::FailFast).await.unwrap();
        assert_eq!(reopened.index(), store.index());
    }
}
