//! Local filesystem storage implementation.
//!
//! Every write goes to a sibling `*.tmp` file first and is then renamed into
//! place, so an interrupted run never leaves a half-written index or page.
//!
//! The same type backs the static-site export: it is just a rooted key/value
//! view of a directory, plus the index-specific layout from [`PathsConfig`].

use std::path::PathBuf;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CrawlStats, Index, Page, PathsConfig, Record};
use crate::storage::{IndexLoad, IndexStorage};
use crate::utils::{category_dir, sanitize_id};

static PAGE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^page_(\d+)\.json$").expect("valid page file pattern"));

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    layout: PathsConfig,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory with the default layout.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            layout: PathsConfig::default(),
        }
    }

    /// Create a LocalStorage from a path configuration (`output_dir` becomes the root).
    pub fn with_layout(layout: &PathsConfig) -> Self {
        Self {
            root_dir: PathBuf::from(&layout.output_dir),
            layout: layout.clone(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    pub async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::validation(format!("Invalid storage key: {key}")))?;
        let tmp = path.with_file_name(format!("{file_name}.tmp"));

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Write a UTF-8 text document.
    pub async fn write_text(&self, key: &str, text: &str) -> Result<()> {
        self.write_bytes(key, text.as_bytes()).await
    }

    /// Read bytes, returning None if file doesn't exist.
    pub async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// File names directly inside a directory key. A missing directory is empty.
    pub async fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(self.path(dir)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Remove a file, ignoring one that is already gone.
    pub async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write `page_1.json ..= page_N.json` under `dir` and prune stale pages.
    ///
    /// Returns the number of pages written.
    pub async fn write_pages(&self, dir: &str, pages: &[Page]) -> Result<usize> {
        for (i, page) in pages.iter().enumerate() {
            self.write_json(&format!("{}/page_{}.json", dir, i + 1), page)
                .await?;
        }

        for name in self.list_files(dir).await? {
            let Some(number) = PAGE_FILE
                .captures(&name)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<usize>().ok())
            else {
                continue;
            };
            if number > pages.len() {
                log::debug!("Removing stale page {}/{}", dir, name);
                self.remove(&format!("{}/{}", dir, name)).await?;
            }
        }

        Ok(pages.len())
    }

    /// Key of the summary page directory for a category.
    pub fn category_key(&self, category: &str) -> String {
        format!("{}/{}", self.layout.pages_dir, category_dir(category))
    }

    /// Key of the detail file for a record.
    pub fn record_key(&self, record: &Record) -> String {
        format!("{}/{}.json", self.layout.records_dir, sanitize_id(&record.id))
    }
}

#[async_trait]
impl IndexStorage for LocalStorage {
    async fn load_index(&self) -> Result<IndexLoad> {
        let Some(bytes) = self.read_bytes(&self.layout.index_file).await? else {
            return Ok(IndexLoad::Absent);
        };
        match serde_json::from_slice::<Index>(&bytes) {
            Ok(index) => Ok(IndexLoad::Loaded(index)),
            Err(e) => Ok(IndexLoad::Corrupt {
                reason: e.to_string(),
            }),
        }
    }

    async fn save_index(&self, index: &Index) -> Result<()> {
        self.write_json(&self.layout.index_file, index).await?;
        log::info!(
            "Index saved: {} (records={})",
            self.index_location(),
            index.len()
        );
        Ok(())
    }

    async fn write_record(&self, record: &Record) -> Result<String> {
        let key = self.record_key(record);
        self.write_json(&key, record).await?;
        Ok(key)
    }

    async fn write_category_pages(&self, category: &str, pages: &[Page]) -> Result<usize> {
        let dir = self.category_key(category);
        self.write_pages(&dir, pages).await
    }

    async fn write_stats(&self, stats: &CrawlStats) -> Result<()> {
        self.write_json(&self.layout.stats_file, stats).await
    }

    async fn load_stats(&self) -> Result<Option<CrawlStats>> {
        self.read_json(&self.layout.stats_file).await
    }

    fn index_location(&self) -> String {
        self.path(&self.layout.index_file).display().to_string()
    }
}
