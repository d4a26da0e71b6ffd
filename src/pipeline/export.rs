// src/pipeline/export.rs

//! Static-site exporter.
//!
//! Projects the index into Hexo-style content under the site directory:
//!
//! ```text
//! hexo_site/source/
//! ├── data/subjects/<category>/page_N.json   # summary pages
//! └── _posts/
//!     ├── <category>/<date>-<id>.md          # one document per (category, record)
//!     └── highlights/<date>-<id>.md          # newest N of each category
//! ```
//!
//! A record tagged with several categories is written once per category.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Config, Index, Record, Summary};
use crate::pipeline::paginate::paginate;
use crate::storage::{IndexLoad, IndexStorage, LocalStorage};
use crate::utils::{category_dir, log, sanitize_id, sort_newest_first, today};

const PAGES_DIR: &str = "source/data/subjects";
const POSTS_DIR: &str = "source/_posts";
const HIGHLIGHTS_DIR: &str = "highlights";

/// Counters for one export run.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ExportReport {
    pub categories: usize,
    pub pages: usize,
    pub documents: usize,
    pub highlights: usize,
}

/// Whether `category` passes the prefix filter. An empty filter passes everything.
pub fn matches_prefix(category: &str, prefixes: &[String]) -> bool {
    if prefixes.is_empty() {
        return true;
    }
    let category = category.to_lowercase();
    prefixes
        .iter()
        .any(|p| category.starts_with(&p.to_lowercase()))
}

/// One `(category, record)` pair per passing tag of every record, in index order.
pub fn category_fan_out<'a>(index: &'a Index, prefixes: &[String]) -> Vec<(&'a str, &'a Record)> {
    index
        .records
        .values()
        .flat_map(move |record| {
            record
                .categories
                .iter()
                .filter(move |c| matches_prefix(c, prefixes))
                .map(move |c| (c.as_str(), record))
        })
        .collect()
}

/// Fold the fan-out into per-category groups sorted newest first.
pub fn group_by_category<'a>(
    index: &'a Index,
    prefixes: &[String],
) -> BTreeMap<&'a str, Vec<&'a Record>> {
    let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for (category, record) in category_fan_out(index, prefixes) {
        groups.entry(category).or_default().push(record);
    }
    for records in groups.values_mut() {
        sort_newest_first(records, |r| r.published_key());
    }
    groups
}

/// Write the summary pages of one category under the site's data directory.
pub async fn write_summary_pages(
    site: &LocalStorage,
    category: &str,
    records: &[&Record],
    page_size: usize,
) -> Result<usize> {
    let summaries: Vec<Summary> = records.iter().map(|r| r.to_summary()).collect();
    let pages = paginate(&summaries, page_size)?;
    site.write_pages(&format!("{}/{}", PAGES_DIR, category_dir(category)), &pages)
        .await
}

/// A rendered publishable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub contents: String,
}

/// Date used in the document's front matter and file name.
///
/// Falls back to the date the record was first indexed, then to `today`.
pub fn document_date<'a>(record: &'a Record, today: &'a str) -> &'a str {
    if let Some(date) = record.published.as_deref().filter(|d| !d.is_empty()) {
        return date;
    }
    if let Some(date) = record.first_seen.as_deref().filter(|d| !d.is_empty()) {
        return date;
    }
    ::log::debug!("Record {} has no date; using {}", record.id, today);
    today
}

/// Render front matter and body for `record`.
///
/// `category` adds a `categories` line; highlights are rendered without one.
pub fn render_document(record: &Record, category: Option<&str>, today: &str) -> Result<Document> {
    let date = document_date(record, today);

    let mut contents = String::from("---\n");
    contents.push_str(&format!("title: {}\n", serde_json::to_string(&record.title)?));
    contents.push_str(&format!("date: {}\n", date));
    contents.push_str(&format!("tags: {}\n", serde_json::to_string(&record.categories)?));
    if let Some(category) = category {
        contents.push_str(&format!("categories: {}\n", serde_json::to_string(&[category])?));
    }
    contents.push_str(&format!("authors: {}\n", serde_json::to_string(&record.authors)?));
    contents.push_str(&format!("id: {}\n", serde_json::to_string(&record.id)?));
    contents.push_str(&format!("original_url: {}\n", serde_json::to_string(&record.url)?));
    contents.push_str("---\n\n");
    contents.push_str(&format!("<a href=\"{0}\">{0}</a>\n", record.url));
    contents.push_str(&record.summary);
    contents.push('\n');

    Ok(Document {
        file_name: format!("{}-{}.md", date, sanitize_id(&record.id)),
        contents,
    })
}

/// Render and write one document. Returns its key relative to the site root.
pub async fn write_detail_document(
    site: &LocalStorage,
    record: &Record,
    category: Option<&str>,
    today: &str,
) -> Result<String> {
    let document = render_document(record, category, today)?;
    let dir = match category {
        Some(category) => category_dir(category),
        None => HIGHLIGHTS_DIR.to_string(),
    };
    let key = format!("{}/{}/{}", POSTS_DIR, dir, document.file_name);
    site.write_text(&key, &document.contents).await?;
    Ok(key)
}

/// Load the index, treating a missing or unreadable document as an error.
pub async fn load_index_strict(storage: &dyn IndexStorage) -> Result<Index> {
    match storage.load_index().await? {
        IndexLoad::Loaded(index) => Ok(index),
        IndexLoad::Absent => Err(AppError::config(format!(
            "No index at {}; run a crawl first",
            storage.index_location()
        ))),
        IndexLoad::Corrupt { reason } => {
            Err(AppError::corrupt_index(storage.index_location(), reason))
        }
    }
}

/// Export the index read from `storage` into `config.export.site_dir`.
pub async fn run_export(config: &Config, storage: &dyn IndexStorage) -> Result<ExportReport> {
    log::header("Export - Building site content");

    let index = load_index_strict(storage).await?;
    let site = LocalStorage::new(&config.export.site_dir);
    let today = today();
    let page_size = config.pagination.page_size;

    let groups = group_by_category(&index, &config.export.category_prefixes);
    let total = groups.len();
    let mut report = ExportReport {
        categories: total,
        ..ExportReport::default()
    };

    for (i, (&category, records)) in groups.iter().enumerate() {
        log::step(i + 1, total, &format!("{} ({} records)", category, records.len()));

        report.pages += write_summary_pages(&site, category, records, page_size).await?;

        for record in records.iter().take(config.export.highlights) {
            write_detail_document(&site, record, None, &today).await?;
            report.highlights += 1;
        }

        for record in records {
            write_detail_document(&site, record, Some(category), &today).await?;
            report.documents += 1;
        }
    }

    log::summary(
        "Export finished",
        &[
            ("site", site.root().display().to_string()),
            ("categories", report.categories.to_string()),
            ("pages", report.pages.to_string()),
            ("documents", report.documents.to_string()),
            ("highlights", report.highlights.to_string()),
        ],
    );
    log::success("Export complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, published: Option<&str>, categories: &[&str]) -> Record {
        let mut r = Record::new(id);
        r.title = format!("Paper {id}");
        r.url = format!("http://arxiv.org/abs/{id}");
        r.summary = "An abstract.".to_string();
        r.authors = vec!["Ada Lovelace".to_string()];
        r.published = published.map(String::from);
        r.categories = categories.iter().map(|c| c.to_string()).collect();
        r
    }

    fn prefixes(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_prefix_filter_drops_other_archives() {
        let mut index = Index::new();
        index.insert_new(record("x", Some("2024-01-01"), &["cs.AI", "math.ST"]));

        let pairs = category_fan_out(&index, &prefixes(&["cs."]));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "cs.AI");

        let groups = group_by_category(&index, &prefixes(&["cs."]));
        assert!(groups.contains_key("cs.AI"));
        assert!(!groups.contains_key("math.ST"));
    }

    #[test]
    fn test_prefix_filter_is_case_insensitive() {
        assert!(matches_prefix("cs.AI", &prefixes(&["CS."])));
        assert!(matches_prefix("eess.SP", &prefixes(&["cs.", "eess."])));
        assert!(!matches_prefix("stat.ML", &prefixes(&["cs."])));
        assert!(matches_prefix("stat.ML", &[]));
    }

    #[test]
    fn test_fan_out_duplicates_cross_listed_records() {
        let mut index = Index::new();
        index.insert_new(record("x", Some("2024-01-01"), &["cs.AI", "cs.LG"]));
        index.insert_new(record("y", Some("2024-02-01"), &["cs.AI"]));

        let pairs = category_fan_out(&index, &[]);
        assert_eq!(pairs.len(), 3);

        let groups = group_by_category(&index, &[]);
        let ai: Vec<_> = groups["cs.AI"].iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ai, vec!["y", "x"]);
        assert_eq!(groups["cs.LG"].len(), 1);
    }

    #[test]
    fn test_render_document_front_matter() {
        let mut r = record("2401.00001v1", Some("2024-01-05"), &["cs.AI", "math.ST"]);
        r.title = "Quotes \"inside\"".to_string();

        let doc = render_document(&r, Some("cs.AI"), "2030-01-01").unwrap();
        assert_eq!(doc.file_name, "2024-01-05-2401_00001v1.md");

        let expected = "---\n\
title: \"Quotes \\\"inside\\\"\"\n\
date: 2024-01-05\n\
tags: [\"cs.AI\",\"math.ST\"]\n\
categories: [\"cs.AI\"]\n\
authors: [\"Ada Lovelace\"]\n\
id: \"2401.00001v1\"\n\
original_url: \"http://arxiv.org/abs/2401.00001v1\"\n\
---\n\
\n\
<a href=\"http://arxiv.org/abs/2401.00001v1\">http://arxiv.org/abs/2401.00001v1</a>\n\
An abstract.\n";
        assert_eq!(doc.contents, expected);
    }

    #[test]
    fn test_highlight_document_has_no_categories_line() {
        let r = record("a", Some("2024-01-05"), &["cs.AI"]);
        let doc = render_document(&r, None, "2030-01-01").unwrap();
        assert!(!doc.contents.contains("categories:"));
        assert!(doc.contents.contains("tags: [\"cs.AI\"]"));
    }

    #[test]
    fn test_document_date_fallbacks() {
        let mut r = record("a", None, &["cs.AI"]);
        r.first_seen = Some("2023-06-01".to_string());
        assert_eq!(document_date(&r, "2030-01-01"), "2023-06-01");

        r.first_seen = None;
        assert_eq!(document_date(&r, "2030-01-01"), "2030-01-01");

        r.published = Some("2024-02-02".to_string());
        assert_eq!(document_date(&r, "2030-01-01"), "2024-02-02");
    }

    #[tokio::test]
    async fn test_load_index_strict_rejects_absent_and_corrupt() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(matches!(
            load_index_strict(&storage).await,
            Err(AppError::Config(_))
        ));

        storage.write_bytes("index.json", b"{broken").await.unwrap();
        assert!(matches!(
            load_index_strict(&storage).await,
            Err(AppError::CorruptIndex { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_export_writes_site() {
        let data = TempDir::new().unwrap();
        let site = TempDir::new().unwrap();
        let storage = LocalStorage::new(data.path());

        let mut index = Index::new();
        index.insert_new(record("a", Some("2024-01-01"), &["cs.AI", "math.ST"]));
        index.insert_new(record("b", Some("2024-01-02"), &["cs.AI"]));
        index.insert_new(record("c", Some("2024-01-03"), &["cs.AI"]));
        storage.save_index(&index).await.unwrap();

        let mut config = Config::default();
        config.export.site_dir = site.path().display().to_string();
        config.export.highlights = 2;
        config.export.category_prefixes = prefixes(&["cs."]);
        config.pagination.page_size = 2;

        let report = run_export(&config, &storage).await.unwrap();
        assert_eq!(
            report,
            ExportReport {
                categories: 1,
                pages: 2,
                documents: 3,
                highlights: 2,
            }
        );

        let site = LocalStorage::new(site.path());
        let first: Vec<Summary> = site
            .read_json("source/data/subjects/cs.AI/page_1.json")
            .await
            .unwrap()
            .unwrap();
        let ids: Vec<_> = first.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);

        assert_eq!(
            site.list_files("source/_posts/cs.AI").await.unwrap(),
            vec!["2024-01-01-a.md", "2024-01-02-b.md", "2024-01-03-c.md"]
        );
        assert_eq!(
            site.list_files("source/_posts/highlights").await.unwrap(),
            vec!["2024-01-02-b.md", "2024-01-03-c.md"]
        );
        assert!(site.list_files("source/_posts/math.ST").await.unwrap().is_empty());
    }
}
