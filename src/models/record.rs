//! Record and summary data structures.

use serde::{Deserialize, Serialize};

/// A paper discovered in a category listing.
///
/// `storage_path` and `first_seen` are owned by the index: they are stamped on
/// first insertion and never touched by later merges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// Stable identifier (e.g. `2401.12345v1`)
    #[serde(alias = "doi")]
    pub id: String,

    /// Canonical source link
    #[serde(default)]
    pub url: String,

    /// Paper title
    #[serde(default)]
    pub title: String,

    /// Publication date, `YYYY-MM-DD`
    #[serde(default)]
    pub published: Option<String>,

    /// Author names in source order
    #[serde(default)]
    pub authors: Vec<String>,

    /// Category tags, no duplicates
    #[serde(default, alias = "subjects")]
    pub categories: Vec<String>,

    /// Abstract text
    #[serde(default)]
    pub summary: String,

    /// Relative path of the per-record detail file
    #[serde(default, alias = "_file", skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,

    /// Date the record entered the index, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<String>,
}

impl Record {
    /// Create a record with only an identifier set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: String::new(),
            title: String::new(),
            published: None,
            authors: Vec::new(),
            categories: Vec::new(),
            summary: String::new(),
            storage_path: None,
            first_seen: None,
        }
    }

    /// Whether this record is tagged with `category`.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Sort key for newest-first ordering. Missing dates sort lowest.
    pub fn published_key(&self) -> &str {
        self.published.as_deref().unwrap_or("")
    }

    /// Remove repeated category tags, keeping first occurrences.
    pub fn dedup_categories(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.categories.retain(|c| seen.insert(c.clone()));
    }

    /// Overwrite the mutable metadata fields from a freshly fetched copy.
    ///
    /// Returns `true` if any field changed.
    pub fn update_from(&mut self, incoming: &Record) -> bool {
        let before = (
            &self.title,
            &self.summary,
            &self.authors,
            &self.categories,
            &self.published,
            &self.url,
        );
        let after = (
            &incoming.title,
            &incoming.summary,
            &incoming.authors,
            &incoming.categories,
            &incoming.published,
            &incoming.url,
        );
        if before == after {
            return false;
        }

        self.title = incoming.title.clone();
        self.summary = incoming.summary.clone();
        self.authors = incoming.authors.clone();
        self.categories = incoming.categories.clone();
        self.published = incoming.published.clone();
        self.url = incoming.url.clone();
        true
    }

    /// Project to the lightweight listing form.
    pub fn to_summary(&self) -> Summary {
        Summary::from(self)
    }
}

/// Listing projection of a [`Record`] used in paginated pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub published: Option<String>,
    pub url: String,
}

impl From<&Record> for Summary {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            authors: record.authors.clone(),
            published: record.published.clone(),
            url: record.url.clone(),
        }
    }
}
