//! The persisted record index.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::Record;

/// Durable id -> record mapping.
///
/// Backed by a `BTreeMap`, so iteration (and therefore tie order when
/// sorting by date) follows id order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Index {
    #[serde(default, alias = "papers")]
    pub records: BTreeMap<String, Record>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Insert a record that is not yet present.
    ///
    /// Returns `false` and leaves the index untouched if the id already exists.
    pub fn insert_new(&mut self, record: Record) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        self.records.insert(record.id.clone(), record);
        true
    }

    /// Apply the field-level update policy to an existing entry.
    ///
    /// Returns `None` when the id is unknown, otherwise whether anything changed.
    pub fn update_existing(&mut self, incoming: &Record) -> Option<bool> {
        self.records
            .get_mut(&incoming.id)
            .map(|existing| existing.update_from(incoming))
    }

    /// Records tagged with `category`, in index order.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.values().filter(move |r| r.has_category(category))
    }

    /// Every distinct category tag present in the index.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.records
            .values()
            .flat_map(|r| r.categories.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, categories: &[&str]) -> Record {
        let mut r = Record::new(id);
        r.categories = categories.iter().map(|c| c.to_string()).collect();
        r
    }

    #[test]
    fn test_insert_new_rejects_duplicates() {
        let mut index = Index::new();
        assert!(index.insert_new(record("a", &["cs.AI"])));
        assert!(!index.insert_new(record("a", &["cs.LG"])));
        assert_eq!(index.len(), 1);
        assert!(index.get("a").unwrap().has_category("cs.AI"));
    }

    #[test]
    fn test_update_existing_unknown_id() {
        let mut index = Index::new();
        assert_eq!(index.update_existing(&record("missing", &[])), None);
    }

    #[test]
    fn test_in_category_and_categories() {
        let mut index = Index::new();
        index.insert_new(record("a", &["cs.AI", "math.ST"]));
        index.insert_new(record("b", &["cs.LG"]));
        index.insert_new(record("c", &["cs.AI"]));

        let ids: Vec<_> = index.in_category("cs.AI").map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let cats: Vec<_> = index.categories().into_iter().collect();
        assert_eq!(cats, vec!["cs.AI", "cs.LG", "math.ST"]);
    }

    #[test]
    fn test_legacy_papers_key() {
        let json = r#"{"papers": {"x": {"doi": "x", "title": "T"}}}"#;
        let index: Index = serde_json::from_str(json).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("x").unwrap().title, "T");
    }
}
