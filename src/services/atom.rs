// src/services/atom.rs

//! Atom feed parsing for the metadata query API.
//!
//! The feed is run through the HTML5 parser rather than a strict XML parser.
//! Self-closing unknown elements such as `<category/>` end up nested inside
//! each other, which is harmless because every lookup below is a descendant
//! selector scoped to one `<entry>`.

use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::Record;
use crate::services::listing::parse_selector;
use crate::utils::url::short_id;

struct FeedSelectors {
    entry: Selector,
    id: Selector,
    title: Selector,
    summary: Selector,
    published: Selector,
    author_name: Selector,
    category: Selector,
}

impl FeedSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            entry: parse_selector("entry")?,
            id: parse_selector("id")?,
            title: parse_selector("title")?,
            summary: parse_selector("summary")?,
            published: parse_selector("published")?,
            author_name: parse_selector("author name")?,
            category: parse_selector("category[term]")?,
        })
    }
}

/// Parse every `<entry>` of a feed into a record.
///
/// Entries without a recognizable identifier (the API reports bad ids as
/// pseudo-entries) are skipped with a warning.
pub fn parse_feed(xml: &str) -> Result<Vec<Record>> {
    let selectors = FeedSelectors::new()?;
    let document = Html::parse_document(xml);

    let mut records = Vec::new();
    for entry in document.select(&selectors.entry) {
        match parse_entry(&entry, &selectors) {
            Some(record) => records.push(record),
            None => log::warn!(
                "Skipping feed entry without a usable id: {}",
                first_text(&entry, &selectors.title).unwrap_or_default()
            ),
        }
    }
    Ok(records)
}

fn parse_entry(entry: &ElementRef, selectors: &FeedSelectors) -> Option<Record> {
    let entry_url = first_text(entry, &selectors.id)?;
    let id = short_id(&entry_url)?;

    let mut record = Record::new(id);
    record.url = entry_url;
    record.title = first_text(entry, &selectors.title)
        .map(|t| normalize_whitespace(&t))
        .unwrap_or_default();
    record.summary = first_text(entry, &selectors.summary)
        .map(|s| s.trim().replace('\n', " "))
        .unwrap_or_default();
    record.published = first_text(entry, &selectors.published).and_then(|p| date_part(&p));
    record.authors = entry
        .select(&selectors.author_name)
        .map(|name| normalize_whitespace(&name.text().collect::<String>()))
        .filter(|name| !name.is_empty())
        .collect();
    record.categories = entry
        .select(&selectors.category)
        .filter_map(|c| c.value().attr("term"))
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty())
        .collect();
    record.dedup_categories();

    Some(record)
}

fn first_text(entry: &ElementRef, selector: &Selector) -> Option<String> {
    entry
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// `2024-01-02T18:00:00Z` -> `2024-01-02`
fn date_part(timestamp: &str) -> Option<String> {
    let date = timestamp.trim().get(..10)?;
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|_| date.to_string())
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
