// src/services/listing.rs

//! Identifier extraction from category listing pages.

use std::collections::HashSet;

use scraper::{Html, Selector};

use crate::error::{AppError, Result};

/// Each listing entry is a `<dt>` whose abstract link carries the identifier in `id`.
const ABSTRACT_LINK_SELECTOR: &str = r#"#articles > dt a[title="Abstract"]"#;

/// Extract paper identifiers from a listing page, in page order, without repeats.
pub fn extract_ids(html: &str) -> Result<Vec<String>> {
    let selector = parse_selector(ABSTRACT_LINK_SELECTOR)?;
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let ids = document
        .select(&selector)
        .filter_map(|link| link.value().attr("id"))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(String::from)
        .collect();
    Ok(ids)
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
