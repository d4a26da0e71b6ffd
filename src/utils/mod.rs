//! Utility functions and helpers.

pub mod http;
pub mod log;
pub mod url;

use chrono::Local;

/// Make an identifier safe for use as a file name.
///
/// Every character except ASCII/Unicode alphanumerics, `-` and `_` becomes `_`.
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Directory segment for a category tag.
///
/// Category tags are used verbatim (`cs.AI`), except that path separators and
/// parent-directory references cannot escape the output root.
pub fn category_dir(category: &str) -> String {
    let segment = category.replace(['/', '\\'], "_");
    if segment == "." || segment == ".." || segment.is_empty() {
        return "_".repeat(segment.len().max(1));
    }
    segment
}

/// Stable newest-first sort by a `YYYY-MM-DD` key.
///
/// Items with equal keys keep their relative order; items without a date should
/// map to `""` so they collect at the end.
pub fn sort_newest_first<T>(items: &mut [T], key: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| key(b).cmp(key(a)));
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Number of pages needed for `count` items.
pub fn page_count(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size)
}
