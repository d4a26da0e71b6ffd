//! Category paginator.
//!
//! Pages are recomputed in full from the index snapshot on every run; there
//! is no append or delta mode.

use crate::error::{AppError, Result};
use crate::models::{Index, Page, Record, Summary};
use crate::storage::IndexStorage;
use crate::utils::{page_count, sort_newest_first};

/// Summaries of every record in `category`, newest first.
///
/// Records without a publication date sort last. Equal dates keep index
/// (id) order.
pub fn category_summaries(category: &str, index: &Index) -> Vec<Summary> {
    let mut summaries: Vec<Summary> = index.in_category(category).map(Record::to_summary).collect();
    sort_newest_first(&mut summaries, |s| s.published.as_deref().unwrap_or(""));
    summaries
}

/// Split an already ordered sequence into pages of `page_size`.
pub fn paginate<T: Clone>(items: &[T], page_size: usize) -> Result<Vec<Vec<T>>> {
    if page_size == 0 {
        return Err(AppError::validation("page_size must be > 0"));
    }
    let pages: Vec<Vec<T>> = items.chunks(page_size).map(<[T]>::to_vec).collect();
    debug_assert_eq!(pages.len(), page_count(items.len(), page_size));
    Ok(pages)
}

/// Derive the summary pages for `category` from the index.
pub fn build_pages(category: &str, index: &Index, page_size: usize) -> Result<Vec<Page>> {
    paginate(&category_summaries(category, index), page_size)
}

/// Rebuild and persist the summary pages of one category.
///
/// Returns the number of pages (0 when no record carries the tag).
pub async fn write_category_pages(
    storage: &dyn IndexStorage,
    category: &str,
    index: &Index,
    page_size: usize,
) -> Result<usize> {
    let pages = build_pages(category, index, page_size)?;
    let count = storage.write_category_pages(category, &pages).await?;
    if count > 0 {
        log::info!("Built {} pages for category {}", count, category);
    }
    Ok(count)
}
