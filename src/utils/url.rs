// src/utils/url.rs

//! URL construction for the listing and metadata endpoints.

use url::Url;

use crate::error::Result;

/// Build the "recent submissions" listing URL for a category.
///
/// # Examples
/// ```
/// use paperdex::utils::url::listing_url;
///
/// assert_eq!(
///     listing_url("https://arxiv.org", "cs.AI", 2000).unwrap(),
///     "https://arxiv.org/list/cs.AI/recent?skip=0&show=2000"
/// );
/// ```
pub fn listing_url(base: &str, category: &str, show: usize) -> Result<String> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(["list", category, "recent"]);
    url.query_pairs_mut()
        .append_pair("skip", "0")
        .append_pair("show", &show.to_string());
    Ok(url.to_string())
}

/// Build a metadata query URL for a batch of identifiers.
pub fn query_url(base: &str, ids: &[String]) -> Result<String> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(["api", "query"]);
    url.query_pairs_mut()
        .append_pair("id_list", &ids.join(","))
        .append_pair("max_results", &ids.len().to_string());
    Ok(url.to_string())
}

/// Extract the short identifier from an entry URL.
///
/// `http://arxiv.org/abs/2401.12345v2` -> `2401.12345v2`, and old-style
/// `http://arxiv.org/abs/math/0601001v1` -> `math/0601001v1`.
pub fn short_id(entry_url: &str) -> Option<String> {
    let trimmed = entry_url.trim();
    match trimmed.find("/abs/") {
        Some(pos) => {
            let id = &trimmed[pos + "/abs/".len()..];
            (!id.is_empty()).then(|| id.to_string())
        }
        None => None,
    }
}
