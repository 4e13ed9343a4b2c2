// src/services/search.rs
// DOCUMENTATION: City search pattern compilation
// PURPOSE: Turn a free-text city query into a location filter, or refuse it

use crate::db::ListingFilter;
use crate::errors::ListingsError;
use regex::RegexBuilder;

/// Longest query accepted before compilation is attempted
const MAX_QUERY_CHARS: usize = 200;

/// Compiled program size cap (bytes) for a single search pattern
const MAX_PATTERN_SIZE: usize = 1 << 20;

/// Build the filter for a city query
/// DOCUMENTATION: The trimmed query is treated as a case-insensitive pattern
/// matched anywhere in `location`, so "par" finds "Paris, France". An empty
/// query selects every listing. A query that cannot be compiled (bad syntax,
/// too long, too large) is a SearchError, never an empty result.
pub fn location_filter(query: Option<&str>) -> Result<ListingFilter, ListingsError> {
    let query = query.map(str::trim).unwrap_or_default();

    if query.is_empty() {
        return Ok(ListingFilter::All);
    }

    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(ListingsError::SearchError(format!(
            "query longer than {} characters",
            MAX_QUERY_CHARS
        )));
    }

    let pattern = RegexBuilder::new(query)
        .case_insensitive(true)
        .size_limit(MAX_PATTERN_SIZE)
        .build()
        .map_err(|e| {
            log::warn!("Rejected search query '{}': {}", query, e);
            ListingsError::SearchError(format!("invalid search query '{}'", query))
        })?;

    Ok(ListingFilter::LocationMatches(pattern))
}
