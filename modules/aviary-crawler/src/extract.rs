//! Pure normalization of raw API fields. No side effects, no I/O.

use scraper::Html;
use thiserror::Error;

use aviary_common::DateParts;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// Timestamp shorter than the fixed-width layout requires.
    #[error("Malformed timestamp: {0:?}")]
    MalformedTimestamp(String),
}

/// Strip markup from the post "source" field, keeping visible text only.
///
/// The field arrives as an HTML anchor (`<a href="...">Client App</a>`) and
/// is third-party controlled; it is parsed as an inert fragment, never
/// interpreted.
pub fn normalize_source(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

/// The one timezone abbreviation that is a letter shorter than the rest of
/// the crawl's corpus, shifting the year field left by one column.
const SHORT_TZ: &str = "CET";

/// Shortest well-formed timestamp: "Mon Apr 01 12:30:45 CET 2019".
const MIN_TIMESTAMP_LEN: usize = 28;

/// Split a fixed-width timestamp into day / month / year.
///
/// Layout: weekday at 0..3, month at 4..7, day at 8..10, clock time at
/// 11..19, timezone abbreviation from 20. The 3-letter `CET` abbreviation
/// puts the year at 24..28; the 4-letter summer form (`CEST`) at 25..29.
/// Reading the wrong column silently yields a garbage year, so the branch
/// is on the abbreviation itself.
///
/// Errors with [`ExtractError::MalformedTimestamp`] when the string is too
/// short for the required columns; callers treat that as non-fatal and skip
/// date-linking for the one affected record.
pub fn split_date(raw: &str) -> Result<DateParts, ExtractError> {
    if raw.len() < MIN_TIMESTAMP_LEN {
        return Err(ExtractError::MalformedTimestamp(raw.to_string()));
    }

    let malformed = || ExtractError::MalformedTimestamp(raw.to_string());

    let month = raw.get(4..7).ok_or_else(malformed)?;
    let day = raw.get(8..10).ok_or_else(malformed)?;

    let year = if raw.get(20..23) == Some(SHORT_TZ) && raw.as_bytes().get(23) == Some(&b' ') {
        raw.get(24..28).ok_or_else(malformed)?
    } else {
        raw.get(25..29).ok_or_else(malformed)?
    };

    Ok(DateParts {
        day: day.to_string(),
        month: month.to_string(),
        year: year.to_string(),
    })
}
