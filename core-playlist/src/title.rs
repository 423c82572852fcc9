//! Title normalization
//!
//! Splits a raw entry title into bare title and year, and derives the base
//! title used for saga grouping.

use crate::models::NormalizedTitle;

use once_cell::sync::Lazy;
use regex::Regex;

// Years are ASCII digits only; `\d` would match other scripts.
static TRAILING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+([0-9]{4})$").expect("valid trailing year regex"));

static TRAILING_SEQUENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[0-9]+$").expect("valid sequence regex"));

static DISPLAY_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+\(([0-9]{4})\)$").expect("valid display year regex"));

/// Split `raw` into bare title and trailing four-digit year.
///
/// The year is only recognized when separated by whitespace and at the very
/// end of the text:
///
/// ```
/// use core_playlist::title::normalize;
///
/// let title = normalize("Zootopia 2016");
/// assert_eq!(title.bare_title, "Zootopia");
/// assert_eq!(title.year.as_deref(), Some("2016"));
///
/// assert_eq!(normalize("Zootopia").year, None);
/// ```
pub fn normalize(raw: &str) -> NormalizedTitle {
    match TRAILING_YEAR.captures(raw) {
        Some(captures) => {
            let whole = captures.get(0).map(|m| m.start()).unwrap_or(raw.len());
            NormalizedTitle {
                bare_title: raw[..whole].trim().to_string(),
                year: captures.get(1).map(|m| m.as_str().to_string()),
            }
        }
        None => NormalizedTitle {
            bare_title: raw.trim().to_string(),
            year: None,
        },
    }
}

/// Rewrite a trailing `" (YYYY)"` into `" YYYY"`.
///
/// Enriched playlists carry the year in parentheses; unwrapping it first keeps
/// a second run over the output stable.
pub fn unwrap_display_year(raw: &str) -> String {
    DISPLAY_YEAR.replace(raw, " $1").into_owned()
}

/// Title as searched: surrounding whitespace dropped, display year unwrapped,
/// then normalized.
pub fn search_title(raw: &str) -> NormalizedTitle {
    normalize(&unwrap_display_year(raw.trim()))
}

/// Strip a trailing whitespace + integer suffix (`"Toy Story 3"` -> `"Toy Story"`).
pub fn base_title(bare_title: &str) -> String {
    TRAILING_SEQUENCE.replace(bare_title, "").trim().to_string()
}

/// Numeric value of a four-digit year, 0 for anything else.
pub fn year_number(year: &str) -> u32 {
    if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) {
        year.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Year portion of an ISO-like release date (`"2016-02-11"` -> `"2016"`).
pub fn release_year(release_date: &str) -> Option<String> {
    let year = release_date.split('-').next().unwrap_or_default().trim();
    (year_number(year) != 0).then(|| year.to_string())
}
