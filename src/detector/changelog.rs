//! Changelog date scanning

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("date pattern is valid"));

/// Outcome of scanning a changelog page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogCheck {
    /// True when the newest date is later than the previous check
    pub has_new_entries: bool,

    /// Newest `YYYY-MM-DD` date on the page, if any
    pub latest_timestamp: Option<String>,
}

/// Returns every `YYYY-MM-DD` substring in the page, deduplicated and newest first
pub fn extract_dates(html: &str) -> Vec<String> {
    let dates: BTreeSet<&str> = DATE_PATTERN.find_iter(html).map(|m| m.as_str()).collect();
    dates.into_iter().rev().map(str::to_string).collect()
}

/// Compares the newest date in a changelog page against the last seen one
///
/// Dates compare as strings, which orders `YYYY-MM-DD` chronologically.
///
/// # Example
///
/// ```
/// use kb_mirror::detector::check_changelog;
///
/// let check = check_changelog("<li>2024-02-01</li><li>2024-03-15</li>", Some("2024-02-01"));
/// assert!(check.has_new_entries);
/// assert_eq!(check.latest_timestamp.as_deref(), Some("2024-03-15"));
/// ```
pub fn check_changelog(html: &str, since: Option<&str>) -> ChangelogCheck {
    let latest = extract_dates(html).into_iter().next();

    let has_new_entries = match (&latest, since) {
        (Some(latest), Some(since)) => latest.as_str() > since,
        (Some(_), None) => true,
        (None, _) => false,
    };

    ChangelogCheck {
        has_new_entries,
        latest_timestamp: latest,
    }
}
