//! Category assignment for documentation URLs

use crate::url::{extract_domain, matches_wildcard};
use std::collections::BTreeMap;
use url::Url;

/// Category assigned to anything the rules do not recognise
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Rules mapping a URL to a knowledge-base category
///
/// A URL is categorized only when its host matches one of `allowed_hosts`
/// and its path starts with `path_prefix`. The first two path segments
/// after the prefix are then looked up in `sections`, first as `"a/b"`
/// and then as `"a"`.
#[derive(Debug, Clone, Default)]
pub struct CategoryRules {
    pub allowed_hosts: Vec<String>,
    pub path_prefix: String,
    pub sections: BTreeMap<String, String>,
}

/// Categorizes a URL according to the rules
///
/// # Examples
///
/// ```
/// use kb_mirror::url::{categorize, CategoryRules};
/// use std::collections::BTreeMap;
///
/// let mut sections = BTreeMap::new();
/// sections.insert("cli".to_string(), "cli".to_string());
/// sections.insert("cli/reference".to_string(), "cli-reference".to_string());
///
/// let rules = CategoryRules {
///     allowed_hosts: vec!["docs.example.com".to_string()],
///     path_prefix: "/docs".to_string(),
///     sections,
/// };
///
/// assert_eq!(categorize("https://docs.example.com/docs/cli/install", &rules), "cli");
/// assert_eq!(categorize("https://docs.example.com/docs/cli/reference/run", &rules), "cli-reference");
/// assert_eq!(categorize("https://other.com/docs/cli/install", &rules), "unknown");
/// ```
pub fn categorize(url: &str, rules: &CategoryRules) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return UNKNOWN_CATEGORY.to_string(),
    };

    let host_allowed = extract_domain(&parsed)
        .map(|host| {
            rules
                .allowed_hosts
                .iter()
                .any(|pattern| matches_wildcard(&pattern.to_lowercase(), &host))
        })
        .unwrap_or(false);

    if !host_allowed {
        return UNKNOWN_CATEGORY.to_string();
    }

    let segments = match segments_after_prefix(parsed.path(), &rules.path_prefix) {
        Some(segments) => segments,
        None => return UNKNOWN_CATEGORY.to_string(),
    };

    if segments.len() >= 2 {
        let key = format!("{}/{}", segments[0], segments[1]);
        if let Some(category) = rules.sections.get(&key) {
            return category.clone();
        }
    }

    segments
        .first()
        .and_then(|first| rules.sections.get(*first))
        .cloned()
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

/// Splits the path into non-empty segments following the prefix.
/// Returns None when the path is outside the prefix.
fn segments_after_prefix<'a>(path: &'a str, prefix: &str) -> Option<Vec<&'a str>> {
    let prefix_segments: Vec<&str> = prefix.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if path_segments.len() < prefix_segments.len()
        || path_segments[..prefix_segments.len()] != prefix_segments[..]
    {
        return None;
    }

    Some(path_segments[prefix_segments.len()..].to_vec())
}
