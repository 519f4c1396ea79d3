/// Checks if a host matches an allow-list pattern
///
/// "docs.example.com" matches only itself. "*.example.com" matches
/// "example.com" and any subdomain of it. Both sides are expected to be
/// lowercase already.
///
/// # Examples
///
/// ```
/// use kb_mirror::url::matches_wildcard;
///
/// assert!(matches_wildcard("docs.example.com", "docs.example.com"));
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "api.docs.example.com"));
/// assert!(!matches_wildcard("*.example.com", "example.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => candidate == base || candidate.ends_with(&format!(".{}", base)),
        None => candidate == pattern,
    }
}
