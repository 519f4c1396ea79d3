use url::Url;

/// Derives a filesystem-safe slug from a source URL
///
/// Uses the last non-empty path segment with any `.htm`/`.html` suffix
/// removed. Falls back to the hostname, then to `unknown`.
///
/// # Examples
///
/// ```
/// use kb_mirror::url::slugify;
///
/// assert_eq!(slugify("https://docs.example.com/docs/Getting_Started.html"), "getting-started");
/// assert_eq!(slugify("https://docs.example.com/docs/cli/"), "cli");
/// assert_eq!(slugify("https://docs.example.com/"), "docs-example-com");
/// assert_eq!(slugify("not a url"), "unknown");
/// ```
pub fn slugify(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return "unknown".to_string(),
    };

    let last_segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(strip_html_suffix)
        .map(normalize)
        .filter(|s| !s.is_empty());

    if let Some(slug) = last_segment {
        return slug;
    }

    parsed
        .host_str()
        .map(normalize)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn strip_html_suffix(segment: &str) -> &str {
    let lower = segment.to_ascii_lowercase();
    if lower.ends_with(".html") {
        &segment[..segment.len() - 5]
    } else if lower.ends_with(".htm") {
        &segment[..segment.len() - 4]
    } else {
        segment
    }
}

/// Lowercases and maps everything outside `[a-z0-9]` to single hyphens
fn normalize(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_hyphen = false;

    for c in raw.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
