//! Shared fixtures for integration tests

#![allow(dead_code)]

use kb_mirror::config::{
    Config, FetcherConfig, OutputConfig, SeedEntry, SiteConfig, TransformConfig, UserAgentConfig,
};
use kb_mirror::Fetcher;
use std::collections::BTreeMap;
use std::path::Path;

pub fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestMirror".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

/// Fetcher settings with millisecond backoff so retry tests stay fast
pub fn fast_fetcher_config(max_retries: u32, concurrency: u32) -> FetcherConfig {
    FetcherConfig {
        max_retries,
        concurrency,
        base_delay_ms: 1,
        timeout_secs: 5,
    }
}

pub fn fast_fetcher(max_retries: u32) -> Fetcher {
    Fetcher::from_config(&user_agent(), &fast_fetcher_config(max_retries, 2))
        .expect("Failed to build fetcher")
}

/// Configuration for a site served by a mock server at `base_url`
///
/// Everything under `/docs/hooks` maps to `hooks`, `/docs/cli` to `cli`.
pub fn test_config(base_url: &str, dir: &Path) -> Config {
    let mut sections = BTreeMap::new();
    sections.insert("hooks".to_string(), "hooks".to_string());
    sections.insert("cli".to_string(), "cli".to_string());

    Config {
        fetcher: fast_fetcher_config(1, 2),
        user_agent: user_agent(),
        site: SiteConfig {
            sitemap_url: format!("{}/sitemap.xml", base_url),
            changelog_url: None,
            allowed_hosts: vec!["127.0.0.1".to_string()],
            path_prefix: "/docs".to_string(),
            sections,
        },
        output: OutputConfig {
            knowledge_base_dir: dir.join("kb").to_string_lossy().into_owned(),
            registry_path: dir.join("state").join("registry.json").to_string_lossy().into_owned(),
            state_path: dir.join("state").join("detector.json").to_string_lossy().into_owned(),
        },
        transform: TransformConfig::default(),
        category_titles: BTreeMap::new(),
        seeds: Vec::<SeedEntry>::new(),
    }
}

/// A sitemap document listing `(path, lastmod)` pairs under `base_url`
pub fn sitemap_xml(base_url: &str, pages: &[(&str, Option<&str>)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
"#,
    );
    for (path, lastmod) in pages {
        xml.push_str(&format!("  <url>\n    <loc>{}{}</loc>\n", base_url, path));
        if let Some(lastmod) = lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        }
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// A documentation page wrapped in site chrome
pub fn doc_page(title: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{title} | Docs</title></head>
<body>
  <nav><a href="/docs">Home</a></nav>
  <main><h1>{title}</h1>{body}</main>
  <footer>Copyright</footer>
</body></html>"#
    )
}
