//! Content transformer
//!
//! Turns one fetched HTML document into structured fields plus a clean
//! Markdown body. Both halves always work on the same parsed document:
//! - Structured extraction sees the full page, boilerplate included
//! - Markdown rendering skips every region matched by the exclusion list
//!
//! Transformation never fails; missing fields come back empty.

mod extract;
pub mod frontmatter;
mod markdown;
mod table;
mod text;

pub use frontmatter::{render_frontmatter, split_frontmatter, FrontMatter};
pub use markdown::MarkdownRenderer;
pub use table::render_table;

use scraper::{Html, Selector};
use std::collections::BTreeMap;

/// Selectors for page regions that never belong in the knowledge base
pub const DEFAULT_BOILERPLATE: &[&str] = &[
    "nav",
    "header",
    "footer",
    ".sidebar",
    "#sidebar",
    ".cookie-banner",
    "#cookie-banner",
    ".cookie-consent",
    "[role=navigation]",
    "[role=banner]",
    "[role=contentinfo]",
    "script",
    "style",
    "noscript",
];

/// A heading and its level (1-6)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// A `<pre>` block; `language` is empty when unknown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub content: String,
}

/// Everything extracted from one document
#[derive(Debug, Clone, Default)]
pub struct ParsedContent {
    pub title: String,
    pub description: String,
    pub headings: Vec<Heading>,
    /// Rendered body, preceded by the front-matter block when there is one
    pub markdown: String,
    pub code_blocks: Vec<CodeBlock>,
    pub tables: Vec<String>,
    pub links: Vec<String>,
    pub metadata: BTreeMap<String, String>,
    pub frontmatter: Option<FrontMatter>,
}

/// Options for the Markdown renderer
#[derive(Debug, Clone)]
pub struct TransformOptions {
    boilerplate: Vec<Selector>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        let selectors: Vec<String> = DEFAULT_BOILERPLATE.iter().map(|s| s.to_string()).collect();
        Self::with_boilerplate(&selectors)
    }
}

impl TransformOptions {
    /// Builds options from CSS selectors; selectors that do not parse are skipped
    pub fn with_boilerplate(selectors: &[String]) -> Self {
        let boilerplate = selectors
            .iter()
            .filter_map(|css| match Selector::parse(css) {
                Ok(selector) => Some(selector),
                Err(e) => {
                    tracing::warn!("Ignoring invalid boilerplate selector '{}': {}", css, e);
                    None
                }
            })
            .collect();

        Self { boilerplate }
    }

    /// Number of active exclusion selectors
    pub fn boilerplate_len(&self) -> usize {
        self.boilerplate.len()
    }
}

/// Parses raw page content into structured fields and Markdown
///
/// A leading `---` front-matter block is split off before HTML parsing and
/// written back ahead of the Markdown body.
///
/// # Example
///
/// ```
/// use kb_mirror::transform::{parse_content, TransformOptions};
///
/// let html = r#"<html><body><nav>Menu</nav><h2>Intro</h2><p>Hello <b>there</b></p></body></html>"#;
/// let parsed = parse_content(html, &TransformOptions::default());
/// assert_eq!(parsed.markdown, "## Intro\n\nHello **there**");
/// assert_eq!(parsed.title, "");
/// ```
pub fn parse_content(raw: &str, options: &TransformOptions) -> ParsedContent {
    let (frontmatter, html) = match split_frontmatter(raw) {
        Some((fields, rest)) => (Some(fields), rest),
        None => (None, raw),
    };

    let document = Html::parse_document(html);

    let body = MarkdownRenderer::new(&options.boilerplate).render(&document);
    let markdown = match &frontmatter {
        Some(fields) => format!("{}\n{}", render_frontmatter(fields), body),
        None => body,
    };

    ParsedContent {
        title: extract::extract_title(&document),
        description: extract::extract_description(&document),
        headings: extract::extract_headings(&document),
        markdown,
        code_blocks: extract::extract_code_blocks(&document),
        tables: extract::extract_tables(&document),
        links: extract::extract_links(&document),
        metadata: extract::extract_metadata(&document),
        frontmatter,
    }
}
