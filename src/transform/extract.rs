//! Structured field extraction
//!
//! Runs against the complete document, boilerplate included, so that links
//! and metadata living in navigation or footers are still captured.

use crate::transform::table::render_table;
use crate::transform::text::collapse_whitespace;
use crate::transform::{CodeBlock, Heading};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Page title: `og:title`, then the first `<h1>`, then `<title>`
pub fn extract_title(document: &Html) -> String {
    meta_content(document, "meta[property='og:title']")
        .or_else(|| first_text(document, "h1"))
        .or_else(|| first_text(document, "title"))
        .unwrap_or_default()
}

/// Page description: `og:description`, then `<meta name="description">`
pub fn extract_description(document: &Html) -> String {
    meta_content(document, "meta[property='og:description']")
        .or_else(|| meta_content(document, "meta[name='description']"))
        .unwrap_or_default()
}

/// All headings with non-empty text, in document order
pub fn extract_headings(document: &Html) -> Vec<Heading> {
    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let level = heading_level(element.value().name())?;
            let text = collapse_whitespace(&element.text().collect::<String>());
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .collect()
}

/// All `<pre>` code blocks with their languages
pub fn extract_code_blocks(document: &Html) -> Vec<CodeBlock> {
    let Ok(selector) = Selector::parse("pre") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(|pre| CodeBlock {
            language: code_language(pre),
            content: code_text(pre),
        })
        .collect()
}

/// All tables rendered as Markdown
pub fn extract_tables(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("table") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .map(render_table)
        .filter(|table| !table.is_empty())
        .collect()
}

/// Every anchor href, as written in the page
pub fn extract_links(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect()
}

/// Every `<meta>` name/property paired with its content
pub fn extract_metadata(document: &Html) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    let Ok(selector) = Selector::parse("meta[content]") else {
        return metadata;
    };

    for meta in document.select(&selector) {
        let element = meta.value();
        let Some(content) = element.attr("content") else {
            continue;
        };

        for key in [element.attr("name"), element.attr("property")]
            .into_iter()
            .flatten()
        {
            metadata.insert(key.to_string(), content.trim().to_string());
        }
    }

    metadata
}

/// Resolves the language of a `<pre>` block
///
/// Checks the inner `<code>` for a `language-xxx` or `lang-xxx` class, then
/// a `data-language` attribute on the code element or the `<pre>` itself.
pub(crate) fn code_language(pre: ElementRef) -> String {
    let code = inner_code(pre);

    if let Some(code) = code {
        for class in code.value().classes() {
            if let Some(lang) = class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
            {
                if !lang.is_empty() {
                    return lang.to_string();
                }
            }
        }
    }

    code.and_then(|c| c.value().attr("data-language"))
        .or_else(|| pre.value().attr("data-language"))
        .map(|lang| lang.trim().to_string())
        .unwrap_or_default()
}

/// Text of a `<pre>` block, taken from its `<code>` child when present
pub(crate) fn code_text(pre: ElementRef) -> String {
    let source = inner_code(pre).unwrap_or(pre);
    source
        .text()
        .collect::<String>()
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

pub(crate) fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn inner_code(pre: ElementRef) -> Option<ElementRef> {
    let selector = Selector::parse("code").ok()?;
    pre.select(&selector).next()
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .find(|text| !text.is_empty())
}
