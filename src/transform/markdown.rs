//! Boilerplate-free Markdown rendering
//!
//! A single depth-first walk over the DOM. Any element matching one of the
//! exclusion selectors is skipped together with its whole subtree, so
//! nested fragments never need to be re-parsed.

use crate::transform::extract::{code_language, code_text, heading_level};
use crate::transform::table::render_table;
use crate::transform::text::{push_collapsed, tidy_inline};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Walks a document and renders its content as Markdown
pub struct MarkdownRenderer<'a> {
    exclusions: &'a [Selector],
}

impl<'a> MarkdownRenderer<'a> {
    pub fn new(exclusions: &'a [Selector]) -> Self {
        Self { exclusions }
    }

    /// Renders the `<body>` (or the whole document if there is none)
    pub fn render(&self, document: &Html) -> String {
        let root = Selector::parse("body")
            .ok()
            .and_then(|body| document.select(&body).next())
            .unwrap_or_else(|| document.root_element());

        if self.is_excluded(root) {
            return String::new();
        }

        self.render_container(root)
    }

    fn is_excluded(&self, element: ElementRef) -> bool {
        self.exclusions.iter().any(|s| s.matches(&element))
    }

    /// Renders the children of a container as blocks separated by blank lines.
    /// Loose inline content between blocks is gathered into paragraphs.
    fn render_container(&self, container: ElementRef) -> String {
        let mut blocks = Vec::new();
        let mut inline = String::new();

        for child in container.children() {
            match ElementRef::wrap(child) {
                Some(element) if is_block(element.value().name()) => {
                    flush_paragraph(&mut inline, &mut blocks);
                    if let Some(block) = self.render_block(element) {
                        blocks.push(block);
                    }
                }
                Some(element) => self.render_inline_element(element, &mut inline),
                None => {
                    if let Node::Text(text) = child.value() {
                        push_collapsed(&mut inline, text);
                    }
                }
            }
        }
        flush_paragraph(&mut inline, &mut blocks);

        blocks.join("\n\n")
    }

    fn render_block(&self, element: ElementRef) -> Option<String> {
        if self.is_excluded(element) {
            return None;
        }

        let name = element.value().name();
        let rendered = if let Some(level) = heading_level(name) {
            let text = self.render_inline_children(element).replace('\n', " ");
            if text.is_empty() {
                return None;
            }
            format!("{} {}", "#".repeat(level as usize), text)
        } else {
            match name {
                "p" => self.render_inline_children(element),
                "ul" | "ol" => self.render_list(element, 0),
                "pre" => render_code_block(element),
                "table" => render_table(element),
                "blockquote" => self.render_blockquote(element),
                "hr" => "---".to_string(),
                _ => self.render_container(element),
            }
        };

        (!rendered.trim().is_empty()).then_some(rendered)
    }

    /// Renders list items with two spaces of indent per nesting level.
    /// Nested lists are taken out of the item before its own text is read
    /// and rendered separately one level deeper.
    fn render_list(&self, list: ElementRef, depth: usize) -> String {
        let ordered = list.value().name() == "ol";
        let mut number = list
            .value()
            .attr("start")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1);
        let indent = "  ".repeat(depth);
        let mut lines = Vec::new();

        for item in list.children().filter_map(ElementRef::wrap) {
            if item.value().name() != "li" || self.is_excluded(item) {
                continue;
            }

            let mut own_text = String::new();
            let mut nested = Vec::new();
            for child in item.children() {
                match ElementRef::wrap(child) {
                    Some(el) if matches!(el.value().name(), "ul" | "ol") => nested.push(el),
                    Some(el) => self.render_inline_element(el, &mut own_text),
                    None => {
                        if let Node::Text(text) = child.value() {
                            push_collapsed(&mut own_text, text);
                        }
                    }
                }
            }

            let marker = if ordered {
                format!("{}.", number)
            } else {
                "-".to_string()
            };
            number += 1;

            let text = tidy_inline(&own_text).replace('\n', " ");
            lines.push(format!("{}{} {}", indent, marker, text).trim_end().to_string());

            for sublist in nested {
                if self.is_excluded(sublist) {
                    continue;
                }
                let rendered = self.render_list(sublist, depth + 1);
                if !rendered.is_empty() {
                    lines.push(rendered);
                }
            }
        }

        lines.join("\n")
    }

    fn render_blockquote(&self, quote: ElementRef) -> String {
        self.render_container(quote)
            .lines()
            .map(|line| format!("> {}", line).trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_inline_children(&self, element: ElementRef) -> String {
        let mut out = String::new();
        self.push_inline_children(element, &mut out);
        tidy_inline(&out)
    }

    fn push_inline_children(&self, element: ElementRef, out: &mut String) {
        for child in element.children() {
            match ElementRef::wrap(child) {
                Some(el) => self.render_inline_element(el, out),
                None => {
                    if let Node::Text(text) = child.value() {
                        push_collapsed(out, text);
                    }
                }
            }
        }
    }

    fn render_inline_element(&self, element: ElementRef, out: &mut String) {
        if self.is_excluded(element) {
            return;
        }

        let value = element.value();
        match value.name() {
            "br" => out.push('\n'),
            "code" => {
                let code: String = element.text().collect();
                let code = code.trim();
                if !code.is_empty() {
                    out.push('`');
                    out.push_str(code);
                    out.push('`');
                }
            }
            "strong" | "b" => self.wrap_inline(element, "**", out),
            "em" | "i" => self.wrap_inline(element, "*", out),
            "a" => {
                let text = self.render_inline_children(element);
                match value.attr("href") {
                    Some(href) if !text.is_empty() => {
                        out.push_str(&format!("[{}]({})", text, href.trim()));
                    }
                    _ => out.push_str(&text),
                }
            }
            "img" => {
                if let Some(src) = value.attr("src") {
                    let alt = value.attr("alt").unwrap_or("").trim();
                    out.push_str(&format!("![{}]({})", alt, src.trim()));
                }
            }
            // Blocks flattened into a line, e.g. paragraphs inside a list item
            name if is_block(name) => {
                push_collapsed(out, " ");
                self.push_inline_children(element, out);
                push_collapsed(out, " ");
            }
            _ => self.push_inline_children(element, out),
        }
    }

    fn wrap_inline(&self, element: ElementRef, marker: &str, out: &mut String) {
        let text = self.render_inline_children(element);
        if text.is_empty() {
            return;
        }
        out.push_str(marker);
        out.push_str(&text);
        out.push_str(marker);
    }
}

fn flush_paragraph(inline: &mut String, blocks: &mut Vec<String>) {
    let paragraph = tidy_inline(inline);
    if !paragraph.is_empty() {
        blocks.push(paragraph);
    }
    inline.clear();
}

fn render_code_block(pre: ElementRef) -> String {
    let code = code_text(pre);
    if code.trim().is_empty() {
        return String::new();
    }
    format!("```{}\n{}\n```", code_language(pre), code)
}

/// Elements rendered as their own block rather than as inline text
fn is_block(name: &str) -> bool {
    matches!(
        name,
        "h1" | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "p"
            | "ul"
            | "ol"
            | "pre"
            | "table"
            | "blockquote"
            | "hr"
            | "div"
            | "section"
            | "article"
            | "main"
            | "aside"
            | "header"
            | "footer"
            | "nav"
            | "figure"
            | "details"
            | "dl"
            | "form"
            | "fieldset"
    )
}
