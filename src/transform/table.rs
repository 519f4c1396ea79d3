use crate::transform::text::collapse_whitespace;
use scraper::{ElementRef, Selector};

/// Renders a `<table>` as a pipe-delimited Markdown table
///
/// The first row becomes the header. Rows shorter than the widest row are
/// padded with empty cells. Tables without cells render as an empty string.
pub fn render_table(table: ElementRef) -> String {
    let Ok(row_selector) = Selector::parse("tr") else {
        return String::new();
    };

    let rows: Vec<Vec<String>> = table
        .select(&row_selector)
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "th" | "td"))
                .map(cell_text)
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (i, row) in rows.iter().enumerate() {
        let mut cells = row.clone();
        cells.resize(width, String::new());
        lines.push(format!("| {} |", cells.join(" | ")));

        if i == 0 {
            lines.push(format!("|{}", " --- |".repeat(width)));
        }
    }

    lines.join("\n")
}

fn cell_text(cell: ElementRef) -> String {
    collapse_whitespace(&cell.text().collect::<String>()).replace('|', "\\|")
}
