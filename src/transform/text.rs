/// Collapses every whitespace run into one space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Appends text to an inline buffer, turning whitespace runs into single
/// spaces while keeping a boundary space between adjacent nodes
pub fn push_collapsed(out: &mut String, text: &str) {
    let mut last_was_space = out.ends_with(' ') || out.ends_with('\n') || out.is_empty();

    for c in text.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
}

/// Cleans an inline buffer into final paragraph text: each line is
/// whitespace-collapsed and blank lines at either end are dropped
pub fn tidy_inline(text: &str) -> String {
    let lines: Vec<String> = text.split('\n').map(collapse_whitespace).collect();
    lines.join("\n").trim_matches('\n').to_string()
}
