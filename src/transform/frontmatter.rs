use serde_json::Value;
use std::collections::BTreeMap;

/// Key/value metadata from a `---` delimited block
pub type FrontMatter = BTreeMap<String, Value>;

/// Splits a leading YAML front-matter block from a document
///
/// Returns the parsed mapping and the remainder of the document. Returns
/// `None` when there is no closed `---` block, when the YAML does not parse,
/// or when it parses to something other than a mapping.
pub fn split_frontmatter(input: &str) -> Option<(FrontMatter, &str)> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let rest = input.trim_start().strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let fields = parse_yaml_mapping(&rest[..offset])?;
            return Some((fields, &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

/// Serializes front matter back into a `---` delimited block ending in a newline
pub fn render_frontmatter(fields: &FrontMatter) -> String {
    match serde_yaml::to_string(fields) {
        Ok(yaml) if !fields.is_empty() => format!("---\n{}---\n", yaml),
        _ => "---\n---\n".to_string(),
    }
}

fn parse_yaml_mapping(yaml: &str) -> Option<FrontMatter> {
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml).ok()?;
    let json_value: Value = serde_json::to_value(yaml_value).ok()?;

    match json_value {
        Value::Object(map) => Some(map.into_iter().collect()),
        _ => None,
    }
}
