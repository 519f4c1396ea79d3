//! Index page generation

/// One category section of the index
#[derive(Debug, Clone)]
pub(crate) struct IndexSection {
    pub category: String,
    /// Configured display title, if any
    pub title: Option<String>,
    /// `(entry title, slug)` pairs in display order
    pub links: Vec<(String, String)>,
}

/// Formats the knowledge base index as markdown
///
/// Categories without a configured title are shown title-cased. Sections
/// with no entries are left out.
pub(crate) fn format_index(sections: &[IndexSection]) -> String {
    let mut md = String::from("# Knowledge Base\n");

    for section in sections.iter().filter(|s| !s.links.is_empty()) {
        let title = section
            .title
            .clone()
            .unwrap_or_else(|| title_case(&section.category));

        md.push_str(&format!("\n## {}\n\n", title));
        for (entry_title, slug) in &section.links {
            md.push_str(&format!(
                "- [{}]({}/{}.md)\n",
                escape_link_text(entry_title),
                section.category,
                slug
            ));
        }
    }

    md
}

/// Turns `getting-started` or `steering_files` into `Getting Started` / `Steering Files`
pub fn title_case(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("getting-started"), "Getting Started");
        assert_eq!(title_case("steering_files"), "Steering Files");
        assert_eq!(title_case("cli"), "Cli");
        assert_eq!(title_case("--x--"), "X");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_format_index() {
        let sections = vec![
            IndexSection {
                category: "cli".to_string(),
                title: Some("Command Line".to_string()),
                links: vec![("Install [beta]".to_string(), "install".to_string())],
            },
            IndexSection {
                category: "empty".to_string(),
                title: None,
                links: vec![],
            },
            IndexSection {
                category: "hooks".to_string(),
                title: None,
                links: vec![
                    ("Agent Hooks".to_string(), "agent-hooks".to_string()),
                    ("Triggers".to_string(), "triggers".to_string()),
                ],
            },
        ];

        assert_eq!(
            format_index(&sections),
            "# Knowledge Base\n\
             \n## Command Line\n\n- [Install \\[beta\\]](cli/install.md)\n\
             \n## Hooks\n\n- [Agent Hooks](hooks/agent-hooks.md)\n- [Triggers](hooks/triggers.md)\n"
        );
    }
}
