//! Filesystem knowledge base: `{base}/{category}/{slug}.md`

use crate::knowledge::index::{format_index, IndexSection};
use crate::knowledge::{KnowledgeBaseEntry, KnowledgeStore, StoreError, StoreResult};
use crate::transform::{split_frontmatter, FrontMatter};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the generated index file in the base directory
pub const INDEX_FILE: &str = "index.md";

/// Header written at the top of each entry file
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryHeader<'a> {
    title: &'a str,
    source_url: &'a str,
    category: &'a str,
    last_updated: String,
}

/// Knowledge base stored as Markdown files under one directory
#[derive(Debug, Clone)]
pub struct MarkdownStore {
    base_dir: PathBuf,
    category_titles: BTreeMap<String, String>,
}

impl MarkdownStore {
    /// Creates a store rooted at `base_dir`. The directory is created lazily
    /// on the first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            category_titles: BTreeMap::new(),
        }
    }

    /// Sets display titles for index sections, keyed by category
    pub fn with_category_titles(mut self, titles: BTreeMap<String, String>) -> Self {
        self.category_titles = titles;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file holding `(category, slug)`
    pub fn entry_path(&self, category: &str, slug: &str) -> PathBuf {
        self.base_dir.join(category).join(format!("{}.md", slug))
    }

    fn format_entry(entry: &KnowledgeBaseEntry) -> StoreResult<String> {
        let header = EntryHeader {
            title: &entry.title,
            source_url: &entry.source_url,
            category: &entry.category,
            last_updated: entry.last_updated.to_rfc3339(),
        };
        let yaml =
            serde_yaml::to_string(&header).map_err(|e| StoreError::Serialization(e.to_string()))?;

        Ok(format!("---\n{}---\n\n{}", yaml, entry.content))
    }

    fn parse_entry(category: &str, slug: &str, raw: &str) -> KnowledgeBaseEntry {
        let (fields, body) = match split_frontmatter(raw) {
            Some((fields, rest)) => (fields, rest.strip_prefix('\n').unwrap_or(rest)),
            None => (FrontMatter::new(), raw),
        };

        let field = |key: &str| fields.get(key).and_then(Value::as_str);

        KnowledgeBaseEntry {
            slug: slug.to_string(),
            category: category.to_string(),
            title: field("title").unwrap_or(slug).to_string(),
            content: body.to_string(),
            source_url: field("sourceUrl").unwrap_or_default().to_string(),
            last_updated: field("lastUpdated")
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.with_timezone(&Utc))
                .unwrap_or_default(),
        }
    }
}

impl KnowledgeStore for MarkdownStore {
    fn write(&self, entry: &KnowledgeBaseEntry) -> StoreResult<()> {
        let path = self.entry_path(&entry.category, &entry.slug);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        fs::write(&path, Self::format_entry(entry)?)?;
        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn read(&self, category: &str, slug: &str) -> StoreResult<Option<KnowledgeBaseEntry>> {
        match fs::read_to_string(self.entry_path(category, slug)) {
            Ok(raw) => Ok(Some(Self::parse_entry(category, slug, &raw))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> StoreResult<BTreeMap<String, Vec<String>>> {
        let mut categories = BTreeMap::new();

        let dirs = match fs::read_dir(&self.base_dir) {
            Ok(dirs) => dirs,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(categories),
            Err(e) => return Err(e.into()),
        };

        for dir in dirs {
            let dir = dir?;
            if !dir.file_type()?.is_dir() {
                continue;
            }
            let Some(category) = dir.file_name().to_str().map(str::to_string) else {
                continue;
            };

            let mut slugs = Vec::new();
            for file in fs::read_dir(dir.path())? {
                let path = file?.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    slugs.push(stem.to_string());
                }
            }
            slugs.sort();

            categories.insert(category, slugs);
        }

        Ok(categories)
    }

    fn update_index(&self) -> StoreResult<()> {
        let mut sections = Vec::new();

        for (category, slugs) in self.list()? {
            let mut links = Vec::with_capacity(slugs.len());
            for slug in slugs {
                let title = self
                    .read(&category, &slug)?
                    .map(|entry| entry.title)
                    .unwrap_or_else(|| slug.clone());
                links.push((title, slug));
            }

            sections.push(IndexSection {
                title: self.category_titles.get(&category).cloned(),
                category,
                links,
            });
        }

        fs::create_dir_all(&self.base_dir)?;
        let path = self.base_dir.join(INDEX_FILE);
        fs::write(&path, format_index(&sections))?;

        tracing::info!("Regenerated {} with {} categories", path.display(), sections.len());
        Ok(())
    }
}
