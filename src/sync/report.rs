//! Sync run summary

use crate::detector::{ChangeDetectorResult, ChangelogCheck};
use crate::fetcher::CrawlError;

/// What a sync run did
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// URL deltas from change detection
    pub changes: ChangeDetectorResult,

    pub changelog: Option<ChangelogCheck>,

    /// `(category, slug)` of every entry written
    pub written: Vec<(String, String)>,

    /// URLs that could not be fetched or stored
    pub failed: Vec<CrawlError>,

    /// URLs retired because they left the sitemap
    pub stale_marked: Vec<String>,
}

impl SyncReport {
    pub fn new(changes: ChangeDetectorResult, changelog: Option<ChangelogCheck>) -> Self {
        Self {
            changes,
            changelog,
            written: Vec::new(),
            failed: Vec::new(),
            stale_marked: Vec::new(),
        }
    }

    /// Returns true if every fetched URL made it into the knowledge base
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Formats the report as a short markdown summary
    pub fn to_markdown(&self) -> String {
        let mut md = String::from("## Sync Summary\n\n");

        md.push_str(&format!("- **Run At**: {}\n", self.changes.timestamp.to_rfc3339()));
        md.push_str(&format!("- **New URLs**: {}\n", self.changes.new_urls.len()));
        md.push_str(&format!(
            "- **Modified URLs**: {}\n",
            self.changes.modified_urls.len()
        ));
        md.push_str(&format!("- **Removed URLs**: {}\n", self.stale_marked.len()));
        md.push_str(&format!("- **Entries Written**: {}\n", self.written.len()));
        md.push_str(&format!("- **Failures**: {}\n", self.failed.len()));

        if let Some(check) = &self.changelog {
            md.push_str(&format!(
                "- **Changelog**: {}{}\n",
                if check.has_new_entries {
                    "new entries"
                } else {
                    "no new entries"
                },
                check
                    .latest_timestamp
                    .as_deref()
                    .map(|ts| format!(" (latest {})", ts))
                    .unwrap_or_default()
            ));
        }

        if !self.failed.is_empty() {
            md.push_str("\n### Failures\n\n");
            for failure in &self.failed {
                md.push_str(&format!(
                    "- {} ({} retries): {}\n",
                    failure.url, failure.retry_count, failure.error
                ));
            }
        }

        md
    }
}
