//! Change detection
//!
//! One detection run compares the site's sitemap against the URL registry
//! and optionally scans a changelog page for new dates:
//! - New sitemap URLs are added to the registry
//! - Listed URLs with a newer `lastmod` are reported as modified
//! - Sitemap-sourced URLs that disappeared are reported as removed
//! - Stale or failed entries that are still listed become active again
//!
//! A failed sitemap fetch is not an error: the run reports no changes,
//! returns the registry as it was, and still records that it happened.

mod changelog;
mod reconcile;
mod sitemap;
mod state;

pub use changelog::{check_changelog, extract_dates, ChangelogCheck};
pub use reconcile::{diff_registry, RegistryDiff};
pub use sitemap::{parse_sitemap, SitemapEntry};
pub use state::ChangeDetectorState;

use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::registry::Registry;
use crate::url::CategoryRules;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// URL deltas found by one run; the three lists never share a URL
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDetectorResult {
    pub new_urls: Vec<String>,
    pub modified_urls: Vec<String>,
    pub removed_urls: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChangeDetectorResult {
    /// A result with no changes
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            new_urls: Vec::new(),
            modified_urls: Vec::new(),
            removed_urls: Vec::new(),
            timestamp,
        }
    }

    pub fn has_changes(&self) -> bool {
        !(self.new_urls.is_empty() && self.modified_urls.is_empty() && self.removed_urls.is_empty())
    }
}

/// Everything a detection run produces
#[derive(Debug, Clone)]
pub struct Detection {
    pub result: ChangeDetectorResult,

    /// Input registry with newly discovered URLs added and listed entries
    /// reactivated
    pub registry: Registry,

    /// Stale or failed URLs that the sitemap still lists
    pub reactivated_urls: Vec<String>,

    /// Parsed sitemap entries; empty when the sitemap was unavailable
    pub sitemap: Vec<SitemapEntry>,

    /// `None` when no changelog is configured or it could not be fetched
    pub changelog: Option<ChangelogCheck>,
}

impl Detection {
    /// The sitemap `lastmod` listed for `url`, if any
    pub fn sitemap_lastmod(&self, url: &str) -> Option<&str> {
        self.sitemap
            .iter()
            .find(|entry| entry.url == url)
            .and_then(|entry| entry.lastmod.as_deref())
    }

    /// Sitemap `lastmod` values keyed by URL, for lookups over many pages.
    /// A URL listed twice keeps its first entry.
    pub fn sitemap_lastmods(&self) -> HashMap<&str, Option<&str>> {
        let mut lastmods = HashMap::with_capacity(self.sitemap.len());
        for entry in &self.sitemap {
            lastmods
                .entry(entry.url.as_str())
                .or_insert(entry.lastmod.as_deref());
        }
        lastmods
    }
}

/// Detects changes between runs using a sitemap and an optional changelog
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    fetcher: Fetcher,
    sitemap_url: String,
    changelog_url: Option<String>,
    rules: CategoryRules,
    state_path: PathBuf,
    max_retries: u32,
}

impl ChangeDetector {
    /// Creates a detector with no changelog and the fetcher's retry budget
    pub fn new(
        fetcher: Fetcher,
        sitemap_url: impl Into<String>,
        rules: CategoryRules,
        state_path: impl Into<PathBuf>,
    ) -> Self {
        let max_retries = fetcher.policy().max_retries;
        Self {
            fetcher,
            sitemap_url: sitemap_url.into(),
            changelog_url: None,
            rules,
            state_path: state_path.into(),
            max_retries,
        }
    }

    /// Creates a detector from the `[site]` and `[output]` configuration
    pub fn from_config(config: &Config, fetcher: Fetcher) -> Self {
        Self::new(
            fetcher,
            &config.site.sitemap_url,
            config.category_rules(),
            &config.output.state_path,
        )
        .with_changelog(config.site.changelog_url.clone())
    }

    pub fn with_changelog(mut self, changelog_url: Option<String>) -> Self {
        self.changelog_url = changelog_url;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Runs one detection pass against `registry`
    ///
    /// The persisted state is loaded at the start and written back at the
    /// end, whether or not the network calls succeeded. Failures to persist
    /// are logged and otherwise ignored.
    pub async fn run(&self, registry: &Registry) -> Detection {
        let mut state = ChangeDetectorState::load(&self.state_path);
        let timestamp = Utc::now();

        let (result, registry, reactivated_urls, sitemap) = match self
            .fetcher
            .fetch_with_retry(&self.sitemap_url, self.max_retries)
            .await
        {
            Ok(page) => {
                let entries = parse_sitemap(&page.html);
                tracing::info!("Sitemap lists {} URLs", entries.len());

                let diff = diff_registry(&entries, registry, &self.rules);
                state.known_urls = unique_urls(&entries);

                tracing::info!(
                    "Detected {} new, {} modified, {} removed URLs",
                    diff.new_urls.len(),
                    diff.modified_urls.len(),
                    diff.removed_urls.len()
                );
                if !diff.reactivated_urls.is_empty() {
                    tracing::info!(
                        "Reactivated {} stale or failed URLs still in the sitemap",
                        diff.reactivated_urls.len()
                    );
                }

                let result = ChangeDetectorResult {
                    new_urls: diff.new_urls,
                    modified_urls: diff.modified_urls,
                    removed_urls: diff.removed_urls,
                    timestamp,
                };
                (result, diff.registry, diff.reactivated_urls, entries)
            }
            Err(e) => {
                tracing::warn!("Sitemap unavailable, reporting no changes: {}", e);
                (
                    ChangeDetectorResult::empty(timestamp),
                    registry.clone(),
                    Vec::new(),
                    Vec::new(),
                )
            }
        };

        let changelog = match &self.changelog_url {
            Some(url) => self.check_changelog(url, &mut state).await,
            None => None,
        };

        state.last_run = Some(timestamp);
        if let Err(e) = state.save(&self.state_path) {
            tracing::warn!(
                "Failed to save detector state to {}: {}",
                self.state_path.display(),
                e
            );
        }

        Detection {
            result,
            registry,
            reactivated_urls,
            sitemap,
            changelog,
        }
    }

    async fn check_changelog(
        &self,
        url: &str,
        state: &mut ChangeDetectorState,
    ) -> Option<ChangelogCheck> {
        let page = match self.fetcher.fetch_with_retry(url, self.max_retries).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Changelog unavailable: {}", e);
                return None;
            }
        };

        let check = check_changelog(&page.html, state.last_changelog_timestamp.as_deref());
        if check.has_new_entries {
            tracing::info!(
                "Changelog has entries newer than {}",
                state.last_changelog_timestamp.as_deref().unwrap_or("the last run")
            );
            state.last_changelog_timestamp = check.latest_timestamp.clone();
        }

        Some(check)
    }
}

fn unique_urls(entries: &[SitemapEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| seen.insert(entry.url.as_str()))
        .map(|entry| entry.url.clone())
        .collect()
}
