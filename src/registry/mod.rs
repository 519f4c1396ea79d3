//! URL registry
//!
//! The set of known documentation URLs with their category, provenance and
//! lifecycle status. Entries are keyed by URL and kept in discovery order.
//!
//! Every mutation returns a new [`Registry`] and leaves the original
//! untouched, so each reconciliation step can be inspected on its own.

mod persist;
mod status;

pub use status::{UrlSource, UrlStatus};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One known URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub url: String,
    pub category: String,
    pub source: UrlSource,
    /// Set only after a successful content fetch
    pub last_crawled: Option<DateTime<Utc>>,
    /// Last modification date reported by the sitemap
    pub lastmod: Option<String>,
    pub status: UrlStatus,
}

/// Ordered set of registry entries keyed by URL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entries: IndexMap<String, RegistryEntry>,
}

impl Registry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from entries; later duplicates of a URL are dropped
    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        let mut map = IndexMap::new();
        for entry in entries {
            if !map.contains_key(&entry.url) {
                map.insert(entry.url.clone(), entry);
            }
        }
        Self { entries: map }
    }

    // ===== Pure mutations =====

    /// Adds a URL as `active` and never crawled. No-op if already present.
    pub fn add(
        &self,
        url: &str,
        category: &str,
        source: UrlSource,
        lastmod: Option<String>,
    ) -> Self {
        let mut next = self.clone();
        next.insert(url, category, source, lastmod);
        next
    }

    /// Retires a URL
    pub fn mark_stale(&self, url: &str) -> Self {
        self.with_status(url, UrlStatus::Stale)
    }

    /// Records that fetching a URL failed
    pub fn mark_failed(&self, url: &str) -> Self {
        self.with_status(url, UrlStatus::Failed)
    }

    /// Returns a URL to `active`, keeping its crawl history
    pub fn mark_active(&self, url: &str) -> Self {
        self.with_status(url, UrlStatus::Active)
    }

    /// Stamps a successful crawl at the current time, which also makes the
    /// entry active again
    pub fn update_last_crawled(&self, url: &str) -> Self {
        let now = Utc::now();
        let mut next = self.clone();
        next.update(url, |entry| {
            entry.last_crawled = Some(now);
            entry.status = UrlStatus::Active;
        });
        next
    }

    /// Records the sitemap modification date that was synced
    pub fn update_lastmod(&self, url: &str, lastmod: Option<String>) -> Self {
        let mut next = self.clone();
        next.update(url, |entry| entry.lastmod = lastmod);
        next
    }

    fn with_status(&self, url: &str, status: UrlStatus) -> Self {
        let mut next = self.clone();
        next.set_status(url, status);
        next
    }

    // ===== In-place updates =====
    //
    // Used by reconciliation and sync, which apply many changes to one
    // working copy instead of cloning the map per URL.

    /// Appends a new active entry. Returns false if the URL was known.
    pub(crate) fn insert(
        &mut self,
        url: &str,
        category: &str,
        source: UrlSource,
        lastmod: Option<String>,
    ) -> bool {
        if self.entries.contains_key(url) {
            return false;
        }

        self.entries.insert(
            url.to_string(),
            RegistryEntry {
                url: url.to_string(),
                category: category.to_string(),
                source,
                last_crawled: None,
                lastmod,
                status: UrlStatus::Active,
            },
        );
        true
    }

    pub(crate) fn set_status(&mut self, url: &str, status: UrlStatus) -> bool {
        self.update(url, |entry| entry.status = status)
    }

    /// Stamps a successful crawl and the `lastmod` it was synced against
    pub(crate) fn record_crawl(
        &mut self,
        url: &str,
        crawled_at: DateTime<Utc>,
        lastmod: Option<String>,
    ) -> bool {
        self.update(url, |entry| {
            entry.last_crawled = Some(crawled_at);
            entry.status = UrlStatus::Active;
            entry.lastmod = lastmod;
        })
    }

    fn update(&mut self, url: &str, update: impl FnOnce(&mut RegistryEntry)) -> bool {
        match self.entries.get_mut(url) {
            Some(entry) => {
                update(entry);
                true
            }
            None => {
                tracing::debug!("Registry has no entry for {}", url);
                false
            }
        }
    }

    // ===== Queries =====

    /// All entries in discovery order
    pub fn get_all(&self) -> Vec<&RegistryEntry> {
        self.entries.values().collect()
    }

    /// Entries in one category
    pub fn get_by_category(&self, category: &str) -> Vec<&RegistryEntry> {
        self.entries
            .values()
            .filter(|entry| entry.category == category)
            .collect()
    }

    /// Entries that are neither stale nor failed
    pub fn get_active(&self) -> Vec<&RegistryEntry> {
        self.entries
            .values()
            .filter(|entry| entry.status.is_active())
            .collect()
    }

    pub fn get(&self, url: &str) -> Option<&RegistryEntry> {
        self.entries.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Registry {
        Registry::new()
            .add(
                "https://docs.example.com/docs/hooks",
                "hooks",
                UrlSource::Sitemap,
                Some("2024-01-01".to_string()),
            )
            .add(
                "https://docs.example.com/docs/cli",
                "cli",
                UrlSource::Sitemap,
                None,
            )
            .add(
                "https://blog.example.com/launch",
                "announcements",
                UrlSource::ExternalSeed,
                None,
            )
    }

    #[test]
    fn test_add_creates_active_uncrawled_entry() {
        let registry = sample();
        let entry = registry.get("https://docs.example.com/docs/hooks").unwrap();

        assert_eq!(entry.status, UrlStatus::Active);
        assert_eq!(entry.last_crawled, None);
        assert_eq!(entry.lastmod.as_deref(), Some("2024-01-01"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_add_existing_is_noop() {
        let registry = sample();
        let again = registry.add(
            "https://docs.example.com/docs/hooks",
            "other",
            UrlSource::Manual,
            None,
        );
        assert_eq!(again, registry);
    }

    #[test]
    fn test_mutations_do_not_touch_original() {
        let registry = sample();
        let failed = registry.mark_failed("https://docs.example.com/docs/cli");

        assert_eq!(
            registry.get("https://docs.example.com/docs/cli").unwrap().status,
            UrlStatus::Active
        );
        assert_eq!(
            failed.get("https://docs.example.com/docs/cli").unwrap().status,
            UrlStatus::Failed
        );
    }

    #[test]
    fn test_mark_unknown_url_is_noop() {
        let registry = sample();
        assert_eq!(registry.mark_stale("https://nowhere.example.com/"), registry);
    }

    #[test]
    fn test_update_last_crawled_reactivates() {
        let registry = sample().mark_failed("https://docs.example.com/docs/cli");
        let crawled = registry.update_last_crawled("https://docs.example.com/docs/cli");
        let entry = crawled.get("https://docs.example.com/docs/cli").unwrap();

        assert!(entry.last_crawled.is_some());
        assert_eq!(entry.status, UrlStatus::Active);
    }

    #[test]
    fn test_mark_active_keeps_crawl_history() {
        let url = "https://docs.example.com/docs/cli";
        let crawled = sample().update_last_crawled(url);
        let stamp = crawled.get(url).unwrap().last_crawled;

        let revived = crawled.mark_stale(url).mark_active(url);
        let entry = revived.get(url).unwrap();
        assert_eq!(entry.status, UrlStatus::Active);
        assert_eq!(entry.last_crawled, stamp);
    }

    #[test]
    fn test_in_place_updates() {
        let mut registry = sample();
        let at = Utc::now();

        assert!(registry.insert("https://docs.example.com/docs/new", "new", UrlSource::Manual, None));
        assert!(!registry.insert("https://docs.example.com/docs/new", "x", UrlSource::Manual, None));
        assert!(registry.set_status("https://docs.example.com/docs/new", UrlStatus::Failed));
        assert!(registry.record_crawl(
            "https://docs.example.com/docs/new",
            at,
            Some("2024-07-01".to_string())
        ));
        assert!(!registry.record_crawl("https://nowhere.example.com/", at, None));

        let entry = registry.get("https://docs.example.com/docs/new").unwrap();
        assert_eq!(entry.category, "new");
        assert_eq!(entry.status, UrlStatus::Active);
        assert_eq!(entry.last_crawled, Some(at));
        assert_eq!(entry.lastmod.as_deref(), Some("2024-07-01"));
    }

    #[test]
    fn test_update_lastmod() {
        let registry = sample().update_lastmod(
            "https://docs.example.com/docs/hooks",
            Some("2024-06-01".to_string()),
        );
        assert_eq!(
            registry
                .get("https://docs.example.com/docs/hooks")
                .unwrap()
                .lastmod
                .as_deref(),
            Some("2024-06-01")
        );
    }

    #[test]
    fn test_queries() {
        let registry = sample()
            .mark_stale("https://docs.example.com/docs/cli")
            .mark_failed("https://blog.example.com/launch");

        assert_eq!(registry.get_all().len(), 3);
        assert_eq!(registry.get_by_category("cli").len(), 1);
        assert!(registry.get_by_category("missing").is_empty());

        let active: Vec<_> = registry.get_active().iter().map(|e| e.url.as_str()).collect();
        assert_eq!(active, vec!["https://docs.example.com/docs/hooks"]);
    }

    #[test]
    fn test_order_is_preserved() {
        let urls: Vec<_> = sample().get_all().iter().map(|e| e.url.clone()).collect();
        assert_eq!(
            urls,
            vec![
                "https://docs.example.com/docs/hooks",
                "https://docs.example.com/docs/cli",
                "https://blog.example.com/launch",
            ]
        );
    }

    #[test]
    fn test_from_entries_keeps_first_duplicate() {
        let entries = sample().get_all().into_iter().cloned().collect::<Vec<_>>();
        let mut duplicate = entries[0].clone();
        duplicate.category = "dupe".to_string();

        let registry = Registry::from_entries(entries.into_iter().chain([duplicate]));
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.get("https://docs.example.com/docs/hooks").unwrap().category,
            "hooks"
        );
    }
}
