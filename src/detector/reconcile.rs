//! Sitemap-to-registry reconciliation

use crate::detector::SitemapEntry;
use crate::registry::{Registry, UrlSource, UrlStatus};
use crate::url::{categorize, CategoryRules};
use std::collections::HashSet;

/// URL deltas between a sitemap and the registry, plus the reconciled
/// registry
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryDiff {
    /// In the sitemap, not yet in the registry (sitemap order)
    pub new_urls: Vec<String>,

    /// In both, with a sitemap `lastmod` newer than the stored one
    pub modified_urls: Vec<String>,

    /// Sitemap-sourced registry entries no longer listed
    pub removed_urls: Vec<String>,

    /// Stale or failed entries that are still listed, now active again.
    /// May overlap `modified_urls`.
    pub reactivated_urls: Vec<String>,

    pub registry: Registry,
}

/// Classifies sitemap URLs against the registry
///
/// New URLs are added with source `sitemap`, their category from
/// [`categorize`] and the sitemap `lastmod`. Known entries that are stale or
/// failed but still listed go back to `active`; one that was never crawled
/// is then fetched again by the next sync. Entries from other sources are
/// never reported as removed. The input registry is left untouched.
pub fn diff_registry(
    sitemap: &[SitemapEntry],
    registry: &Registry,
    rules: &CategoryRules,
) -> RegistryDiff {
    let mut seen = HashSet::new();
    let mut new_urls = Vec::new();
    let mut modified_urls = Vec::new();
    let mut reactivated_urls = Vec::new();
    let mut next = registry.clone();

    for entry in sitemap {
        if !seen.insert(entry.url.as_str()) {
            continue;
        }

        match registry.get(&entry.url) {
            None => {
                let category = categorize(&entry.url, rules);
                next.insert(&entry.url, &category, UrlSource::Sitemap, entry.lastmod.clone());
                new_urls.push(entry.url.clone());
            }
            Some(known) => {
                if !known.status.is_active() {
                    next.set_status(&entry.url, UrlStatus::Active);
                    reactivated_urls.push(entry.url.clone());
                }

                if let (Some(listed), Some(stored)) = (&entry.lastmod, &known.lastmod) {
                    if listed > stored {
                        modified_urls.push(entry.url.clone());
                    }
                }
            }
        }
    }

    let removed_urls = registry
        .get_all()
        .into_iter()
        .filter(|known| known.source == UrlSource::Sitemap && !seen.contains(known.url.as_str()))
        .map(|known| known.url.clone())
        .collect();

    RegistryDiff {
        new_urls,
        modified_urls,
        removed_urls,
        reactivated_urls,
        registry: next,
    }
}
