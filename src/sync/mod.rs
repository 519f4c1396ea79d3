//! Sync orchestration
//!
//! A sync run ties the pipeline together:
//! 1. Loads the registry and registers configured seed URLs
//! 2. Runs change detection against the sitemap
//! 3. Fetches every URL that needs content with a bounded worker pool
//! 4. Transforms each page and writes it to the knowledge base
//! 5. Records crawl provenance, retires removed URLs, and saves the registry
//! 6. Regenerates the knowledge base index
//!
//! All registry and knowledge base writes happen on the calling task after
//! the batch fetch completes.

mod report;

pub use report::SyncReport;

use crate::config::Config;
use crate::detector::{ChangeDetector, ChangeDetectorResult, Detection};
use crate::fetcher::{CrawlError, CrawlResult, Fetcher};
use crate::knowledge::{KnowledgeBaseEntry, KnowledgeStore, MarkdownStore};
use crate::registry::{Registry, UrlSource, UrlStatus};
use crate::transform::{parse_content, TransformOptions};
use crate::url::{categorize, slugify};
use crate::MirrorError;
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;

/// Main sync orchestrator
pub struct Synchronizer {
    config: Config,
    fetcher: Fetcher,
    store: MarkdownStore,
    options: TransformOptions,
}

impl Synchronizer {
    /// Creates a synchronizer from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Synchronizer)` - Ready to run
    /// * `Err(MirrorError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, MirrorError> {
        let fetcher = Fetcher::from_config(&config.user_agent, &config.fetcher)?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Creates a synchronizer that uses an existing fetcher
    pub fn with_fetcher(config: Config, fetcher: Fetcher) -> Self {
        let store = MarkdownStore::new(&config.output.knowledge_base_dir)
            .with_category_titles(config.category_titles.clone());
        let options = config.transform_options();

        Self {
            config,
            fetcher,
            store,
            options,
        }
    }

    pub fn store(&self) -> &MarkdownStore {
        &self.store
    }

    /// Loads the registry and reconciles it with the configured seeds
    ///
    /// Unknown seeds are added. A known seed that is stale or failed goes
    /// back to `active`, since it is still configured.
    pub fn load_registry(&self) -> Registry {
        let rules = self.config.category_rules();
        let mut registry = Registry::load(Path::new(&self.config.output.registry_path));

        for seed in &self.config.seeds {
            match registry.get(&seed.url).map(|known| known.status.is_active()) {
                Some(false) => {
                    tracing::debug!("Reactivating seed {}", seed.url);
                    registry.set_status(&seed.url, UrlStatus::Active);
                }
                Some(true) => {}
                None => {
                    let category = seed
                        .category
                        .clone()
                        .unwrap_or_else(|| categorize(&seed.url, &rules));
                    tracing::debug!("Registering seed {} as {}", seed.url, category);
                    registry.insert(&seed.url, &category, UrlSource::ExternalSeed, None);
                }
            }
        }

        registry
    }

    /// Runs change detection only
    ///
    /// Updates the detector state file but leaves the registry and the
    /// knowledge base untouched.
    pub async fn detect(&self) -> Detection {
        let registry = self.load_registry();
        self.detector().run(&registry).await
    }

    /// Runs a full sync
    pub async fn run(&self) -> Result<SyncReport, MirrorError> {
        let started = std::time::Instant::now();
        let initial = self.load_registry();
        tracing::info!("Starting sync with {} known URLs", initial.len());

        let detection = self.detector().run(&initial).await;
        let pending = urls_needing_content(&detection.result, &detection.registry);
        tracing::info!("{} URLs need content", pending.len());

        let outcomes = self
            .fetcher
            .fetch_batch(&pending, self.config.fetcher.concurrency as usize)
            .await;

        let listed = detection.sitemap_lastmods();
        let mut registry = detection.registry.clone();
        let mut report = SyncReport::new(detection.result.clone(), detection.changelog.clone());

        for outcome in outcomes {
            match outcome {
                Ok(page) => match self.store_page(&registry, &page) {
                    Ok(entry) => {
                        let lastmod = match listed.get(page.url.as_str()).copied().flatten() {
                            Some(lastmod) => Some(lastmod.to_string()),
                            None => registry.get(&page.url).and_then(|e| e.lastmod.clone()),
                        };
                        registry.record_crawl(&page.url, Utc::now(), lastmod);
                        report.written.push((entry.category, entry.slug));
                    }
                    Err(e) => {
                        tracing::error!("Failed to store {}: {}", page.url, e);
                        registry.set_status(&page.url, UrlStatus::Failed);
                        report.failed.push(CrawlError {
                            url: page.url.clone(),
                            error: e.to_string(),
                            retry_count: 0,
                        });
                    }
                },
                Err(failure) => {
                    registry.set_status(&failure.url, UrlStatus::Failed);
                    report.failed.push(failure);
                }
            }
        }

        for url in &detection.result.removed_urls {
            registry.set_status(url, UrlStatus::Stale);
            report.stale_marked.push(url.clone());
        }

        let registry_path = Path::new(&self.config.output.registry_path);
        if let Err(e) = registry.save(registry_path) {
            tracing::warn!("Failed to save registry to {}: {}", registry_path.display(), e);
        }

        self.store.update_index()?;

        tracing::info!(
            "Sync completed in {:?}: {} written, {} failed, {} marked stale",
            started.elapsed(),
            report.written.len(),
            report.failed.len(),
            report.stale_marked.len()
        );

        Ok(report)
    }

    fn detector(&self) -> ChangeDetector {
        ChangeDetector::from_config(&self.config, self.fetcher.clone())
    }

    /// Transforms a fetched page and writes it to the knowledge base
    fn store_page(
        &self,
        registry: &Registry,
        page: &CrawlResult,
    ) -> Result<KnowledgeBaseEntry, MirrorError> {
        let category = match registry.get(&page.url) {
            Some(entry) => entry.category.clone(),
            None => categorize(&page.url, &self.config.category_rules()),
        };

        let parsed = parse_content(&page.html, &self.options);
        let slug = slugify(&page.url);
        let title = if parsed.title.is_empty() {
            slug.clone()
        } else {
            parsed.title
        };

        let entry = KnowledgeBaseEntry {
            slug,
            category,
            title,
            content: parsed.markdown,
            source_url: page.url.clone(),
            last_updated: Utc::now(),
        };

        self.store.write(&entry)?;
        tracing::debug!("Stored {} as {}/{}", page.url, entry.category, entry.slug);
        Ok(entry)
    }
}

/// URLs to fetch: new, then modified, then active entries never crawled
///
/// Failed entries reactivated by reconciliation count as active here, so a
/// page whose first fetch failed is retried on the next run. Each URL
/// appears once, at its first position.
pub fn urls_needing_content(changes: &ChangeDetectorResult, registry: &Registry) -> Vec<String> {
    let never_crawled = registry
        .get_active()
        .into_iter()
        .filter(|entry| entry.last_crawled.is_none())
        .map(|entry| &entry.url);

    let mut seen = HashSet::new();
    changes
        .new_urls
        .iter()
        .chain(&changes.modified_urls)
        .chain(never_crawled)
        .filter(|url| seen.insert(url.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_needing_content() {
        let registry = Registry::new()
            .add("https://docs.example.com/new", "a", UrlSource::Sitemap, None)
            .add("https://docs.example.com/mod", "a", UrlSource::Sitemap, None)
            .update_last_crawled("https://docs.example.com/mod")
            .add("https://blog.example.com/seed", "b", UrlSource::ExternalSeed, None)
            .add("https://docs.example.com/broken", "a", UrlSource::Sitemap, None)
            .mark_failed("https://docs.example.com/broken")
            .add("https://docs.example.com/done", "a", UrlSource::Sitemap, None)
            .update_last_crawled("https://docs.example.com/done");

        let mut changes = ChangeDetectorResult::empty(Utc::now());
        changes.new_urls = vec!["https://docs.example.com/new".to_string()];
        changes.modified_urls = vec!["https://docs.example.com/mod".to_string()];

        assert_eq!(
            urls_needing_content(&changes, &registry),
            vec![
                "https://docs.example.com/new",
                "https://docs.example.com/mod",
                "https://blog.example.com/seed",
            ]
        );
    }

    #[test]
    fn test_nothing_pending() {
        let changes = ChangeDetectorResult::empty(Utc::now());
        assert!(urls_needing_content(&changes, &Registry::new()).is_empty());
    }
}
