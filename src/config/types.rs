use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for kb-mirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub site: SiteConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub transform: TransformConfig,
    /// Display titles for categories in the generated index
    #[serde(rename = "category-titles", default)]
    pub category_titles: BTreeMap<String, String>,
    /// URLs that are not listed in the sitemap but should be mirrored
    #[serde(rename = "seed", default)]
    pub seeds: Vec<SeedEntry>,
}

/// Fetcher retry and concurrency settings
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Number of retries after the first attempt
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Number of concurrent fetch workers in a batch
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Base delay for exponential backoff (milliseconds)
    #[serde(rename = "base-delay-ms", default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            concurrency: default_concurrency(),
            base_delay_ms: default_base_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_concurrency() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// The documentation site being mirrored
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(rename = "sitemap-url")]
    pub sitemap_url: String,

    #[serde(rename = "changelog-url", default)]
    pub changelog_url: Option<String>,

    /// Host patterns (e.g., "docs.example.com" or "*.example.com")
    #[serde(rename = "allowed-hosts")]
    pub allowed_hosts: Vec<String>,

    /// Path prefix that all categorized pages live under (e.g., "/docs")
    #[serde(rename = "path-prefix", default)]
    pub path_prefix: String,

    /// Maps "segment" or "segment/sub" to a category name
    #[serde(default)]
    pub sections: BTreeMap<String, String>,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory of the knowledge base
    #[serde(rename = "knowledge-base-dir")]
    pub knowledge_base_dir: String,

    /// Path to the registry JSON file
    #[serde(rename = "registry-path")]
    pub registry_path: String,

    /// Path to the change detector state JSON file
    #[serde(rename = "state-path")]
    pub state_path: String,
}

/// Content transformer settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformConfig {
    /// CSS selectors for regions dropped from the rendered Markdown.
    /// When absent the built-in list is used.
    #[serde(default)]
    pub boilerplate: Option<Vec<String>>,
}

/// A URL mirrored in addition to the sitemap
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    pub url: String,

    /// Category override; derived from the URL when absent
    #[serde(default)]
    pub category: Option<String>,
}
