//! kb-mirror: a local, categorized mirror of a documentation site
//!
//! This crate implements the ingestion and synchronization pipeline that keeps a
//! Markdown knowledge base in step with a remote documentation site: a URL
//! registry, a retrying fetcher, an HTML-to-Markdown transformer, the on-disk
//! knowledge base, and a sitemap/changelog change detector.

pub mod config;
pub mod detector;
pub mod fetcher;
pub mod knowledge;
pub mod registry;
pub mod sync;
pub mod transform;
pub mod url;

use thiserror::Error;

/// Main error type for kb-mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetcher::FetchError),

    #[error("Knowledge base error: {0}")]
    Store(#[from] knowledge::StoreError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid host pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for kb-mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use detector::{ChangeDetector, ChangeDetectorResult};
pub use fetcher::{CrawlError, CrawlResult, Fetcher};
pub use knowledge::{KnowledgeBaseEntry, KnowledgeStore, MarkdownStore};
pub use registry::{Registry, RegistryEntry, UrlSource, UrlStatus};
pub use sync::{SyncReport, Synchronizer};
pub use transform::{parse_content, ParsedContent};
pub use crate::url::{categorize, slugify, CategoryRules};
