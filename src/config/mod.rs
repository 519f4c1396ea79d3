//! Configuration module for kb-mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use kb_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("kb-mirror.toml")).unwrap();
//! println!("Sitemap: {}", config.site.sitemap_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetcherConfig, OutputConfig, SeedEntry, SiteConfig, TransformConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

use crate::transform::TransformOptions;
use crate::url::CategoryRules;

impl Config {
    /// Builds the categorization rules for the configured site
    pub fn category_rules(&self) -> CategoryRules {
        CategoryRules {
            allowed_hosts: self.site.allowed_hosts.clone(),
            path_prefix: self.site.path_prefix.clone(),
            sections: self.site.sections.clone(),
        }
    }

    /// Builds the transformer options, falling back to the default exclusion list
    pub fn transform_options(&self) -> TransformOptions {
        match &self.transform.boilerplate {
            Some(selectors) => TransformOptions::with_boilerplate(selectors),
            None => TransformOptions::default(),
        }
    }
}
