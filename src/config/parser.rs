use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a knowledge base can be traced back to the
/// configuration that produced it.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[fetcher]
max-retries = 2
concurrency = 4

[user-agent]
crawler-name = "kb-mirror"
crawler-version = "0.1.0"
contact-url = "https://example.com/about"
contact-email = "docs@example.com"

[site]
sitemap-url = "https://docs.example.com/sitemap.xml"
changelog-url = "https://docs.example.com/changelog"
allowed-hosts = ["docs.example.com"]
path-prefix = "/docs"

[site.sections]
"getting-started" = "getting-started"
"cli/reference" = "cli"

[output]
knowledge-base-dir = "./kb"
registry-path = "./state/registry.json"
state-path = "./state/detector.json"

[category-titles]
cli = "Command Line"

[[seed]]
url = "https://blog.example.com/launch"
category = "announcements"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.fetcher.max_retries, 2);
        assert_eq!(config.fetcher.concurrency, 4);
        // unspecified fetcher keys fall back to defaults
        assert_eq!(config.fetcher.base_delay_ms, 1000);
        assert_eq!(config.site.path_prefix, "/docs");
        assert_eq!(config.site.sections.get("cli/reference").unwrap(), "cli");
        assert_eq!(config.category_titles.get("cli").unwrap(), "Command Line");
        assert_eq!(config.seeds.len(), 1);
        assert_eq!(config.seeds[0].category.as_deref(), Some("announcements"));
        assert!(config.transform.boilerplate.is_none());
    }

    #[test]
    fn test_fetcher_section_is_optional() {
        let content = VALID_CONFIG.replace("[fetcher]\nmax-retries = 2\nconcurrency = 4\n", "");
        let file = create_temp_config(&content);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.fetcher.max_retries, 3);
        assert_eq!(config.fetcher.concurrency, 3);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/kb-mirror.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = VALID_CONFIG.replace("concurrency = 4", "concurrency = 0");
        let file = create_temp_config(&content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
