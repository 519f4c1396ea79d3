use crate::config::types::{
    Config, FetcherConfig, OutputConfig, SeedEntry, SiteConfig, TransformConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    validate_transform_config(&config.transform)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 32, got {}",
            config.concurrency
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.base_delay_ms < 1 {
        return Err(ConfigError::Validation(
            "base_delay_ms must be >= 1ms".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates the mirrored site description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("sitemap_url", &config.sitemap_url)?;

    if let Some(changelog) = &config.changelog_url {
        validate_http_url("changelog_url", changelog)?;
    }

    if config.allowed_hosts.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_hosts must list at least one host".to_string(),
        ));
    }

    for pattern in &config.allowed_hosts {
        validate_domain_pattern(pattern)?;
    }

    if !config.path_prefix.is_empty() && !config.path_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "path_prefix must start with '/', got '{}'",
            config.path_prefix
        )));
    }

    for (section, category) in &config.sections {
        if section.trim_matches('/').is_empty() || category.is_empty() {
            return Err(ConfigError::Validation(format!(
                "section mapping '{}' -> '{}' must name both a path and a category",
                section, category
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.knowledge_base_dir.is_empty() {
        return Err(ConfigError::Validation(
            "knowledge_base_dir cannot be empty".to_string(),
        ));
    }

    if config.registry_path.is_empty() {
        return Err(ConfigError::Validation(
            "registry_path cannot be empty".to_string(),
        ));
    }

    if config.state_path.is_empty() {
        return Err(ConfigError::Validation(
            "state_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates boilerplate selectors
fn validate_transform_config(config: &TransformConfig) -> Result<(), ConfigError> {
    for selector in config.boilerplate.iter().flatten() {
        Selector::parse(selector).map_err(|e| {
            ConfigError::Validation(format!("Invalid boilerplate selector '{}': {}", selector, e))
        })?;
    }
    Ok(())
}

/// Validates seed entries
fn validate_seeds(seeds: &[SeedEntry]) -> Result<(), ConfigError> {
    for seed in seeds {
        validate_http_url("seed url", &seed.url)?;

        if let Some(category) = &seed.category {
            if category.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Seed '{}' has an empty category",
                    seed.url
                )));
            }
        }
    }
    Ok(())
}

/// Checks that a URL parses and uses HTTP(S)
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Validates a host pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    // "localhost" is the one dotless host worth allowing, for local mirrors
    if !domain.contains('.') && domain != "localhost" {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'docs.example.com')",
            domain
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain_pattern() {
        assert!(validate_domain_pattern("example.com").is_ok());
        assert!(validate_domain_pattern("*.example.com").is_ok());
        assert!(validate_domain_pattern("127.0.0.1").is_ok());
        assert!(validate_domain_pattern("localhost").is_ok());

        assert!(validate_domain_pattern("").is_err());
        assert!(validate_domain_pattern("*.").is_err());
        assert!(validate_domain_pattern("example").is_err());
        assert!(validate_domain_pattern(".example.com").is_err());
        assert!(validate_domain_pattern("example.com.").is_err());
        assert!(validate_domain_pattern("exa mple.com").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("sitemap_url", "https://docs.example.com/sitemap.xml").is_ok());
        assert!(validate_http_url("sitemap_url", "http://127.0.0.1:8080/sitemap.xml").is_ok());
        assert!(validate_http_url("sitemap_url", "ftp://example.com/sitemap.xml").is_err());
        assert!(validate_http_url("sitemap_url", "not a url").is_err());
    }

    #[test]
    fn test_validate_fetcher_bounds() {
        let mut config = FetcherConfig::default();
        assert!(validate_fetcher_config(&config).is_ok());

        config.concurrency = 0;
        assert!(validate_fetcher_config(&config).is_err());

        config.concurrency = 3;
        config.max_retries = 11;
        assert!(validate_fetcher_config(&config).is_err());
    }

    #[test]
    fn test_validate_boilerplate_selectors() {
        let ok = TransformConfig {
            boilerplate: Some(vec!["nav".to_string(), "[role=banner]".to_string()]),
        };
        assert!(validate_transform_config(&ok).is_ok());

        let bad = TransformConfig {
            boilerplate: Some(vec!["nav[".to_string()]),
        };
        assert!(validate_transform_config(&bad).is_err());
    }
}
