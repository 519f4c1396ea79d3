//! HTTP client and single/retried fetches

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::fetcher::retry::{parse_retry_after, retry_delay, RetryPolicy};
use crate::fetcher::{CrawlResult, FetchError};
use chrono::Utc;
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use kb_mirror::config::UserAgentConfig;
/// use kb_mirror::fetcher::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "kb-mirror".to_string(),
///     crawler_version: "0.1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "docs@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests with error classification and retries
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher from an existing client
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds the client and retry policy from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        fetcher: &FetcherConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, Duration::from_secs(fetcher.timeout_secs))?;
        let policy = RetryPolicy {
            max_retries: fetcher.max_retries,
            base_delay: Duration::from_millis(fetcher.base_delay_ms),
        };
        Ok(Self::new(client, policy))
    }

    /// The policy used when no explicit retry count is given
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL once
    ///
    /// Any status outside 2xx becomes `FetchError::Http`, carrying the
    /// server's `Retry-After` delay when one was sent.
    pub async fn fetch_one(&self, url: &str) -> Result<CrawlResult, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| parse_retry_after(v, Utc::now()));

            return Err(FetchError::Http {
                status_code: status.as_u16(),
                url: url.to_string(),
                retry_after,
            });
        }

        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let html = response
            .text()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        Ok(CrawlResult {
            url: url.to_string(),
            html,
            status_code: status.as_u16(),
            headers,
        })
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// Makes at most `max_retries + 1` requests. See [`retry_delay`] for the
    /// delay schedule. The last error is returned once retries run out.
    pub async fn fetch_with_retry(
        &self,
        url: &str,
        max_retries: u32,
    ) -> Result<CrawlResult, FetchError> {
        self.fetch_counting_retries(url, max_retries)
            .await
            .map_err(|(error, _)| error)
    }

    /// Retry loop shared by single and batch fetches; failures also report
    /// how many retries were made
    pub(crate) async fn fetch_counting_retries(
        &self,
        url: &str,
        max_retries: u32,
    ) -> Result<CrawlResult, (FetchError, u32)> {
        let policy = RetryPolicy {
            max_retries,
            ..self.policy
        };
        let mut attempt = 0;

        loop {
            tracing::debug!("Fetching {} (attempt {})", url, attempt + 1);

            let error = match self.fetch_one(url).await {
                Ok(result) => return Ok(result),
                Err(error) => error,
            };

            match retry_delay(&policy, &error, attempt) {
                Some(delay) => {
                    tracing::warn!(
                        "{}; retrying in {}ms ({}/{})",
                        error,
                        delay.as_millis(),
                        attempt + 1,
                        max_retries
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    tracing::debug!("Giving up on {} after {} retries", url, attempt);
                    return Err((error, attempt));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestMirror".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_config(), Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_from_config_uses_retry_settings() {
        let fetcher_config = FetcherConfig {
            max_retries: 5,
            concurrency: 2,
            base_delay_ms: 250,
            timeout_secs: 10,
        };
        let fetcher = Fetcher::from_config(&create_test_config(), &fetcher_config).unwrap();

        assert_eq!(fetcher.policy().max_retries, 5);
        assert_eq!(fetcher.policy().base_delay, Duration::from_millis(250));
    }

    // Request behavior is covered with wiremock in tests/fetcher_tests.rs
}
