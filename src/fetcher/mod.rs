//! Fetcher module for documentation pages
//!
//! This module handles all HTTP traffic of a sync run:
//! - Building HTTP clients with proper user agent strings
//! - Single GET requests with error classification
//! - Retry with exponential backoff and `Retry-After` support
//! - Bounded concurrent batch fetching

mod client;
mod pool;
mod retry;

pub use client::{build_http_client, Fetcher};
pub use retry::{parse_retry_after, retry_delay, RetryPolicy};

use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// The requested URL
    pub url: String,

    /// Response body
    pub html: String,

    /// HTTP status code
    pub status_code: u16,

    /// Response headers (lowercase names, values that were valid strings)
    pub headers: BTreeMap<String, String>,
}

/// A URL that could not be fetched, recorded as data in batch results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlError {
    /// The URL that failed
    pub url: String,

    /// Description of the last error
    pub error: String,

    /// Number of retries attempted after the first request
    pub retry_count: u32,
}

/// Errors raised by single and retried fetches
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status_code} for {url}")]
    Http {
        status_code: u16,
        url: String,
        /// Delay requested by the server through `Retry-After`
        retry_after: Option<Duration>,
    },

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Returns the HTTP status code, if the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status_code, .. } => Some(*status_code),
            Self::Network { .. } => None,
        }
    }

    /// Returns true for failures that retrying cannot fix (HTTP 404)
    pub fn is_permanent(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Returns true when the server asked us to slow down (HTTP 429)
    pub fn is_rate_limited(&self) -> bool {
        self.status_code() == Some(429)
    }
}
