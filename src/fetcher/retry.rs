//! Retry policy and backoff computation

use crate::fetcher::FetchError;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// How often and how patiently a URL is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry; doubled for every further retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Computes the delay before the next attempt
///
/// `attempt` is the zero-based index of the attempt that just failed.
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 404 | Give up immediately |
/// | HTTP 429 with `Retry-After` | Wait the server-specified delay |
/// | HTTP 429 without `Retry-After` | Exponential backoff |
/// | Other HTTP error | Exponential backoff |
/// | Network failure | Exponential backoff |
///
/// Exponential backoff waits `base_delay * 2^attempt`. Returns `None` once
/// `max_retries` retries have been spent.
pub fn retry_delay(policy: &RetryPolicy, error: &FetchError, attempt: u32) -> Option<Duration> {
    if error.is_permanent() || attempt >= policy.max_retries {
        return None;
    }

    if let FetchError::Http {
        status_code: 429,
        retry_after: Some(delay),
        ..
    } = error
    {
        return Some(*delay);
    }

    Some(
        policy
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt)),
    )
}

/// Parses a `Retry-After` header value
///
/// Accepts either a number of seconds or an HTTP date. Dates in the past
/// yield a zero delay. Anything else yields `None`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use kb_mirror::fetcher::parse_retry_after;
/// use std::time::Duration;
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(parse_retry_after("5", now), Some(Duration::from_millis(5000)));
/// assert_eq!(
///     parse_retry_after("Mon, 01 Jan 2024 00:00:30 GMT", now),
///     Some(Duration::from_secs(30))
/// );
/// assert_eq!(parse_retry_after("soon", now), None);
/// ```
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = DateTime::parse_from_rfc2822(value).ok()?;
    let millis = (date.with_timezone(&Utc) - now).num_milliseconds().max(0);
    Some(Duration::from_millis(millis as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn http_error(status_code: u16, retry_after: Option<Duration>) -> FetchError {
        FetchError::Http {
            status_code,
            url: "https://docs.example.com/page".to_string(),
            retry_after,
        }
    }

    #[test]
    fn test_not_found_is_never_retried() {
        let policy = RetryPolicy::default();
        assert_eq!(retry_delay(&policy, &http_error(404, None), 0), None);
    }

    #[test]
    fn test_server_errors_back_off_exponentially() {
        let policy = RetryPolicy::default();
        let error = http_error(500, None);

        let delays: Vec<_> = (0..4).map(|a| retry_delay(&policy, &error, a)).collect();
        assert_eq!(
            delays,
            vec![
                Some(Duration::from_millis(1000)),
                Some(Duration::from_millis(2000)),
                Some(Duration::from_millis(4000)),
                None,
            ]
        );
    }

    #[test]
    fn test_rate_limit_honors_retry_after() {
        let policy = RetryPolicy::default();
        let error = http_error(429, Some(Duration::from_millis(5000)));
        assert_eq!(
            retry_delay(&policy, &error, 0),
            Some(Duration::from_millis(5000))
        );
        assert_eq!(
            retry_delay(&policy, &error, 2),
            Some(Duration::from_millis(5000))
        );
    }

    #[test]
    fn test_rate_limit_without_retry_after_backs_off() {
        let policy = RetryPolicy::default();
        let error = http_error(429, None);
        assert_eq!(
            retry_delay(&policy, &error, 1),
            Some(Duration::from_millis(2000))
        );
    }

    #[test]
    fn test_rate_limit_respects_max_retries() {
        let policy = RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(10),
        };
        let error = http_error(429, Some(Duration::from_secs(1)));
        assert!(retry_delay(&policy, &error, 0).is_some());
        assert_eq!(retry_delay(&policy, &error, 1), None);
    }

    #[test]
    fn test_zero_retries() {
        let policy = RetryPolicy {
            max_retries: 0,
            base_delay: Duration::from_millis(10),
        };
        assert_eq!(retry_delay(&policy, &http_error(503, None), 0), None);
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        let now = Utc::now();
        assert_eq!(parse_retry_after("5", now), Some(Duration::from_millis(5000)));
        assert_eq!(parse_retry_after(" 0 ", now), Some(Duration::ZERO));
    }

    #[test]
    fn test_parse_retry_after_http_date() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:05 GMT", now),
            Some(Duration::from_millis(5000))
        );
    }

    #[test]
    fn test_parse_retry_after_past_date_is_zero() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 8, 0, 0).unwrap();
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", now),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_parse_retry_after_garbage() {
        let now = Utc::now();
        assert_eq!(parse_retry_after("", now), None);
        assert_eq!(parse_retry_after("-3", now), None);
        assert_eq!(parse_retry_after("tomorrow", now), None);
    }
}
