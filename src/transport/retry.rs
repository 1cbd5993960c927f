//! Retry policy for transient failures

use std::time::Duration;

use super::TransportError;
use crate::config::TransportConfig;

/// Statuses worth another attempt: rate limiting and transient server errors
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Bounded exponential backoff.
///
/// The first attempt is followed by up to `max_retries` more, waiting
/// `base_delay * 2^(n-1)` before retry `n` (1, 2, 4 units by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

impl From<&TransportConfig> for RetryPolicy {
    fn from(config: &TransportConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.backoff_base_ms),
            retry_statuses: config.retry_statuses.clone(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Whether an error of this kind may succeed on another attempt
    pub fn is_retryable(&self, error: &TransportError) -> bool {
        match error {
            TransportError::HttpStatus { status, .. } => self.retry_statuses.contains(status),
            TransportError::Timeout | TransportError::Connection(_) => true,
            TransportError::InvalidUrl(_) => false,
        }
    }

    /// Whether another attempt is allowed after `attempts` have been made
    pub fn has_budget(&self, attempts: u32) -> bool {
        attempts <= self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> TransportError {
        TransportError::HttpStatus {
            status: code,
            body: String::new(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.retry_statuses, vec![429, 500, 502, 503, 504]);
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert!(policy.backoff(1) < policy.backoff(2));
    }

    #[test]
    fn test_retryable_statuses() {
        let policy = RetryPolicy::default();
        for code in [429, 500, 502, 503, 504] {
            assert!(policy.is_retryable(&status(code)), "{code}");
        }
        for code in [400, 401, 403, 404, 501] {
            assert!(!policy.is_retryable(&status(code)), "{code}");
        }
    }

    #[test]
    fn test_network_errors_retryable() {
        let policy = RetryPolicy::default();
        assert!(policy.is_retryable(&TransportError::Timeout));
        assert!(policy.is_retryable(&TransportError::Connection("reset".into())));
        assert!(!policy.is_retryable(&TransportError::InvalidUrl("x".into())));
    }

    #[test]
    fn test_budget() {
        let policy = RetryPolicy::default();
        assert!(policy.has_budget(1));
        assert!(policy.has_budget(3));
        assert!(!policy.has_budget(4));
    }
}
