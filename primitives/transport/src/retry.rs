use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::TransportError;

/// When and how long to wait before repeating a failed call.
///
/// The delay doubles per attempt starting at `initial_delay` and never
/// exceeds `max_delay`. A server-sent `Retry-After` replaces the computed
/// delay, still capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self { Self { max_retries: 0, ..Self::default() } }

    /// Whether a response with this status is worth repeating.
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 408 | 409 | 429) || status >= 500
    }

    /// Whether `err`, raised on attempt `attempt` (zero based), should be retried.
    pub fn should_retry(&self, attempt: u32, err: &TransportError) -> bool {
        attempt < self.max_retries && err.is_retryable()
    }

    /// Delay before retry number `attempt + 1`.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let computed = retry_after.unwrap_or_else(|| {
            let factor = 2u32.saturating_pow(attempt);
            self.initial_delay.saturating_mul(factor)
        });
        computed.min(self.max_delay)
    }
}

/// Parse a `Retry-After` header given in seconds.
///
/// HTTP dates are not supported and yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(Duration::from_secs_f64(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiError, ApiErrorKind};

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = policy();
        assert_eq!(policy.delay_for(0, None), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1, None), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2, None), Duration::from_millis(350));
        assert_eq!(policy.delay_for(40, None), Duration::from_millis(350));
    }

    #[test]
    fn test_retry_after_overrides_up_to_cap() {
        let policy = policy();
        let hinted = policy.delay_for(0, Some(Duration::from_millis(250)));
        assert_eq!(hinted, Duration::from_millis(250));
        assert_eq!(policy.delay_for(0, Some(Duration::from_secs(30))), Duration::from_millis(350));
        assert_eq!(parse_retry_after(" 2 "), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(parse_retry_after("-1"), None);
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [408, 409, 429, 500, 502, 503] {
            assert!(RetryPolicy::is_retryable_status(status), "{status} should be retried");
        }
        for status in [400, 401, 403, 404, 422] {
            assert!(!RetryPolicy::is_retryable_status(status), "{status} should not be retried");
        }
    }

    #[test]
    fn test_should_retry_respects_budget() {
        let policy = policy();
        let rate_limited = TransportError::Api(ApiError::new(429, "slow down"));
        assert!(matches!(
            &rate_limited,
            TransportError::Api(e) if e.kind == ApiErrorKind::RateLimit
        ));
        assert!(policy.should_retry(0, &rate_limited));
        assert!(!policy.should_retry(3, &rate_limited));

        let not_found = TransportError::Api(ApiError::new(404, "missing"));
        assert!(!policy.should_retry(0, &not_found));
        assert!(policy.should_retry(0, &TransportError::Timeout("read".into())));
        assert!(!RetryPolicy::none().should_retry(0, &TransportError::Http("refused".into())));
    }
}
