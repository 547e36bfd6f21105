//! Retry backoff computation.
//!
//! A backoff of `None` means no retry: the workflow completes or fails for
//! good. `Some(duration)` means the run continues as new after the interval.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tideway_shared::RetryPolicy;

/// Compute the backoff before the next retry attempt, or `None` when the
/// retry policy is exhausted or does not apply.
///
/// The interval grows as `initial * coefficient^(attempt - 1)`, capped at the
/// policy's maximum interval. `attempt` counts completed attempts, starting
/// at 1 for the first retry.
pub fn retry_backoff_interval(
    policy: &RetryPolicy,
    attempt: i32,
    failure_reason: Option<&str>,
    now: DateTime<Utc>,
    expiration_time: Option<DateTime<Utc>>,
) -> Option<Duration> {
    if policy.initial_interval_in_seconds <= 0 {
        return None;
    }
    if policy.maximum_attempts > 0 && attempt >= policy.maximum_attempts {
        return None;
    }
    if let Some(reason) = failure_reason {
        if policy
            .non_retryable_error_reasons
            .iter()
            .any(|r| r == reason)
        {
            return None;
        }
    }

    let exponent = (attempt - 1).max(0);
    let mut interval =
        f64::from(policy.initial_interval_in_seconds) * policy.backoff_coefficient.powi(exponent);
    if policy.maximum_interval_in_seconds > 0 {
        interval = interval.min(f64::from(policy.maximum_interval_in_seconds));
    }
    if interval <= 0.0 || !interval.is_finite() {
        return None;
    }

    let backoff = Duration::from_secs(interval.ceil() as u64);
    if let Some(expiration) = expiration_time {
        let next_attempt = now + chrono::Duration::from_std(backoff).ok()?;
        if next_attempt > expiration {
            return None;
        }
    }
    Some(backoff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            initial_interval_in_seconds: 1,
            backoff_coefficient: 2.0,
            maximum_interval_in_seconds: 10,
            maximum_attempts: 5,
            non_retryable_error_reasons: vec!["fatal".to_string()],
            expiration_interval_in_seconds: 0,
        }
    }

    #[test]
    fn test_interval_grows_and_caps() {
        let now = Utc::now();
        assert_eq!(
            retry_backoff_interval(&policy(), 1, None, now, None),
            Some(Duration::from_secs(1))
        );
        assert_eq!(
            retry_backoff_interval(&policy(), 3, None, now, None),
            Some(Duration::from_secs(4))
        );
        // 2^5 = 32 capped at 10
        let mut p = policy();
        p.maximum_attempts = 0;
        assert_eq!(
            retry_backoff_interval(&p, 6, None, now, None),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_max_attempts_exhausts_retries() {
        let now = Utc::now();
        assert_eq!(retry_backoff_interval(&policy(), 5, None, now, None), None);
    }

    #[test]
    fn test_non_retryable_reason() {
        let now = Utc::now();
        assert_eq!(
            retry_backoff_interval(&policy(), 1, Some("fatal"), now, None),
            None
        );
        assert!(retry_backoff_interval(&policy(), 1, Some("boom"), now, None).is_some());
    }

    #[test]
    fn test_expiration_window() {
        let now = Utc::now();
        let expiration = now + chrono::Duration::milliseconds(500);
        assert_eq!(
            retry_backoff_interval(&policy(), 1, None, now, Some(expiration)),
            None
        );
    }

    #[test]
    fn test_no_policy_interval_means_no_retry() {
        let now = Utc::now();
        let mut p = policy();
        p.initial_interval_in_seconds = 0;
        assert_eq!(retry_backoff_interval(&p, 1, None, now, None), None);
    }
}
