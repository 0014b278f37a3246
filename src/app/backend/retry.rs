use std::time::Duration;

use reqwest::Method;

/// Bounded retry for idempotent backend reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on each further attempt.
    pub initial_backoff: Duration,
    /// Upper bound for a single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Only GET is retried; mutations carry no idempotency key.
    pub fn applies_to(&self, method: &Method) -> bool {
        *method == Method::GET
    }

    /// Whether another attempt may follow attempt number `attempt` (1-based).
    pub fn allows_another(&self, attempt: u32) -> bool {
        attempt < self.max_attempts.max(1)
    }

    /// Sleep before the attempt following attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = 2_u32.saturating_pow(attempt.saturating_sub(1));
        let base_ms = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)).min(max_ms))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1, 200)]
    #[case(2, 400)]
    #[case(3, 800)]
    #[case(6, 5_000)]
    #[case(40, 5_000)]
    fn backoff_doubles_and_caps(#[case] attempt: u32, #[case] expected_ms: u64) {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_after(attempt), Duration::from_millis(expected_ms));
    }

    #[rstest]
    #[case(Method::GET, true)]
    #[case(Method::POST, false)]
    #[case(Method::PUT, false)]
    #[case(Method::DELETE, false)]
    fn only_reads_are_retried(#[case] method: Method, #[case] expected: bool) {
        assert_eq!(RetryPolicy::default().applies_to(&method), expected);
    }

    #[rstest]
    fn attempts_are_bounded() {
        let policy = RetryPolicy::default();

        assert!(policy.allows_another(1));
        assert!(policy.allows_another(2));
        assert!(!policy.allows_another(3));
    }

    #[rstest]
    fn zero_attempts_still_sends_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };

        assert!(!policy.allows_another(1));
        assert!(!RetryPolicy::none().allows_another(1));
    }
}
