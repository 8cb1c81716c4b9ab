use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 2_000;

/// Bounded retry budget with doubling backoff: `base * 2^retry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Policy that fails on the first error.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        let multiplier = 1_u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(multiplier)
    }

    /// Delay before retry number `retry + 1`, or `None` once the budget is spent.
    pub fn next_delay(&self, retry: u32) -> Option<Duration> {
        (retry < self.max_retries).then(|| self.delay_for_attempt(retry))
    }

    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries)
            .map(|retry| self.delay_for_attempt(retry))
            .collect()
    }

    pub fn total_delay(&self) -> Duration {
        self.schedule()
            .into_iter()
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_RETRIES,
            Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_doubles_from_two_seconds() {
        let secs: Vec<u64> = RetryPolicy::default()
            .schedule()
            .iter()
            .map(Duration::as_secs)
            .collect();
        assert_eq!(secs, vec![2, 4, 8, 16, 32]);
        assert_eq!(RetryPolicy::default().total_delay(), Duration::from_secs(62));
    }

    #[test]
    fn test_budget_is_bounded() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.next_delay(0), Some(Duration::from_secs(2)));
        assert_eq!(policy.next_delay(4), Some(Duration::from_secs(32)));
        assert_eq!(policy.next_delay(5), None);
    }

    #[test]
    fn test_none_never_retries() {
        assert_eq!(RetryPolicy::none().next_delay(0), None);
        assert!(RetryPolicy::none().schedule().is_empty());
    }

    #[test]
    fn test_large_attempts_saturate() {
        let policy = RetryPolicy::new(64, Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_secs(u32::MAX as u64));
    }
}
