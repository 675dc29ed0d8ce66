//! # Exponential Backoff
//!
//! Retry delays for failed reconciliations: 5s, 10s, 20s, ... capped at 5m.
//! Each GameServer keeps its own sequence, dropped after a successful pass.

use std::time::Duration;

/// First retry delay after a failure
pub const ERROR_BACKOFF_MIN_SECS: u64 = 5;
/// Ceiling for the retry delay
pub const ERROR_BACKOFF_MAX_SECS: u64 = 300;

/// Exponential backoff calculator
///
/// Doubles the delay on every call to `next_backoff_seconds()` until it hits
/// `max_seconds`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    current_seconds: u64,
    max_seconds: u64,
}

impl ExponentialBackoff {
    #[must_use]
    pub fn new(min_seconds: u64, max_seconds: u64) -> Self {
        Self {
            current_seconds: min_seconds.min(max_seconds),
            max_seconds,
        }
    }

    /// Get the next backoff duration in seconds and advance the sequence
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let result = self.current_seconds;
        self.current_seconds = self.current_seconds.saturating_mul(2).min(self.max_seconds);
        result
    }

    /// Get the next backoff duration as a `Duration` and advance the sequence
    #[must_use]
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_secs(self.next_backoff_seconds())
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(ERROR_BACKOFF_MIN_SECS, ERROR_BACKOFF_MAX_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff_sequence() {
        let mut backoff = ExponentialBackoff::default();

        assert_eq!(backoff.next_backoff_seconds(), 5);
        assert_eq!(backoff.next_backoff_seconds(), 10);
        assert_eq!(backoff.next_backoff_seconds(), 20);
        assert_eq!(backoff.next_backoff_seconds(), 40);
        assert_eq!(backoff.next_backoff_seconds(), 80);
        assert_eq!(backoff.next_backoff_seconds(), 160);
        assert_eq!(backoff.next_backoff_seconds(), 300); // capped
    }

    #[test]
    fn test_exponential_backoff_max_cap() {
        let mut backoff = ExponentialBackoff::new(5, 300);
        for _ in 0..6 {
            backoff.next_backoff_seconds();
        }

        assert_eq!(backoff.next_backoff_seconds(), 300);
        assert_eq!(backoff.next_backoff_seconds(), 300);
        assert_eq!(backoff.next_backoff(), Duration::from_secs(300));
    }

    #[test]
    fn test_min_above_max_is_capped() {
        let mut backoff = ExponentialBackoff::new(600, 300);

        assert_eq!(backoff.next_backoff_seconds(), 300);
        assert_eq!(backoff.next_backoff_seconds(), 300);
    }
}
