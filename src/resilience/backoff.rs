//! Delay between retry attempts.

use std::time::Duration;
use rand::Rng;

/// Exponential schedule: the delay after failed attempt `n` (1-based) is
/// `base * 2^(n-1)`, capped at `max`, plus up to 10% random jitter so that
/// concurrent retries against the same service spread out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// Delay without jitter.
    pub fn ceiling(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_ms.saturating_mul(factor).min(self.max_ms))
    }

    /// Delay to sleep after failed attempt `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let ceiling = self.ceiling(attempt);
        let spread = ceiling.as_millis() as u64 / 10;
        if spread == 0 {
            return ceiling;
        }
        ceiling + Duration::from_millis(rand::thread_rng().gen_range(0..spread))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubles_until_capped() {
        let backoff = Backoff::new(100, 1000);
        assert_eq!(backoff.ceiling(1), Duration::from_millis(100));
        assert_eq!(backoff.ceiling(2), Duration::from_millis(200));
        assert_eq!(backoff.ceiling(4), Duration::from_millis(800));
        assert_eq!(backoff.ceiling(5), Duration::from_millis(1000));
        assert_eq!(backoff.ceiling(64), Duration::from_millis(1000));
        assert_eq!(backoff.ceiling(0), Duration::ZERO);
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let backoff = Backoff::new(200, 5000);
        for _ in 0..50 {
            let delay = backoff.delay(2).as_millis();
            assert!((400..440).contains(&delay), "delay {}ms out of range", delay);
        }
    }

    #[test]
    fn test_small_delays_have_no_jitter() {
        assert_eq!(Backoff::new(5, 5).delay(3), Duration::from_millis(5));
    }
}
