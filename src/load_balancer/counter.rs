//! Process-wide request counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing ticket source shared by every in-flight request.
///
/// `next` increments with a single atomic fetch-and-add and hands out the
/// incremented value, so no two callers ever share a ticket. The counter wraps
/// to zero after `u64::MAX`.
#[derive(Debug, Default)]
pub struct RequestCounter {
    value: AtomicU64,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter holding `initial`; the first ticket is `initial + 1`.
    pub fn starting_at(initial: u64) -> Self {
        Self {
            value: AtomicU64::new(initial),
        }
    }

    /// Increment, then return the new value as this caller's ticket.
    pub fn next(&self) -> u64 {
        self.value.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Current value (the most recently issued ticket).
    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}
