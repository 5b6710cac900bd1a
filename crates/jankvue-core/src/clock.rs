//! Monotonic clock abstraction
//!
//! The engine stamps tokens and trace packets with a monotonic nanosecond
//! clock. Injecting the clock keeps token retention and the end-to-end
//! scenarios deterministic under test.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

/// Source of monotonic nanosecond timestamps.
pub trait MonotonicClock: Send + Sync {
    fn now_ns(&self) -> i64;
}

/// Process clock anchored at construction time.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_ns(&self) -> i64 {
        self.origin.elapsed().as_nanos() as i64
    }
}

/// Manually advanced clock for tests and replays.
///
/// Never moves on its own; callers drive it with [`set_ns`](Self::set_ns)
/// and [`advance_ns`](Self::advance_ns).
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ns: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ns: i64) -> Self {
        Self {
            now_ns: AtomicI64::new(start_ns),
        }
    }

    pub fn set_ns(&self, now_ns: i64) {
        self.now_ns.store(now_ns, Ordering::SeqCst);
    }

    pub fn advance_ns(&self, delta_ns: i64) {
        self.now_ns.fetch_add(delta_ns, Ordering::SeqCst);
    }
}

impl MonotonicClock for ManualClock {
    fn now_ns(&self) -> i64 {
        self.now_ns.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    include!("clock_test.rs");
}
