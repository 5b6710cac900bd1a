//! Present fence interface
//!
//! The engine consumes hardware fences through this trait only. A fence
//! reports either a positive signal timestamp, [`SIGNAL_TIME_PENDING`]
//! while the hardware has not signaled, or [`SIGNAL_TIME_INVALID`] when no
//! present time will ever be observed for the frame.

use std::sync::Arc;

use parking_lot::Mutex;

/// The fence has not signaled yet.
pub const SIGNAL_TIME_PENDING: i64 = i64::MAX;

/// The fence will never produce a present time.
pub const SIGNAL_TIME_INVALID: i64 = -1;

/// Consumer-side view of a hardware present fence.
pub trait PresentFence: Send + Sync {
    /// Poll the signal time. Never blocks.
    fn signal_time(&self) -> i64;

    fn is_valid(&self) -> bool {
        self.signal_time() != SIGNAL_TIME_INVALID
    }
}

/// Fence whose signal time is set by the test or replay harness.
///
/// Starts pending; [`signal_at`](Self::signal_at) flips it to a concrete
/// timestamp, [`invalidate`](Self::invalidate) to the invalid sentinel.
#[derive(Debug)]
pub struct ManualFence {
    signal_time_ns: Mutex<i64>,
}

impl ManualFence {
    pub fn pending() -> Arc<Self> {
        Arc::new(Self {
            signal_time_ns: Mutex::new(SIGNAL_TIME_PENDING),
        })
    }

    pub fn signaled(signal_time_ns: i64) -> Arc<Self> {
        Arc::new(Self {
            signal_time_ns: Mutex::new(signal_time_ns),
        })
    }

    pub fn signal_at(&self, signal_time_ns: i64) {
        *self.signal_time_ns.lock() = signal_time_ns;
    }

    pub fn invalidate(&self) {
        *self.signal_time_ns.lock() = SIGNAL_TIME_INVALID;
    }
}

impl PresentFence for ManualFence {
    fn signal_time(&self) -> i64 {
        *self.signal_time_ns.lock()
    }
}
