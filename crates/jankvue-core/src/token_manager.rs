//! Token minting and prediction retention
//!
//! Every predicted frame timeline gets a strictly increasing token.
//! Predictions are retained for [`MAX_RETENTION_TIME_NS`]; eviction is
//! lazy, run from the head of the map on each mint. Tokens are stamped
//! with a monotonic clock, so insertion order doubles as age order.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::clock::MonotonicClock;
use crate::types::{TimelineItem, TraceToken};

/// How long a prediction outlives its mint before eviction (120 ms).
pub const MAX_RETENTION_TIME_NS: i64 = 120_000_000;

#[derive(Debug, Clone, Copy)]
struct RetainedPrediction {
    minted_at_ns: i64,
    predictions: TimelineItem,
}

#[derive(Debug)]
struct TokenManagerState {
    next_token: TraceToken,
    predictions: BTreeMap<TraceToken, RetainedPrediction>,
}

/// Registry of outstanding timeline predictions.
pub struct TokenManager {
    state: Mutex<TokenManagerState>,
    clock: Arc<dyn MonotonicClock>,
}

impl TokenManager {
    pub fn new(clock: Arc<dyn MonotonicClock>) -> Self {
        Self {
            state: Mutex::new(TokenManagerState {
                // Start at 1 so INVALID_TOKEN (-1) and 0 are never minted.
                next_token: 1,
                predictions: BTreeMap::new(),
            }),
            clock,
        }
    }

    /// Mint a token bound to `predictions`, sweeping expired entries.
    pub fn generate_token(&self, predictions: TimelineItem) -> TraceToken {
        let now_ns = self.clock.now_ns();
        let mut state = self.state.lock();

        let token = state.next_token;
        state.next_token += 1;

        Self::flush_locked(&mut state, now_ns);
        state.predictions.insert(
            token,
            RetainedPrediction {
                minted_at_ns: now_ns,
                predictions,
            },
        );
        token
    }

    /// Look up the retained prediction for `token`.
    pub fn predictions_for_token(&self, token: TraceToken) -> Option<TimelineItem> {
        self.state
            .lock()
            .predictions
            .get(&token)
            .map(|p| p.predictions)
    }

    /// Evict every prediction older than the retention window relative to
    /// `reference_time_ns`.
    pub fn flush_tokens(&self, reference_time_ns: i64) {
        let mut state = self.state.lock();
        Self::flush_locked(&mut state, reference_time_ns);
    }

    /// Number of retained predictions.
    pub fn len(&self) -> usize {
        self.state.lock().predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn flush_locked(state: &mut TokenManagerState, reference_time_ns: i64) {
        // Tokens are minted with monotonic timestamps, so the oldest entry
        // is always at the head of the map.
        while let Some((&token, retained)) = state.predictions.iter().next() {
            if reference_time_ns - retained.minted_at_ns < MAX_RETENTION_TIME_NS {
                break;
            }
            state.predictions.remove(&token);
        }
    }
}

#[cfg(test)]
mod tests {
    include!("token_manager_test.rs");
}
