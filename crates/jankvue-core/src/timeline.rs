//! Frame timeline engine
//!
//! Central coordinator for the whole pipeline: owns the TokenManager, the
//! DisplayFrame currently being built, a bounded deque of finalized frames,
//! and the FIFO of present fences awaiting hardware signal.
//!
//! Reconciliation is poll-driven. The engine never sleeps on a fence;
//! every `set_sf_present` closes the current cycle and sweeps the head of
//! the pending FIFO, classifying and tracing each frame whose fence has
//! signaled. The sweep stops at the first pending fence so frames are
//! always observed in completion order.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use jankvue_trace::TraceSink;

use crate::clock::MonotonicClock;
use crate::display_frame::DisplayFrame;
use crate::fence::{PresentFence, SIGNAL_TIME_INVALID, SIGNAL_TIME_PENDING};
use crate::stats::JankStats;
use crate::surface_frame::SurfaceFrame;
use crate::token_manager::TokenManager;
use crate::types::{
    JankThresholds, PredictionState, PresentState, TimelineItem, TraceToken, INVALID_TOKEN,
};

/// Default retention bound for finalized display frames.
pub const DEFAULT_MAX_DISPLAY_FRAMES: usize = 64;

/// Reconciliation mutates finalized frames after producers release them,
/// so retained frames are shared behind a per-frame mutex.
pub type SharedDisplayFrame = Arc<Mutex<DisplayFrame>>;

struct PendingPresent {
    fence: Arc<dyn PresentFence>,
    frame: SharedDisplayFrame,
}

struct TimelineState {
    current: SharedDisplayFrame,
    finalized: VecDeque<SharedDisplayFrame>,
    pending_fences: VecDeque<PendingPresent>,
    max_display_frames: usize,
}

/// The frame timeline engine.
///
/// All operations are constant-time appends or bounded sweeps; nothing on
/// the producer path performs I/O or blocks on hardware.
pub struct FrameTimeline {
    token_manager: TokenManager,
    clock: Arc<dyn MonotonicClock>,
    stats: Arc<dyn JankStats>,
    sink: Arc<dyn TraceSink>,
    /// Compositor pid stamped on display-frame packets.
    sf_pid: i32,
    thresholds: JankThresholds,
    state: Mutex<TimelineState>,
}

impl FrameTimeline {
    pub fn new(
        clock: Arc<dyn MonotonicClock>,
        stats: Arc<dyn JankStats>,
        sink: Arc<dyn TraceSink>,
        sf_pid: i32,
        thresholds: JankThresholds,
    ) -> Self {
        let current = Arc::new(Mutex::new(DisplayFrame::new(
            thresholds,
            Arc::downgrade(&stats),
        )));
        Self {
            token_manager: TokenManager::new(clock.clone()),
            clock,
            stats,
            sink,
            sf_pid,
            thresholds,
            state: Mutex::new(TimelineState {
                current,
                finalized: VecDeque::with_capacity(DEFAULT_MAX_DISPLAY_FRAMES),
                pending_fences: VecDeque::new(),
                max_display_frames: DEFAULT_MAX_DISPLAY_FRAMES,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Producer API
    // ------------------------------------------------------------------

    /// Mint a token for a predicted timeline.
    pub fn generate_token(&self, predictions: TimelineItem) -> TraceToken {
        self.token_manager.generate_token(predictions)
    }

    /// Build a SurfaceFrame, resolving the token against retained
    /// predictions.
    pub fn create_surface_frame_for_token(
        &self,
        token: Option<TraceToken>,
        owner_pid: i32,
        owner_uid: i32,
        layer_name: String,
        debug_name: String,
    ) -> Arc<SurfaceFrame> {
        let (token, prediction_state, predictions) = match token {
            None => (INVALID_TOKEN, PredictionState::None, TimelineItem::default()),
            Some(token) => match self.token_manager.predictions_for_token(token) {
                Some(predictions) => (token, PredictionState::Valid, predictions),
                None => (token, PredictionState::Expired, TimelineItem::default()),
            },
        };
        Arc::new(SurfaceFrame::new(
            token,
            owner_pid,
            owner_uid,
            layer_name,
            debug_name,
            prediction_state,
            predictions,
            self.thresholds,
            Arc::downgrade(&self.stats),
        ))
    }

    /// Attach a submitted frame to the cycle being built.
    ///
    /// The producer must not mutate the frame after this call.
    pub fn add_surface_frame(&self, frame: Arc<SurfaceFrame>) {
        let state = self.state.lock();
        state.current.lock().add_surface_frame(frame);
    }

    /// Initialize the current cycle's predictions and wake time.
    pub fn set_sf_wake_up(&self, token: TraceToken, wake_time_ns: i64, vsync_period_ns: i64) {
        let predictions = self.token_manager.predictions_for_token(token);
        let state = self.state.lock();
        state
            .current
            .lock()
            .on_sf_wake_up(token, vsync_period_ns, predictions, wake_time_ns);
    }

    /// Close the current cycle: record its end time, queue it for fence
    /// reconciliation, sweep already-signaled fences, and start a new
    /// cycle.
    pub fn set_sf_present(
        &self,
        present_time_ns: i64,
        present_fence: Arc<dyn PresentFence>,
        gpu_fence: Option<Arc<dyn PresentFence>>,
    ) {
        let ready = {
            let mut state = self.state.lock();

            {
                let mut current = state.current.lock();
                current.set_actual_end_time(present_time_ns);
                if let Some(gpu_fence) = gpu_fence {
                    current.set_gpu_fence(gpu_fence);
                }
            }

            let closing = state.current.clone();
            state.pending_fences.push_back(PendingPresent {
                fence: present_fence,
                frame: closing.clone(),
            });

            let ready = Self::drain_signaled_locked(&mut state);

            // Finalize: retire the closed cycle and open the next one.
            state.finalized.push_back(closing);
            while state.finalized.len() > state.max_display_frames {
                state.finalized.pop_front();
            }
            state.current = Arc::new(Mutex::new(DisplayFrame::new(
                self.thresholds,
                Arc::downgrade(&self.stats),
            )));
            ready
        };

        // Classification and trace run outside the engine lock; the frames
        // were removed from the FIFO in order on this thread.
        for (signal_time_ns, frame) in ready {
            let mut frame = frame.lock();
            frame.on_present(signal_time_ns);
            frame.trace(self.sink.as_ref(), self.sf_pid, self.clock.now_ns());
        }
    }

    /// Pop the prefix of the pending FIFO whose fences have resolved.
    ///
    /// Invalid fences are dropped without classification; the sweep stops
    /// at the first still-pending fence to preserve completion order.
    fn drain_signaled_locked(state: &mut TimelineState) -> Vec<(i64, SharedDisplayFrame)> {
        let mut ready = Vec::new();
        loop {
            let signal_time_ns = match state.pending_fences.front() {
                Some(pending) => pending.fence.signal_time(),
                None => break,
            };
            if signal_time_ns == SIGNAL_TIME_PENDING {
                break;
            }
            if let Some(pending) = state.pending_fences.pop_front() {
                if signal_time_ns != SIGNAL_TIME_INVALID {
                    ready.push((signal_time_ns, pending.frame));
                }
            }
        }
        ready
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Resize the retention bound. Destructive: clears retained frames and
    /// all in-flight reconciliation state.
    pub fn set_max_display_frames(&self, max_display_frames: usize) {
        let mut state = self.state.lock();
        state.finalized.clear();
        state.pending_fences.clear();
        state.max_display_frames = max_display_frames;
    }

    /// Restore the default retention bound.
    pub fn reset(&self) {
        self.set_max_display_frames(DEFAULT_MAX_DISPLAY_FRAMES);
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    pub fn token_manager(&self) -> &TokenManager {
        &self.token_manager
    }

    /// Number of retained finalized frames.
    pub fn display_frame_count(&self) -> usize {
        self.state.lock().finalized.len()
    }

    /// Handle to the idx-th oldest retained frame.
    pub fn display_frame(&self, idx: usize) -> Option<SharedDisplayFrame> {
        self.state.lock().finalized.get(idx).cloned()
    }

    /// Snapshot of all retained frames, oldest first.
    pub(crate) fn retained_frames(&self) -> Vec<SharedDisplayFrame> {
        self.state.lock().finalized.iter().cloned().collect()
    }

    /// Average observed fps across the named layers' presented frames.
    ///
    /// Consecutive submissions sharing a present time (multiple layers on
    /// one vsync) count once. Returns 0.0 with fewer than two samples.
    pub fn compute_fps(&self, layer_names: &[&str]) -> f32 {
        let frames = self.retained_frames();
        let mut present_times: Vec<i64> = Vec::new();
        for frame in frames {
            let frame = frame.lock();
            for surface_frame in frame.surface_frames() {
                if !layer_names.contains(&surface_frame.layer_name()) {
                    continue;
                }
                if surface_frame.present_state() != PresentState::Presented {
                    continue;
                }
                let present_ns = surface_frame.actuals().present_ns;
                if present_ns == 0 || present_times.last() == Some(&present_ns) {
                    continue;
                }
                present_times.push(present_ns);
            }
        }
        if present_times.len() < 2 {
            return 0.0;
        }
        let span_ns = present_times.last().unwrap() - present_times.first().unwrap();
        if span_ns <= 0 {
            return 0.0;
        }
        (present_times.len() - 1) as f32 * 1e9 / span_ns as f32
    }
}

#[cfg(test)]
mod tests {
    include!("timeline_test.rs");
}
