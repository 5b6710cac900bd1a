//! Per-submission surface frame record
//!
//! One SurfaceFrame describes a single application buffer submission:
//! immutable identity plus a mutex-guarded set of observed actuals the
//! producer fills in until submission. Classification runs once, driven by
//! the owning DisplayFrame when the present fence reconciles.
//!
//! Classification rules (presented × ready), applied only to frames in
//! `Presented` state with a valid prediction:
//!
//! - on-time present            → no jank
//! - early + on-time finish     → SF scheduling if the present lands a whole
//!                                vsync away, prediction error otherwise
//! - early + late finish        → unknown
//! - late + on-time finish      → parent's jank if any; else SF scheduling /
//!                                prediction error by vsync alignment
//! - late + late finish         → app deadline missed, OR-ed with the
//!                                parent display frame's jank if any
//!
//! A frame whose predicted deadline was at or before the previous latch is
//! additionally flagged as buffer stuffing.

use std::sync::Weak;

use parking_lot::Mutex;

use jankvue_trace::{FramePresentType, SurfaceFramePacket};

use crate::jank::JankType;
use crate::stats::JankStats;
use crate::types::{
    FramePresentMetadata, FrameReadyMetadata, JankThresholds, PredictionState, PresentState,
    TimelineItem, TraceToken, INVALID_TOKEN,
};

#[derive(Debug)]
struct SurfaceFrameState {
    actuals: TimelineItem,
    actual_queue_time_ns: i64,
    acquire_fence_time_ns: i64,
    present_state: PresentState,
    /// Latch time of the previous frame on this layer, recorded with the
    /// present state. Zero means unknown.
    last_latch_time_ns: i64,
    jank: JankType,
    present_metadata: FramePresentMetadata,
    ready_metadata: FrameReadyMetadata,
}

/// One application submission, owned by its DisplayFrame.
///
/// Producers may retain a handle for observation but must not mutate after
/// submitting the frame to the engine.
pub struct SurfaceFrame {
    token: TraceToken,
    owner_pid: i32,
    owner_uid: i32,
    layer_name: String,
    debug_name: String,
    prediction_state: PredictionState,
    predictions: TimelineItem,
    thresholds: JankThresholds,
    stats: Weak<dyn JankStats>,
    state: Mutex<SurfaceFrameState>,
}

impl SurfaceFrame {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        token: TraceToken,
        owner_pid: i32,
        owner_uid: i32,
        layer_name: String,
        debug_name: String,
        prediction_state: PredictionState,
        predictions: TimelineItem,
        thresholds: JankThresholds,
        stats: Weak<dyn JankStats>,
    ) -> Self {
        Self {
            token,
            owner_pid,
            owner_uid,
            layer_name,
            debug_name,
            prediction_state,
            predictions,
            thresholds,
            stats,
            state: Mutex::new(SurfaceFrameState {
                actuals: TimelineItem::default(),
                actual_queue_time_ns: 0,
                acquire_fence_time_ns: 0,
                present_state: PresentState::Unknown,
                last_latch_time_ns: 0,
                jank: JankType::empty(),
                present_metadata: FramePresentMetadata::UnknownPresent,
                ready_metadata: FrameReadyMetadata::UnknownFinish,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Producer mutators
    // ------------------------------------------------------------------

    pub fn set_actual_start_time(&self, start_time_ns: i64) {
        self.state.lock().actuals.start_ns = start_time_ns;
    }

    /// Record when the buffer was queued. The frame's end time is the later
    /// of queue time and acquire fence time, regardless of write order.
    pub fn set_actual_queue_time(&self, queue_time_ns: i64) {
        let mut state = self.state.lock();
        state.actual_queue_time_ns = queue_time_ns;
        state.actuals.end_ns = state.acquire_fence_time_ns.max(state.actual_queue_time_ns);
    }

    /// Record the acquire fence signal time.
    pub fn set_acquire_fence_time(&self, acquire_fence_time_ns: i64) {
        let mut state = self.state.lock();
        state.acquire_fence_time_ns = acquire_fence_time_ns;
        state.actuals.end_ns = state.acquire_fence_time_ns.max(state.actual_queue_time_ns);
    }

    /// Record the submission outcome. Set once; later calls are ignored.
    pub fn set_present_state(&self, present_state: PresentState, last_latch_time_ns: i64) {
        let mut state = self.state.lock();
        if state.present_state != PresentState::Unknown {
            tracing::warn!(
                layer = %self.layer_name,
                token = self.token,
                "present state already set, ignoring"
            );
            return;
        }
        state.present_state = present_state;
        state.last_latch_time_ns = last_latch_time_ns;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn token(&self) -> TraceToken {
        self.token
    }

    pub fn owner_pid(&self) -> i32 {
        self.owner_pid
    }

    pub fn owner_uid(&self) -> i32 {
        self.owner_uid
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }

    pub fn prediction_state(&self) -> PredictionState {
        self.prediction_state
    }

    pub fn predictions(&self) -> TimelineItem {
        self.predictions
    }

    pub fn actuals(&self) -> TimelineItem {
        self.state.lock().actuals
    }

    pub fn present_state(&self) -> PresentState {
        self.state.lock().present_state
    }

    pub fn jank_type(&self) -> JankType {
        self.state.lock().jank
    }

    pub fn present_metadata(&self) -> FramePresentMetadata {
        self.state.lock().present_metadata
    }

    pub fn ready_metadata(&self) -> FrameReadyMetadata {
        self.state.lock().ready_metadata
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    /// Classify this frame against the reconciled present time.
    ///
    /// Called by the owning DisplayFrame with its own jank mask and the
    /// vsync period of the cycle. Dropped and unknown frames are left
    /// untouched; their actual present time stays zero.
    pub fn on_present(&self, present_time_ns: i64, parent_jank: JankType, vsync_period_ns: i64) {
        let mut state = self.state.lock();

        if state.present_state != PresentState::Presented {
            return;
        }
        state.actuals.present_ns = present_time_ns;

        match self.prediction_state {
            PredictionState::None => return,
            PredictionState::Expired => {
                state.jank = JankType::UNKNOWN;
                state.present_metadata = FramePresentMetadata::UnknownPresent;
                state.ready_metadata = FrameReadyMetadata::UnknownFinish;
                let uid = self.owner_uid;
                let jank = state.jank;
                drop(state);
                self.report_layer_jank(uid, jank);
                return;
            }
            PredictionState::Valid => {}
        }

        let present_delta = state.actuals.present_ns - self.predictions.present_ns;
        let deadline_delta = state.actuals.end_ns - self.predictions.end_ns;
        let delta_to_vsync = if vsync_period_ns > 0 {
            present_delta.abs() % vsync_period_ns
        } else {
            0
        };

        state.ready_metadata = if deadline_delta > self.thresholds.deadline_threshold_ns {
            FrameReadyMetadata::LateFinish
        } else {
            FrameReadyMetadata::OnTimeFinish
        };

        state.present_metadata = if present_delta.abs() <= self.thresholds.present_threshold_ns {
            FramePresentMetadata::OnTimePresent
        } else if present_delta > 0 {
            FramePresentMetadata::LatePresent
        } else {
            FramePresentMetadata::EarlyPresent
        };

        let near_vsync_boundary = vsync_period_ns > 0
            && (delta_to_vsync < self.thresholds.present_threshold_ns
                || delta_to_vsync >= vsync_period_ns - self.thresholds.present_threshold_ns);

        state.jank = match (state.present_metadata, state.ready_metadata) {
            (FramePresentMetadata::OnTimePresent, _) => JankType::empty(),
            (FramePresentMetadata::EarlyPresent, FrameReadyMetadata::OnTimeFinish) => {
                if near_vsync_boundary {
                    JankType::SF_SCHEDULING
                } else {
                    JankType::PREDICTION_ERROR
                }
            }
            (FramePresentMetadata::EarlyPresent, _) => JankType::UNKNOWN,
            (FramePresentMetadata::LatePresent, FrameReadyMetadata::OnTimeFinish) => {
                if !parent_jank.is_empty() {
                    parent_jank
                } else if near_vsync_boundary {
                    JankType::SF_SCHEDULING
                } else {
                    JankType::PREDICTION_ERROR
                }
            }
            (FramePresentMetadata::LatePresent, _) => {
                // The app overran its deadline; any compositor fault in the
                // same cycle rides along in the mask.
                parent_jank | JankType::APP_DEADLINE_MISSED
            }
            (FramePresentMetadata::UnknownPresent, _) => JankType::UNKNOWN,
        };

        // The app queued this frame before the previous one latched.
        if state.last_latch_time_ns != 0 && self.predictions.end_ns <= state.last_latch_time_ns {
            state.jank |= JankType::BUFFER_STUFFING;
        }

        let uid = self.owner_uid;
        let jank = state.jank;
        drop(state);
        self.report_layer_jank(uid, jank);
    }

    fn report_layer_jank(&self, uid: i32, jank: JankType) {
        if let Some(stats) = self.stats.upgrade() {
            stats.increment_janky_frames_for_layer(uid, &self.layer_name, jank);
        }
    }

    // ------------------------------------------------------------------
    // Trace emission
    // ------------------------------------------------------------------

    /// Build the wire packet for this frame, joined to its display frame.
    ///
    /// Frames without a token produced no prediction and are not traced.
    pub fn to_packet(
        &self,
        display_frame_token: TraceToken,
        gpu_composition: bool,
    ) -> Option<SurfaceFramePacket> {
        if self.token == INVALID_TOKEN || display_frame_token == INVALID_TOKEN {
            return None;
        }
        let state = self.state.lock();
        let present_type = match state.present_state {
            PresentState::Dropped => FramePresentType::Dropped,
            PresentState::Unknown => FramePresentType::Unspecified,
            PresentState::Presented => match state.present_metadata {
                FramePresentMetadata::OnTimePresent => FramePresentType::OnTime,
                FramePresentMetadata::EarlyPresent => FramePresentType::Early,
                FramePresentMetadata::LatePresent => FramePresentType::Late,
                FramePresentMetadata::UnknownPresent => FramePresentType::Unspecified,
            },
        };
        Some(SurfaceFramePacket {
            token: self.token,
            display_frame_token,
            present_type,
            on_time_finish: state.ready_metadata == FrameReadyMetadata::OnTimeFinish,
            gpu_composition,
            jank_type: state.jank.to_proto(),
            jank_mask: state.jank.bits(),
            expected_start_ns: self.predictions.start_ns,
            expected_end_ns: self.predictions.end_ns,
            actual_start_ns: state.actuals.start_ns,
            actual_end_ns: state.actuals.end_ns,
            layer_name: self.layer_name.clone(),
            pid: self.owner_pid,
        })
    }
}

impl std::fmt::Debug for SurfaceFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceFrame")
            .field("token", &self.token)
            .field("layer_name", &self.layer_name)
            .field("prediction_state", &self.prediction_state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    include!("surface_frame_test.rs");
}
