//! Per-vsync-cycle display frame record
//!
//! A DisplayFrame covers one compositor cycle: the compositor's own
//! predicted and observed timeline plus the SurfaceFrames composited into
//! it, in submission order. When the present fence reconciles, the frame
//! classifies itself first and then drives classification of every
//! contained SurfaceFrame, passing its own jank mask down so compositor
//! faults propagate into app frames that were merely caught in the cycle.

use std::sync::{Arc, Weak};

use jankvue_trace::{
    DisplayFramePacket, FramePresentType, FrameTimelineEvent, TraceSink, TraceSinkExt,
};

use crate::fence::{PresentFence, SIGNAL_TIME_INVALID, SIGNAL_TIME_PENDING};
use crate::jank::JankType;
use crate::stats::JankStats;
use crate::surface_frame::SurfaceFrame;
use crate::types::{
    FramePresentMetadata, FrameReadyMetadata, FrameStartMetadata, JankThresholds, PredictionState,
    TimelineItem, TraceToken, INVALID_TOKEN,
};

/// One compositor vsync cycle and the submissions it composited.
pub struct DisplayFrame {
    token: TraceToken,
    vsync_period_ns: i64,
    prediction_state: PredictionState,
    predictions: TimelineItem,
    actuals: TimelineItem,
    /// GPU completion fence when this cycle used GPU composition.
    gpu_fence: Option<Arc<dyn PresentFence>>,
    surface_frames: Vec<Arc<SurfaceFrame>>,
    jank: JankType,
    present_metadata: FramePresentMetadata,
    ready_metadata: FrameReadyMetadata,
    start_metadata: FrameStartMetadata,
    thresholds: JankThresholds,
    stats: Weak<dyn JankStats>,
}

impl DisplayFrame {
    pub fn new(thresholds: JankThresholds, stats: Weak<dyn JankStats>) -> Self {
        Self {
            token: INVALID_TOKEN,
            vsync_period_ns: 0,
            prediction_state: PredictionState::None,
            predictions: TimelineItem::default(),
            actuals: TimelineItem::default(),
            gpu_fence: None,
            surface_frames: Vec::new(),
            jank: JankType::empty(),
            present_metadata: FramePresentMetadata::UnknownPresent,
            ready_metadata: FrameReadyMetadata::UnknownFinish,
            start_metadata: FrameStartMetadata::UnknownStart,
            thresholds,
            stats,
        }
    }

    // ------------------------------------------------------------------
    // Cycle bookkeeping
    // ------------------------------------------------------------------

    /// Populate the cycle's predictions when the compositor wakes.
    ///
    /// A token with no retained prediction marks the frame `Expired`; the
    /// invalid token means no prediction was ever requested.
    pub fn on_sf_wake_up(
        &mut self,
        token: TraceToken,
        vsync_period_ns: i64,
        predictions: Option<TimelineItem>,
        wake_time_ns: i64,
    ) {
        self.token = token;
        self.vsync_period_ns = vsync_period_ns;
        match predictions {
            Some(predictions) if token != INVALID_TOKEN => {
                self.prediction_state = PredictionState::Valid;
                self.predictions = predictions;
            }
            _ if token != INVALID_TOKEN => {
                self.prediction_state = PredictionState::Expired;
            }
            _ => {
                self.prediction_state = PredictionState::None;
            }
        }
        self.actuals.start_ns = wake_time_ns;
    }

    /// Append a submission. Submission order is preserved through
    /// reconciliation and trace.
    pub fn add_surface_frame(&mut self, frame: Arc<SurfaceFrame>) {
        self.surface_frames.push(frame);
    }

    /// Record when the compositor's CPU work for this cycle finished.
    pub fn set_actual_end_time(&mut self, end_time_ns: i64) {
        self.actuals.end_ns = end_time_ns;
    }

    /// Attach the GPU completion fence for a GPU-composited cycle.
    pub fn set_gpu_fence(&mut self, fence: Arc<dyn PresentFence>) {
        self.gpu_fence = Some(fence);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn token(&self) -> TraceToken {
        self.token
    }

    pub fn vsync_period_ns(&self) -> i64 {
        self.vsync_period_ns
    }

    pub fn prediction_state(&self) -> PredictionState {
        self.prediction_state
    }

    pub fn predictions(&self) -> TimelineItem {
        self.predictions
    }

    pub fn actuals(&self) -> TimelineItem {
        self.actuals
    }

    pub fn surface_frames(&self) -> &[Arc<SurfaceFrame>] {
        &self.surface_frames
    }

    pub fn jank_type(&self) -> JankType {
        self.jank
    }

    pub fn present_metadata(&self) -> FramePresentMetadata {
        self.present_metadata
    }

    pub fn ready_metadata(&self) -> FrameReadyMetadata {
        self.ready_metadata
    }

    pub fn start_metadata(&self) -> FrameStartMetadata {
        self.start_metadata
    }

    pub fn gpu_composition(&self) -> bool {
        self.gpu_fence.is_some()
    }

    /// Whether this cycle or any contained submission classified as janky.
    pub fn has_jank(&self) -> bool {
        !self.jank.is_empty() || self.surface_frames.iter().any(|f| !f.jank_type().is_empty())
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    /// Reconcile the hardware present time and classify this cycle, then
    /// every contained SurfaceFrame.
    pub fn on_present(&mut self, signal_time_ns: i64) {
        self.actuals.present_ns = signal_time_ns;

        // A signaled GPU fence moves the cycle's effective end time.
        if let Some(gpu_fence) = &self.gpu_fence {
            let gpu_signal = gpu_fence.signal_time();
            if gpu_signal != SIGNAL_TIME_PENDING && gpu_signal != SIGNAL_TIME_INVALID {
                self.actuals.end_ns = self.actuals.end_ns.max(gpu_signal);
            }
        }

        match self.prediction_state {
            PredictionState::None => {}
            PredictionState::Expired => {
                self.jank = JankType::UNKNOWN;
                self.present_metadata = FramePresentMetadata::UnknownPresent;
                self.ready_metadata = FrameReadyMetadata::UnknownFinish;
                self.start_metadata = FrameStartMetadata::UnknownStart;
                self.report_jank();
            }
            PredictionState::Valid => {
                self.classify();
                self.report_jank();
            }
        }

        let parent_jank = self.jank;
        let vsync_period_ns = self.vsync_period_ns;
        for frame in &self.surface_frames {
            frame.on_present(signal_time_ns, parent_jank, vsync_period_ns);
        }
    }

    fn classify(&mut self) {
        let present_delta = self.actuals.present_ns - self.predictions.present_ns;
        let deadline_delta = self.actuals.end_ns - self.predictions.end_ns;
        let delta_to_vsync = if self.vsync_period_ns > 0 {
            present_delta.abs() % self.vsync_period_ns
        } else {
            0
        };

        self.start_metadata = if self.actuals.start_ns == 0 || self.predictions.start_ns == 0 {
            FrameStartMetadata::UnknownStart
        } else {
            let start_delta = self.actuals.start_ns - self.predictions.start_ns;
            if start_delta.abs() <= self.thresholds.start_threshold_ns {
                FrameStartMetadata::OnTimeStart
            } else if start_delta > 0 {
                FrameStartMetadata::LateStart
            } else {
                FrameStartMetadata::EarlyStart
            }
        };

        self.ready_metadata = if self.actuals.end_ns == 0 {
            FrameReadyMetadata::UnknownFinish
        } else if deadline_delta > self.thresholds.deadline_threshold_ns {
            FrameReadyMetadata::LateFinish
        } else {
            FrameReadyMetadata::OnTimeFinish
        };

        self.present_metadata = if self.actuals.present_ns == 0 {
            FramePresentMetadata::UnknownPresent
        } else if present_delta.abs() <= self.thresholds.present_threshold_ns {
            FramePresentMetadata::OnTimePresent
        } else if present_delta > 0 {
            FramePresentMetadata::LatePresent
        } else {
            FramePresentMetadata::EarlyPresent
        };

        let near_vsync_boundary = self.vsync_period_ns > 0
            && (delta_to_vsync < self.thresholds.present_threshold_ns
                || delta_to_vsync >= self.vsync_period_ns - self.thresholds.present_threshold_ns);

        self.jank = match (self.present_metadata, self.ready_metadata) {
            (FramePresentMetadata::OnTimePresent, _) => JankType::empty(),
            (FramePresentMetadata::EarlyPresent, FrameReadyMetadata::OnTimeFinish) => {
                if near_vsync_boundary {
                    JankType::SF_SCHEDULING
                } else {
                    JankType::PREDICTION_ERROR
                }
            }
            (FramePresentMetadata::EarlyPresent, FrameReadyMetadata::LateFinish) => {
                JankType::SF_SCHEDULING
            }
            (FramePresentMetadata::EarlyPresent, FrameReadyMetadata::UnknownFinish) => {
                JankType::UNKNOWN
            }
            (FramePresentMetadata::LatePresent, FrameReadyMetadata::OnTimeFinish) => {
                if near_vsync_boundary {
                    JankType::DISPLAY_HAL
                } else {
                    JankType::PREDICTION_ERROR
                }
            }
            (FramePresentMetadata::LatePresent, FrameReadyMetadata::LateFinish) => {
                if self.gpu_composition() {
                    JankType::SF_GPU_DEADLINE_MISSED
                } else {
                    JankType::SF_CPU_DEADLINE_MISSED
                }
            }
            (FramePresentMetadata::LatePresent, FrameReadyMetadata::UnknownFinish) => {
                JankType::UNKNOWN
            }
            (FramePresentMetadata::UnknownPresent, _) => JankType::UNKNOWN,
        };
    }

    fn report_jank(&self) {
        if let Some(stats) = self.stats.upgrade() {
            stats.increment_janky_frames(self.jank);
        }
    }

    // ------------------------------------------------------------------
    // Trace emission
    // ------------------------------------------------------------------

    /// Emit this frame and its SurfaceFrames on the sink, one packet each.
    ///
    /// A frame with no token produced no prediction and is skipped
    /// entirely, contained frames included.
    pub fn trace(&self, sink: &dyn TraceSink, sf_pid: i32, timestamp_ns: i64) {
        if self.token == INVALID_TOKEN {
            return;
        }

        let present_type = match self.present_metadata {
            FramePresentMetadata::OnTimePresent => FramePresentType::OnTime,
            FramePresentMetadata::EarlyPresent => FramePresentType::Early,
            FramePresentMetadata::LatePresent => FramePresentType::Late,
            FramePresentMetadata::UnknownPresent => FramePresentType::Unspecified,
        };

        let mut builder = sink.new_trace_packet();
        builder.set_timestamp(timestamp_ns).set_frame_timeline_event(
            FrameTimelineEvent::DisplayFrame(DisplayFramePacket {
                token: self.token,
                present_type,
                on_time_finish: self.ready_metadata == FrameReadyMetadata::OnTimeFinish,
                gpu_composition: self.gpu_composition(),
                jank_type: self.jank.to_proto(),
                jank_mask: self.jank.bits(),
                expected_start_ns: self.predictions.start_ns,
                expected_end_ns: self.predictions.end_ns,
                actual_start_ns: self.actuals.start_ns,
                actual_end_ns: self.actuals.end_ns,
                pid: sf_pid,
            }),
        );
        builder.finish();

        for frame in &self.surface_frames {
            if let Some(packet) = frame.to_packet(self.token, self.gpu_composition()) {
                let mut builder = sink.new_trace_packet();
                builder
                    .set_timestamp(timestamp_ns)
                    .set_frame_timeline_event(FrameTimelineEvent::SurfaceFrame(packet));
                builder.finish();
            }
        }
    }
}

impl std::fmt::Debug for DisplayFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayFrame")
            .field("token", &self.token)
            .field("prediction_state", &self.prediction_state)
            .field("surface_frames", &self.surface_frames.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    include!("display_frame_test.rs");
}
