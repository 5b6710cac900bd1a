//! Jank classification bitmask
//!
//! Classification can attribute a single missed frame to more than one
//! party (e.g. an app deadline miss on top of buffer stuffing), so the
//! result is a bitmask. `JankType::empty()` means no jank.

use bitflags::bitflags;
use jankvue_trace::JankTypeProto;

bitflags! {
    /// Fault categories assigned by the classifier.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct JankType: u32 {
        /// Display HAL presented off-schedule.
        const DISPLAY_HAL = 0x01;
        /// Compositor CPU work missed its deadline.
        const SF_CPU_DEADLINE_MISSED = 0x02;
        /// Compositor GPU work missed its deadline.
        const SF_GPU_DEADLINE_MISSED = 0x04;
        /// The application missed its deadline.
        const APP_DEADLINE_MISSED = 0x08;
        /// Everything finished on time; the prediction itself was off.
        const PREDICTION_ERROR = 0x10;
        /// The compositor latched onto a different vsync than predicted.
        const SF_SCHEDULING = 0x20;
        /// The app queued a buffer before the previous one latched.
        const BUFFER_STUFFING = 0x40;
        /// Cause could not be determined (e.g. expired prediction).
        const UNKNOWN = 0x80;
    }
}

impl JankType {
    /// Dump-facing description. Multiple set bits join with ", ".
    pub fn description(&self) -> String {
        if self.is_empty() {
            return "None".to_string();
        }
        let mut parts = Vec::new();
        if self.contains(JankType::DISPLAY_HAL) {
            parts.push("Display HAL");
        }
        if self.contains(JankType::SF_CPU_DEADLINE_MISSED) {
            parts.push("SurfaceFlinger CPU Deadline Missed");
        }
        if self.contains(JankType::SF_GPU_DEADLINE_MISSED) {
            parts.push("SurfaceFlinger GPU Deadline Missed");
        }
        if self.contains(JankType::APP_DEADLINE_MISSED) {
            parts.push("App Deadline Missed");
        }
        if self.contains(JankType::PREDICTION_ERROR) {
            parts.push("Prediction Error");
        }
        if self.contains(JankType::SF_SCHEDULING) {
            parts.push("SurfaceFlinger Scheduling");
        }
        if self.contains(JankType::BUFFER_STUFFING) {
            parts.push("Buffer Stuffing");
        }
        if self.contains(JankType::UNKNOWN) {
            parts.push("Unknown jank");
        }
        parts.join(", ")
    }

    /// Collapse the bitmask to the wire enum.
    ///
    /// Precedence: DisplayHal, SF deadline (CPU or GPU), app deadline
    /// (including prediction error), SF scheduling, buffer stuffing,
    /// unknown, none.
    pub fn to_proto(&self) -> JankTypeProto {
        if self.contains(JankType::DISPLAY_HAL) {
            JankTypeProto::DisplayHal
        } else if self
            .intersects(JankType::SF_CPU_DEADLINE_MISSED | JankType::SF_GPU_DEADLINE_MISSED)
        {
            JankTypeProto::SfDeadlineMissed
        } else if self.intersects(JankType::APP_DEADLINE_MISSED | JankType::PREDICTION_ERROR) {
            JankTypeProto::AppDeadlineMissed
        } else if self.contains(JankType::SF_SCHEDULING) {
            JankTypeProto::SfScheduling
        } else if self.contains(JankType::BUFFER_STUFFING) {
            JankTypeProto::BufferStuffing
        } else if self.contains(JankType::UNKNOWN) {
            JankTypeProto::Unknown
        } else {
            JankTypeProto::None
        }
    }
}
