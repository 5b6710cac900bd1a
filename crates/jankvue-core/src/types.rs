//! Core value types for the frame timeline
//!
//! A frame's life is described by two [`TimelineItem`]s: the prediction
//! minted with its token, and the actuals observed as the frame moves
//! through the compositor. Classification compares the two.

use serde::Serialize;

/// Token identifying one predicted frame timeline.
///
/// Minted by the TokenManager, strictly increasing within a process
/// lifetime. [`INVALID_TOKEN`] means "no prediction was requested".
pub type TraceToken = i64;

/// Sentinel for frames submitted without a token.
pub const INVALID_TOKEN: TraceToken = -1;

/// Nanosecond timestamp triple. A zero field means "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimelineItem {
    pub start_ns: i64,
    pub end_ns: i64,
    pub present_ns: i64,
}

impl TimelineItem {
    pub const fn new(start_ns: i64, end_ns: i64, present_ns: i64) -> Self {
        Self {
            start_ns,
            end_ns,
            present_ns,
        }
    }
}

/// Whether a token resolved to a live prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PredictionState {
    /// Token resolved to a retained prediction.
    Valid,
    /// Token existed but its prediction was evicted.
    Expired,
    /// No token was supplied.
    None,
}

impl PredictionState {
    pub fn label(&self) -> &'static str {
        match self {
            PredictionState::Valid => "Valid",
            PredictionState::Expired => "Expired",
            PredictionState::None => "None",
        }
    }
}

/// Outcome of a surface frame's submission, set once before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PresentState {
    Presented,
    Dropped,
    Unknown,
}

impl PresentState {
    pub fn label(&self) -> &'static str {
        match self {
            PresentState::Presented => "Presented",
            PresentState::Dropped => "Dropped",
            PresentState::Unknown => "Unknown",
        }
    }
}

/// How the actual present time compared to the prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FramePresentMetadata {
    OnTimePresent,
    EarlyPresent,
    LatePresent,
    UnknownPresent,
}

impl FramePresentMetadata {
    pub fn label(&self) -> &'static str {
        match self {
            FramePresentMetadata::OnTimePresent => "On-time Present",
            FramePresentMetadata::EarlyPresent => "Early Present",
            FramePresentMetadata::LatePresent => "Late Present",
            FramePresentMetadata::UnknownPresent => "Unknown Present",
        }
    }
}

/// How the actual finish (end) time compared to the predicted deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameReadyMetadata {
    OnTimeFinish,
    LateFinish,
    UnknownFinish,
}

impl FrameReadyMetadata {
    pub fn label(&self) -> &'static str {
        match self {
            FrameReadyMetadata::OnTimeFinish => "On-time Finish",
            FrameReadyMetadata::LateFinish => "Late Finish",
            FrameReadyMetadata::UnknownFinish => "Unknown Finish",
        }
    }
}

/// How the actual start time compared to the predicted start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameStartMetadata {
    OnTimeStart,
    LateStart,
    EarlyStart,
    UnknownStart,
}

impl FrameStartMetadata {
    pub fn label(&self) -> &'static str {
        match self {
            FrameStartMetadata::OnTimeStart => "On-time Start",
            FrameStartMetadata::LateStart => "Late Start",
            FrameStartMetadata::EarlyStart => "Early Start",
            FrameStartMetadata::UnknownStart => "Unknown Start",
        }
    }
}

/// Classification thresholds in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JankThresholds {
    /// Present delta within this of the prediction counts as on time.
    pub present_threshold_ns: i64,
    /// Finish later than the deadline by more than this counts as late.
    pub deadline_threshold_ns: i64,
    /// Start delta beyond this flags Late/EarlyStart.
    pub start_threshold_ns: i64,
}

impl Default for JankThresholds {
    fn default() -> Self {
        Self {
            present_threshold_ns: 2_000_000,
            deadline_threshold_ns: 0,
            start_threshold_ns: 2_000_000,
        }
    }
}

#[cfg(test)]
mod tests {
    include!("types_test.rs");
}
