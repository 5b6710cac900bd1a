//! jankvue-core: frame timeline engine for compositor observability
//!
//! Reconstructs, classifies, and exports per-frame timing for every
//! displayed frame and every application submission composited into it:
//!
//! - TokenManager: monotonic prediction registry with bounded retention
//! - SurfaceFrame / DisplayFrame: the two-level frame model joined by tokens
//! - FrameTimeline: producer API, fence reconciliation, bounded retention
//! - jank classification: prediction-vs-actual deltas to a fault bitmask
//! - dump: the `-jank` / `-all` text surface
//!
//! The engine is advisory: nothing on the producer path blocks, returns
//! errors, or performs I/O. Hardware asynchrony is handled by polling
//! present fences on subsequent producer calls, never by waiting.

pub mod clock;
pub mod display_frame;
pub mod dump;
pub mod fence;
pub mod jank;
pub mod stats;
pub mod surface_frame;
pub mod timeline;
pub mod token_manager;
pub mod types;

pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use display_frame::DisplayFrame;
pub use dump::DumpOptions;
pub use fence::{ManualFence, PresentFence, SIGNAL_TIME_INVALID, SIGNAL_TIME_PENDING};
pub use jank::JankType;
pub use stats::{JankStats, LayerJankReport, NoopStats, RecordingStats};
pub use surface_frame::SurfaceFrame;
pub use timeline::{FrameTimeline, SharedDisplayFrame, DEFAULT_MAX_DISPLAY_FRAMES};
pub use token_manager::{TokenManager, MAX_RETENTION_TIME_NS};
pub use types::{
    FramePresentMetadata, FrameReadyMetadata, FrameStartMetadata, JankThresholds, PredictionState,
    PresentState, TimelineItem, TraceToken, INVALID_TOKEN,
};
