//! Trace packet value types and the builder facade
//!
//! Packets are flat records rather than nested proto builders: one
//! [`TracePacket`] per reconciled frame, carrying either a display-frame or
//! a surface-frame event. The raw jank bitmask rides along with the
//! precedence-collapsed [`JankTypeProto`] so downstream tooling can choose
//! either representation.

use serde::Serialize;

use crate::sink::TraceSink;

/// Clock domain identifier stamped on every packet.
///
/// Matches the monotonic clock the engine timestamps frames with; there is
/// no wall-clock domain in this pipeline.
pub const CLOCK_ID_MONOTONIC: u32 = 3;

/// Wire-facing present classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FramePresentType {
    OnTime,
    Early,
    Late,
    Dropped,
    Unspecified,
}

/// Wire-facing jank classification, collapsed from the bitmask.
///
/// Collapse precedence (highest first): DisplayHal, SfDeadlineMissed (CPU
/// or GPU), AppDeadlineMissed (app deadline or prediction error),
/// SfScheduling, BufferStuffing, Unknown, None.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JankTypeProto {
    None,
    DisplayHal,
    SfDeadlineMissed,
    AppDeadlineMissed,
    SfScheduling,
    BufferStuffing,
    Unknown,
}

/// One display-frame event: the compositor's own cycle timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFramePacket {
    pub token: i64,
    pub present_type: FramePresentType,
    pub on_time_finish: bool,
    pub gpu_composition: bool,
    pub jank_type: JankTypeProto,
    /// Raw classification bitmask; the enum above is its collapse.
    pub jank_mask: u32,
    pub expected_start_ns: i64,
    pub expected_end_ns: i64,
    pub actual_start_ns: i64,
    pub actual_end_ns: i64,
    pub pid: i32,
}

/// One surface-frame event: a single application submission, joined to its
/// display frame by `display_frame_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfaceFramePacket {
    pub token: i64,
    pub display_frame_token: i64,
    pub present_type: FramePresentType,
    pub on_time_finish: bool,
    pub gpu_composition: bool,
    pub jank_type: JankTypeProto,
    pub jank_mask: u32,
    pub expected_start_ns: i64,
    pub expected_end_ns: i64,
    pub actual_start_ns: i64,
    pub actual_end_ns: i64,
    pub layer_name: String,
    pub pid: i32,
}

/// Event payload of a packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FrameTimelineEvent {
    DisplayFrame(DisplayFramePacket),
    SurfaceFrame(SurfaceFramePacket),
}

/// A single packet on the tracing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TracePacket {
    /// Emission timestamp on the clock named by `clock_id`.
    pub timestamp_ns: i64,
    pub clock_id: u32,
    pub event: FrameTimelineEvent,
}

/// Builder for one packet, committed to the sink on [`finish`] or drop.
///
/// The emitter never flushes the session; committing hands the packet to
/// the sink, which may stage it until a later packet displaces it (see
/// [`crate::sink::InMemorySink`]).
///
/// [`finish`]: PacketBuilder::finish
pub struct PacketBuilder<'a, S: TraceSink + ?Sized> {
    sink: &'a S,
    timestamp_ns: i64,
    clock_id: u32,
    event: Option<FrameTimelineEvent>,
}

impl<'a, S: TraceSink + ?Sized> PacketBuilder<'a, S> {
    pub(crate) fn new(sink: &'a S) -> Self {
        Self {
            sink,
            timestamp_ns: 0,
            clock_id: CLOCK_ID_MONOTONIC,
            event: None,
        }
    }

    pub fn set_timestamp(&mut self, timestamp_ns: i64) -> &mut Self {
        self.timestamp_ns = timestamp_ns;
        self
    }

    pub fn set_timestamp_clock_id(&mut self, clock_id: u32) -> &mut Self {
        self.clock_id = clock_id;
        self
    }

    pub fn set_frame_timeline_event(&mut self, event: FrameTimelineEvent) -> &mut Self {
        self.event = Some(event);
        self
    }

    /// Commit the packet. A builder without an event commits nothing.
    pub fn finish(mut self) {
        self.commit();
    }

    fn commit(&mut self) {
        if let Some(event) = self.event.take() {
            self.sink.emit(TracePacket {
                timestamp_ns: self.timestamp_ns,
                clock_id: self.clock_id,
                event,
            });
        }
    }
}

impl<S: TraceSink + ?Sized> Drop for PacketBuilder<'_, S> {
    fn drop(&mut self) {
        self.commit();
    }
}
