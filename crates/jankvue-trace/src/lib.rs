//! jankvue-trace: frame-timeline trace packet model and sinks
//!
//! The engine in `jankvue-core` serializes every reconciled frame into one
//! packet on a [`TraceSink`]. This crate owns the wire-facing value types,
//! the packet builder, and the in-memory sink used by tests and the CLI.

pub mod packet;
pub mod sink;

pub use packet::{
    DisplayFramePacket, FramePresentType, FrameTimelineEvent, JankTypeProto, PacketBuilder,
    SurfaceFramePacket, TracePacket, CLOCK_ID_MONOTONIC,
};
pub use sink::{InMemorySink, NullSink, TraceSink, TraceSinkExt};
