//! Trace sinks
//!
//! [`TraceSink`] is the opaque transport the engine emits into. The
//! in-memory sink reproduces the staging behavior of a real tracing
//! session: the most recent packet stays buffered until a later packet
//! displaces it to the committed list, so observers of a particular packet
//! must emit (or flush) one more.

use parking_lot::Mutex;

use crate::packet::{PacketBuilder, TracePacket};

/// Opaque packet transport.
pub trait TraceSink: Send + Sync {
    /// Accept one committed packet.
    fn emit(&self, packet: TracePacket);
}

/// Builder entry point, available on any sink.
pub trait TraceSinkExt: TraceSink {
    fn new_trace_packet(&self) -> PacketBuilder<'_, Self>;
}

impl<S: TraceSink + ?Sized> TraceSinkExt for S {
    fn new_trace_packet(&self) -> PacketBuilder<'_, Self> {
        PacketBuilder::new(self)
    }
}

/// Sink discarding every packet. Used when tracing is disabled.
#[derive(Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn emit(&self, _packet: TracePacket) {}
}

#[derive(Debug, Default)]
struct SinkState {
    /// Last emitted packet, not yet visible to readers.
    staged: Option<TracePacket>,
    committed: Vec<TracePacket>,
}

/// In-memory session used by tests and the CLI replay.
#[derive(Debug, Default)]
pub struct InMemorySink {
    state: Mutex<SinkState>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packets displaced to the transport so far. Excludes the staged one.
    pub fn packets(&self) -> Vec<TracePacket> {
        self.state.lock().committed.clone()
    }

    /// Number of committed packets.
    pub fn len(&self) -> usize {
        self.state.lock().committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Force the staged packet (if any) into the committed list.
    ///
    /// Equivalent to emitting a trailing trivial packet on a real session.
    pub fn flush_staged(&self) {
        let mut state = self.state.lock();
        if let Some(packet) = state.staged.take() {
            state.committed.push(packet);
        }
    }
}

impl TraceSink for InMemorySink {
    fn emit(&self, packet: TracePacket) {
        let mut state = self.state.lock();
        if let Some(prev) = state.staged.replace(packet) {
            state.committed.push(prev);
        }
    }
}
