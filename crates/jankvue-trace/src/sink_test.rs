// Sink module tests

use super::*;
use crate::packet::{
    DisplayFramePacket, FramePresentType, FrameTimelineEvent, JankTypeProto, TracePacket,
    CLOCK_ID_MONOTONIC,
};

fn packet(token: i64) -> TracePacket {
    TracePacket {
        timestamp_ns: token,
        clock_id: CLOCK_ID_MONOTONIC,
        event: FrameTimelineEvent::DisplayFrame(DisplayFramePacket {
            token,
            present_type: FramePresentType::OnTime,
            on_time_finish: true,
            gpu_composition: false,
            jank_type: JankTypeProto::None,
            jank_mask: 0,
            expected_start_ns: 0,
            expected_end_ns: 0,
            actual_start_ns: 0,
            actual_end_ns: 0,
            pid: 0,
        }),
    }
}

// ============================================================================
// Displacement Contract Tests
// ============================================================================

#[test]
fn test_single_packet_stays_staged() {
    let sink = InMemorySink::new();

    sink.emit(packet(1));

    // Not yet displaced to the transport.
    assert!(sink.is_empty());
}

#[test]
fn test_second_packet_displaces_first() {
    let sink = InMemorySink::new();

    sink.emit(packet(1));
    sink.emit(packet(2));

    let committed = sink.packets();
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].timestamp_ns, 1);
}

#[test]
fn test_flush_staged_commits_last() {
    let sink = InMemorySink::new();

    sink.emit(packet(1));
    sink.emit(packet(2));
    sink.flush_staged();

    assert_eq!(sink.len(), 2);
}

#[test]
fn test_flush_staged_on_empty_sink_is_noop() {
    let sink = InMemorySink::new();

    sink.flush_staged();

    assert!(sink.is_empty());
}

#[test]
fn test_packets_preserve_emission_order() {
    let sink = InMemorySink::new();

    for token in 1..=5 {
        sink.emit(packet(token));
    }
    sink.flush_staged();

    let timestamps: Vec<i64> = sink.packets().iter().map(|p| p.timestamp_ns).collect();
    assert_eq!(timestamps, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_null_sink_discards() {
    let sink = NullSink;
    sink.emit(packet(1));
}
