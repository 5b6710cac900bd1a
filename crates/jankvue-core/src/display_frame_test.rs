// DisplayFrame module tests

use super::*;
use crate::fence::ManualFence;
use crate::stats::RecordingStats;
use crate::types::PresentState;
use jankvue_trace::InMemorySink;

const MS: i64 = 1_000_000;
const VSYNC: i64 = 30 * MS;

// ============================================================================
// Fixtures
// ============================================================================

struct Fixture {
    stats: Arc<RecordingStats>,
    frame: DisplayFrame,
}

fn display_frame() -> Fixture {
    let stats: Arc<RecordingStats> = Arc::new(RecordingStats::new());
    let frame = DisplayFrame::new(
        JankThresholds::default(),
        Arc::downgrade(&stats) as Weak<dyn JankStats>,
    );
    Fixture { stats, frame }
}

/// Valid display predictions: wake 52ms, deadline 56ms, present 60ms.
fn woken_frame() -> Fixture {
    let mut f = display_frame();
    f.frame.on_sf_wake_up(
        7,
        VSYNC,
        Some(TimelineItem::new(52 * MS, 56 * MS, 60 * MS)),
        52 * MS,
    );
    f
}

fn surface_frame(token: TraceToken, predictions: TimelineItem) -> Arc<SurfaceFrame> {
    let stats: Arc<RecordingStats> = Arc::new(RecordingStats::new());
    Arc::new(SurfaceFrame::new(
        token,
        100,
        101,
        "layer#0".to_string(),
        "layer".to_string(),
        PredictionState::Valid,
        predictions,
        JankThresholds::default(),
        Arc::downgrade(&stats) as Weak<dyn JankStats>,
    ))
}

// ============================================================================
// Wake-up Tests
// ============================================================================

#[test]
fn test_wake_up_with_predictions_is_valid() {
    let f = woken_frame();

    assert_eq!(f.frame.prediction_state(), PredictionState::Valid);
    assert_eq!(f.frame.token(), 7);
    assert_eq!(f.frame.vsync_period_ns(), VSYNC);
    assert_eq!(f.frame.actuals().start_ns, 52 * MS);
}

#[test]
fn test_wake_up_without_predictions_is_expired() {
    let mut f = display_frame();

    f.frame.on_sf_wake_up(7, VSYNC, None, 52 * MS);

    assert_eq!(f.frame.prediction_state(), PredictionState::Expired);
}

#[test]
fn test_wake_up_with_invalid_token_has_no_prediction() {
    let mut f = display_frame();

    f.frame.on_sf_wake_up(INVALID_TOKEN, VSYNC, None, 20);

    assert_eq!(f.frame.prediction_state(), PredictionState::None);
}

#[test]
fn test_surface_frames_preserve_submission_order() {
    let mut f = woken_frame();

    for token in [11, 12, 13] {
        f.frame
            .add_surface_frame(surface_frame(token, TimelineItem::new(1, 2, 3)));
    }
    f.frame.on_present(61 * MS);

    let tokens: Vec<_> = f.frame.surface_frames().iter().map(|s| s.token()).collect();
    assert_eq!(tokens, vec![11, 12, 13]);
}

// ============================================================================
// Classification Tests
// ============================================================================

#[test]
fn test_on_time_present_is_no_jank() {
    let mut f = woken_frame();
    f.frame.set_actual_end_time(55 * MS);

    f.frame.on_present(61 * MS);

    assert_eq!(
        f.frame.present_metadata(),
        FramePresentMetadata::OnTimePresent
    );
    assert!(f.frame.jank_type().is_empty());
    assert_eq!(f.stats.global_reports(), vec![JankType::empty()]);
}

#[test]
fn test_late_late_is_sf_cpu_deadline_missed() {
    let mut f = woken_frame();
    f.frame.set_actual_end_time(59 * MS);

    f.frame.on_present(90 * MS);

    assert_eq!(f.frame.jank_type(), JankType::SF_CPU_DEADLINE_MISSED);
    assert_eq!(f.frame.ready_metadata(), FrameReadyMetadata::LateFinish);
}

#[test]
fn test_late_late_with_gpu_fence_is_sf_gpu_deadline_missed() {
    let mut f = woken_frame();
    f.frame.set_actual_end_time(55 * MS);
    f.frame.set_gpu_fence(ManualFence::signaled(58 * MS));

    f.frame.on_present(90 * MS);

    // GPU signal moved the effective end past the 56ms deadline.
    assert_eq!(f.frame.actuals().end_ns, 58 * MS);
    assert_eq!(f.frame.jank_type(), JankType::SF_GPU_DEADLINE_MISSED);
}

#[test]
fn test_pending_gpu_fence_keeps_cpu_end_time() {
    let mut f = woken_frame();
    f.frame.set_actual_end_time(55 * MS);
    f.frame.set_gpu_fence(ManualFence::pending());

    f.frame.on_present(61 * MS);

    assert_eq!(f.frame.actuals().end_ns, 55 * MS);
    assert!(f.frame.gpu_composition());
}

#[test]
fn test_late_on_time_aligned_is_display_hal() {
    let mut f = woken_frame();
    f.frame.set_actual_end_time(55 * MS);

    // Exactly one vsync late.
    f.frame.on_present(90 * MS);

    assert_eq!(f.frame.jank_type(), JankType::DISPLAY_HAL);
}

#[test]
fn test_late_on_time_misaligned_is_prediction_error() {
    let mut f = woken_frame();
    f.frame.set_actual_end_time(55 * MS);

    f.frame.on_present(75 * MS);

    assert_eq!(f.frame.jank_type(), JankType::PREDICTION_ERROR);
}

#[test]
fn test_early_late_is_sf_scheduling() {
    let mut f = woken_frame();
    f.frame.set_actual_end_time(59 * MS);

    f.frame.on_present(45 * MS);

    assert_eq!(f.frame.jank_type(), JankType::SF_SCHEDULING);
}

#[test]
fn test_early_on_time_aligned_is_sf_scheduling() {
    let mut f = woken_frame();
    f.frame.set_actual_end_time(55 * MS);

    f.frame.on_present(30 * MS);

    assert_eq!(f.frame.jank_type(), JankType::SF_SCHEDULING);
}

#[test]
fn test_expired_prediction_classifies_unknown() {
    let mut f = display_frame();
    f.frame.on_sf_wake_up(7, VSYNC, None, 52 * MS);
    f.frame.set_actual_end_time(59 * MS);

    f.frame.on_present(90 * MS);

    assert_eq!(f.frame.jank_type(), JankType::UNKNOWN);
    assert_eq!(f.stats.global_reports(), vec![JankType::UNKNOWN]);
}

#[test]
fn test_no_prediction_skips_classification_and_stats() {
    let mut f = display_frame();
    f.frame.on_sf_wake_up(INVALID_TOKEN, VSYNC, None, 20);

    f.frame.on_present(25);

    assert!(f.frame.jank_type().is_empty());
    assert!(f.stats.global_reports().is_empty());
    assert_eq!(f.frame.actuals().present_ns, 25);
}

// ============================================================================
// Start Metadata Tests
// ============================================================================

#[test]
fn test_start_metadata_on_time() {
    let mut f = woken_frame();
    f.frame.set_actual_end_time(55 * MS);

    f.frame.on_present(61 * MS);

    assert_eq!(f.frame.start_metadata(), FrameStartMetadata::OnTimeStart);
}

#[test]
fn test_start_metadata_late() {
    let mut f = display_frame();
    f.frame.on_sf_wake_up(
        7,
        VSYNC,
        Some(TimelineItem::new(52 * MS, 56 * MS, 60 * MS)),
        56 * MS,
    );
    f.frame.set_actual_end_time(57 * MS);

    f.frame.on_present(61 * MS);

    assert_eq!(f.frame.start_metadata(), FrameStartMetadata::LateStart);
}

#[test]
fn test_start_metadata_unknown_when_start_is_zero() {
    let mut f = display_frame();
    f.frame.on_sf_wake_up(
        7,
        VSYNC,
        Some(TimelineItem::new(52 * MS, 56 * MS, 60 * MS)),
        0,
    );
    f.frame.set_actual_end_time(55 * MS);

    f.frame.on_present(61 * MS);

    assert_eq!(f.frame.start_metadata(), FrameStartMetadata::UnknownStart);
}

// ============================================================================
// Propagation Tests
// ============================================================================

#[test]
fn test_children_classified_with_parent_jank() {
    let mut f = woken_frame();
    f.frame.set_actual_end_time(59 * MS);

    // Child: on-time finish, presented late along with the display frame.
    let child = surface_frame(11, TimelineItem::new(10 * MS, 20 * MS, 60 * MS));
    child.set_acquire_fence_time(15 * MS);
    child.set_present_state(PresentState::Presented, 0);
    f.frame.add_surface_frame(child.clone());

    f.frame.on_present(90 * MS);

    assert_eq!(f.frame.jank_type(), JankType::SF_CPU_DEADLINE_MISSED);
    assert_eq!(child.jank_type(), JankType::SF_CPU_DEADLINE_MISSED);
    assert_eq!(child.actuals().present_ns, 90 * MS);
}

// ============================================================================
// Trace Tests
// ============================================================================

#[test]
fn test_invalid_token_frame_emits_nothing() {
    let mut f = display_frame();
    f.frame.on_sf_wake_up(INVALID_TOKEN, VSYNC, None, 20);
    f.frame.on_present(25);

    let sink = InMemorySink::new();
    f.frame.trace(&sink, 1, 100);
    sink.flush_staged();

    assert!(sink.is_empty());
}

#[test]
fn test_trace_emits_display_then_surface_packets() {
    let mut f = woken_frame();
    f.frame.set_actual_end_time(55 * MS);

    let child = surface_frame(11, TimelineItem::new(10 * MS, 20 * MS, 60 * MS));
    child.set_acquire_fence_time(15 * MS);
    child.set_present_state(PresentState::Presented, 0);
    f.frame.add_surface_frame(child);

    // Tokenless child must not be traced.
    let untracked = surface_frame(INVALID_TOKEN, TimelineItem::default());
    untracked.set_present_state(PresentState::Dropped, 0);
    f.frame.add_surface_frame(untracked);

    f.frame.on_present(61 * MS);

    let sink = InMemorySink::new();
    f.frame.trace(&sink, 42, 100 * MS);
    sink.flush_staged();

    let packets = sink.packets();
    assert_eq!(packets.len(), 2);
    match &packets[0].event {
        jankvue_trace::FrameTimelineEvent::DisplayFrame(p) => {
            assert_eq!(p.token, 7);
            assert_eq!(p.pid, 42);
        }
        other => panic!("expected display frame packet, got {other:?}"),
    }
    match &packets[1].event {
        jankvue_trace::FrameTimelineEvent::SurfaceFrame(p) => {
            assert_eq!(p.token, 11);
            assert_eq!(p.display_frame_token, 7);
        }
        other => panic!("expected surface frame packet, got {other:?}"),
    }
}
