// Stats module tests

use super::*;

#[test]
fn test_recording_stats_captures_layer_reports() {
    let stats = RecordingStats::new();

    stats.increment_janky_frames_for_layer(1001, "app#0", JankType::APP_DEADLINE_MISSED);

    let reports = stats.layer_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].uid, 1001);
    assert_eq!(reports[0].layer_name, "app#0");
    assert_eq!(reports[0].jank, JankType::APP_DEADLINE_MISSED);
}

#[test]
fn test_recording_stats_captures_global_reports() {
    let stats = RecordingStats::new();

    stats.increment_janky_frames(JankType::SF_CPU_DEADLINE_MISSED);
    stats.increment_janky_frames(JankType::DISPLAY_HAL);

    assert_eq!(
        stats.global_reports(),
        vec![JankType::SF_CPU_DEADLINE_MISSED, JankType::DISPLAY_HAL]
    );
}

#[test]
fn test_noop_stats_accepts_reports() {
    let stats = NoopStats;

    stats.increment_janky_frames_for_layer(0, "layer", JankType::UNKNOWN);
    stats.increment_janky_frames(JankType::UNKNOWN);
}
