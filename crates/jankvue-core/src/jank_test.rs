// Jank bitmask tests

use super::*;

#[test]
fn test_empty_mask_means_no_jank() {
    let jank = JankType::empty();

    assert_eq!(jank.description(), "None");
    assert_eq!(jank.to_proto(), JankTypeProto::None);
}

#[test]
fn test_description_joins_multiple_bits() {
    let jank = JankType::APP_DEADLINE_MISSED | JankType::BUFFER_STUFFING;

    assert_eq!(jank.description(), "App Deadline Missed, Buffer Stuffing");
}

#[test]
fn test_proto_precedence_display_hal_first() {
    let jank = JankType::DISPLAY_HAL | JankType::APP_DEADLINE_MISSED | JankType::SF_SCHEDULING;

    assert_eq!(jank.to_proto(), JankTypeProto::DisplayHal);
}

#[test]
fn test_proto_precedence_sf_deadline_over_app() {
    let cpu = JankType::SF_CPU_DEADLINE_MISSED | JankType::APP_DEADLINE_MISSED;
    let gpu = JankType::SF_GPU_DEADLINE_MISSED | JankType::PREDICTION_ERROR;

    assert_eq!(cpu.to_proto(), JankTypeProto::SfDeadlineMissed);
    assert_eq!(gpu.to_proto(), JankTypeProto::SfDeadlineMissed);
}

#[test]
fn test_proto_prediction_error_maps_to_app_deadline() {
    assert_eq!(
        JankType::PREDICTION_ERROR.to_proto(),
        JankTypeProto::AppDeadlineMissed
    );
}

#[test]
fn test_proto_scheduling_over_stuffing() {
    let jank = JankType::SF_SCHEDULING | JankType::BUFFER_STUFFING;

    assert_eq!(jank.to_proto(), JankTypeProto::SfScheduling);
}

#[test]
fn test_proto_unknown_last_before_none() {
    assert_eq!(JankType::UNKNOWN.to_proto(), JankTypeProto::Unknown);
    assert_eq!(
        (JankType::BUFFER_STUFFING | JankType::UNKNOWN).to_proto(),
        JankTypeProto::BufferStuffing
    );
}
