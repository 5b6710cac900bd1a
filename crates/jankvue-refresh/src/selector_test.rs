// Selector module tests

use super::*;

const CONFIG_60: ConfigId = ConfigId(0);
const CONFIG_90: ConfigId = ConfigId(1);
const CONFIG_120_GROUP_1: ConfigId = ConfigId(2);

// ============================================================================
// Fixtures
// ============================================================================

fn configs() -> Vec<RefreshRate> {
    vec![
        RefreshRate::new(CONFIG_60, 16_666_667, 0, 60.0),
        RefreshRate::new(CONFIG_90, 11_111_111, 0, 90.0),
        RefreshRate::new(CONFIG_120_GROUP_1, 8_333_333, 1, 120.0),
    ]
}

fn selector() -> RefreshRateSelector {
    RefreshRateSelector::new(configs(), CONFIG_60)
}

fn layer(vote: LayerVoteType, fps: f32, weight: f32) -> LayerRequirement {
    LayerRequirement {
        name: format!("{vote:?}"),
        vote,
        desired_refresh_rate: fps,
        weight,
    }
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
#[should_panic(expected = "no display configs")]
fn test_empty_configs_panics() {
    RefreshRateSelector::new(vec![], CONFIG_60);
}

#[test]
#[should_panic(expected = "not in config table")]
fn test_unknown_current_panics() {
    RefreshRateSelector::new(configs(), ConfigId(99));
}

#[test]
fn test_available_excludes_other_groups() {
    let selector = selector();

    assert_eq!(selector.min_supported().config_id, CONFIG_60);
    assert_eq!(selector.max_supported().config_id, CONFIG_90);
}

// ============================================================================
// Policy Tests
// ============================================================================

#[test]
fn test_set_policy_unknown_default_rejected() {
    let selector = selector();

    let result = selector.set_policy(Policy {
        default_id: ConfigId(99),
        min_fps: 0.0,
        max_fps: 200.0,
    });

    assert_eq!(result, Err(SelectorError::BadValue));
}

#[test]
fn test_set_policy_default_outside_window_rejected() {
    let selector = selector();

    let result = selector.set_policy(Policy {
        default_id: CONFIG_90,
        min_fps: 0.0,
        max_fps: 70.0,
    });

    assert_eq!(result, Err(SelectorError::BadValue));
}

#[test]
fn test_rejected_policy_leaves_state_unchanged() {
    let selector = selector();
    selector
        .set_policy(Policy {
            default_id: CONFIG_60,
            min_fps: 50.0,
            max_fps: 70.0,
        })
        .unwrap();

    let result = selector.set_policy(Policy {
        default_id: CONFIG_90,
        min_fps: 50.0,
        max_fps: 70.0,
    });

    assert_eq!(result, Err(SelectorError::BadValue));
    assert_eq!(selector.policy().default_id, CONFIG_60);
    assert_eq!(selector.max_supported().config_id, CONFIG_60);
}

#[test]
fn test_policy_window_filters_available() {
    let selector = selector();

    selector
        .set_policy(Policy {
            default_id: CONFIG_60,
            min_fps: 50.0,
            max_fps: 70.0,
        })
        .unwrap();

    assert_eq!(selector.min_supported().config_id, CONFIG_60);
    assert_eq!(selector.max_supported().config_id, CONFIG_60);
}

#[test]
fn test_set_current_round_trip() {
    let selector = selector();

    selector.set_current(CONFIG_90).unwrap();

    assert_eq!(selector.current().config_id, CONFIG_90);
    assert_eq!(
        selector.set_current(ConfigId(99)),
        Err(SelectorError::BadValue)
    );
}

// ============================================================================
// Content V2 Selection Tests
// ============================================================================

#[test]
fn test_no_vote_and_min_pick_floor() {
    let selector = selector();

    let chosen = selector.best_refresh_rate(&[
        layer(LayerVoteType::NoVote, 0.0, 1.0),
        layer(LayerVoteType::Min, 0.0, 1.0),
    ]);

    assert_eq!(chosen.config_id, CONFIG_60);
}

#[test]
fn test_empty_layers_pick_floor() {
    let selector = selector();

    assert_eq!(selector.best_refresh_rate(&[]).config_id, CONFIG_60);
}

#[test]
fn test_max_vote_picks_ceiling() {
    let selector = selector();

    let chosen = selector.best_refresh_rate(&[
        layer(LayerVoteType::Max, 0.0, 1.0),
        layer(LayerVoteType::Heuristic, 24.0, 1.0),
    ]);

    assert_eq!(chosen.config_id, CONFIG_90);
}

#[test]
fn test_heuristic_45fps_aligns_with_90hz() {
    let selector = selector();

    let chosen = selector.best_refresh_rate(&[layer(LayerVoteType::Heuristic, 45.0, 1.0)]);

    // 45fps divides 90Hz exactly (q = 2, r = 0); against 60Hz the cadence
    // never realigns cleanly.
    assert_eq!(chosen.config_id, CONFIG_90);
}

#[test]
fn test_tie_prefers_lower_fps() {
    let selector = selector();

    // 30fps divides both 60Hz and 90Hz exactly.
    let chosen = selector.best_refresh_rate(&[layer(LayerVoteType::Heuristic, 30.0, 1.0)]);

    assert_eq!(chosen.config_id, CONFIG_60);
}

#[test]
fn test_explicit_default_beats_max_vote() {
    let selector = selector();

    let chosen = selector.best_refresh_rate(&[
        layer(LayerVoteType::Max, 0.0, 1.0),
        layer(LayerVoteType::ExplicitDefault, 60.0, 1.0),
    ]);

    assert_eq!(chosen.config_id, CONFIG_60);
}

#[test]
fn test_explicit_default_outweighs_halved_heuristic() {
    let selector = selector();

    let chosen = selector.best_refresh_rate(&[
        layer(LayerVoteType::Heuristic, 90.0, 1.0),
        layer(LayerVoteType::ExplicitDefault, 60.0, 1.0),
    ]);

    assert_eq!(chosen.config_id, CONFIG_60);
}

#[test]
fn test_exact_or_multiple_bias() {
    let selector = selector();

    let chosen = selector.best_refresh_rate(&[
        layer(LayerVoteType::ExplicitExactOrMultiple, 30.0, 1.0),
        layer(LayerVoteType::ExplicitDefault, 90.0, 1.0),
    ]);

    // The exact vote keeps full weight while the default is halved; 90Hz
    // satisfies both 30fps (x3) and 90fps (x1).
    assert_eq!(chosen.config_id, CONFIG_90);
}

#[test]
fn test_zero_scores_return_current() {
    let selector = selector();
    selector.set_current(CONFIG_90).unwrap();

    let chosen = selector.best_refresh_rate(&[layer(LayerVoteType::Heuristic, 0.0, 1.0)]);

    assert_eq!(chosen.config_id, CONFIG_90);
}

// ============================================================================
// Legacy V1 Selection Tests
// ============================================================================

#[test]
fn test_v1_exact_match() {
    let selector = selector();

    let chosen = selector.refresh_rate_for_content(&[layer(LayerVoteType::Heuristic, 60.0, 1.0)]);

    assert_eq!(chosen.config_id, CONFIG_60);
}

#[test]
fn test_v1_45fps_scans_forward_to_multiple() {
    let selector = selector();

    // 60Hz is nearest to 45fps but 60/45 is not near an integer; the scan
    // forward lands on 90Hz (ratio 2).
    let chosen = selector.refresh_rate_for_content(&[layer(LayerVoteType::Heuristic, 45.0, 1.0)]);

    assert_eq!(chosen.config_id, CONFIG_90);
}

#[test]
fn test_v1_no_content_returns_current() {
    let selector = selector();

    let chosen = selector.refresh_rate_for_content(&[layer(LayerVoteType::NoVote, 120.0, 1.0)]);

    assert_eq!(chosen.config_id, CONFIG_60);
}
