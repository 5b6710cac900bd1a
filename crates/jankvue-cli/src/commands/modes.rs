//! Modes command - demo the refresh-rate selector

use jankvue_refresh::{
    ConfigId, LayerRequirement, LayerVoteType, RefreshRate, RefreshRateSelector,
};

pub fn run() {
    let selector = RefreshRateSelector::new(
        vec![
            RefreshRate::new(ConfigId(0), 16_666_667, 0, 60.0),
            RefreshRate::new(ConfigId(1), 11_111_111, 0, 90.0),
            RefreshRate::new(ConfigId(2), 8_333_333, 0, 120.0),
        ],
        ConfigId(0),
    );

    let scenarios: Vec<(&str, Vec<LayerRequirement>)> = vec![
        (
            "idle wallpaper",
            vec![vote("wallpaper", LayerVoteType::Min, 0.0)],
        ),
        (
            "24fps video",
            vec![vote("video", LayerVoteType::ExplicitExactOrMultiple, 24.0)],
        ),
        (
            "45fps game",
            vec![vote("game", LayerVoteType::Heuristic, 45.0)],
        ),
        (
            "scrolling over 30fps video",
            vec![
                vote("list", LayerVoteType::Max, 0.0),
                vote("video", LayerVoteType::ExplicitExactOrMultiple, 30.0),
            ],
        ),
    ];

    for (label, layers) in scenarios {
        let chosen = selector.best_refresh_rate(&layers);
        println!("{label:<28} -> {}", chosen.name);
    }
}

fn vote(name: &str, vote: LayerVoteType, fps: f32) -> LayerRequirement {
    LayerRequirement {
        name: name.to_string(),
        vote,
        desired_refresh_rate: fps,
        weight: 1.0,
    }
}
