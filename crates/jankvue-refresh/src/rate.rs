//! Display-mode and vote value types

use serde::Serialize;
use thiserror::Error;

/// Identifier of one hardware display configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConfigId(pub u32);

/// One hardware display mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshRate {
    pub config_id: ConfigId,
    pub vsync_period_ns: i64,
    /// Modes in the same group can be switched between seamlessly.
    pub group: i32,
    pub fps: f32,
    pub name: String,
}

impl RefreshRate {
    pub fn new(config_id: ConfigId, vsync_period_ns: i64, group: i32, fps: f32) -> Self {
        Self {
            config_id,
            vsync_period_ns,
            group,
            fps,
            name: format!("{:.0}Hz", fps),
        }
    }
}

/// Mode-selection policy: the anchor mode and the allowed fps window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Policy {
    pub default_id: ConfigId,
    pub min_fps: f32,
    pub max_fps: f32,
}

impl Policy {
    pub fn with_default(default_id: ConfigId) -> Self {
        Self {
            default_id,
            min_fps: 0.0,
            max_fps: f32::MAX,
        }
    }
}

/// How a layer wants the display paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayerVoteType {
    /// The layer does not care.
    NoVote,
    /// Lowest available rate.
    Min,
    /// Highest available rate.
    Max,
    /// Inferred cadence; weakest of the content votes.
    Heuristic,
    /// App-declared default frame rate.
    ExplicitDefault,
    /// App-declared rate that must divide the display rate exactly.
    ExplicitExactOrMultiple,
}

/// One layer's vote for the current selection round.
#[derive(Debug, Clone, Serialize)]
pub struct LayerRequirement {
    pub name: String,
    pub vote: LayerVoteType,
    /// Desired content rate in frames per second. Meaningful for
    /// Heuristic/Explicit votes only.
    pub desired_refresh_rate: f32,
    /// Relative importance in `[0, 1]`.
    pub weight: f32,
}

/// Rejection status for policy updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("policy rejected: unknown default mode or default outside fps window")]
    BadValue,
}

#[cfg(test)]
mod tests {
    include!("rate_test.rs");
}
