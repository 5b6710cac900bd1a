//! Refresh-rate selection
//!
//! Two selectors over the policy-filtered mode list:
//!
//! - [`best_refresh_rate`](RefreshRateSelector::best_refresh_rate), the
//!   content-v2 scorer: every content vote scores every available mode by
//!   how well the layer's period fits the mode's vsync cadence, with a
//!   bias toward exact multiples.
//! - [`refresh_rate_for_content`](RefreshRateSelector::refresh_rate_for_content),
//!   the legacy v1 rule: nearest mode to the max voted content rate,
//!   nudged forward to an integer multiple when the nearest one is not.
//!
//! Iteration order over available modes is descending vsync period
//! (ascending fps); ties in score keep the earlier, lower-fps mode.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::rate::{
    ConfigId, LayerRequirement, LayerVoteType, Policy, RefreshRate, SelectorError,
};

/// Remainders within this of a vsync boundary count as an exact fit.
const MARGIN_NS: i64 = 800_000;

/// Cadence search depth; scores below `weight / 10` are not refined.
const MAX_FRAMES_TO_FIT: i64 = 10;

/// Acceptable deviation of fps ratio from an integer in the v1 rule.
const V1_RATIO_MARGIN: f32 = 0.05;

struct SelectorState {
    policy: Policy,
    current: ConfigId,
    /// Policy-filtered modes, sorted by descending vsync period.
    available: Vec<RefreshRate>,
}

/// Mode table plus the active policy and selection state.
pub struct RefreshRateSelector {
    configs: BTreeMap<ConfigId, RefreshRate>,
    state: Mutex<SelectorState>,
}

impl RefreshRateSelector {
    /// Build a selector over the hardware mode table.
    ///
    /// Panics when the table is empty or `current` is not in it; no
    /// recovery is meaningful without a valid mode.
    pub fn new(configs: Vec<RefreshRate>, current: ConfigId) -> Self {
        assert!(!configs.is_empty(), "no display configs");
        let configs: BTreeMap<ConfigId, RefreshRate> = configs
            .into_iter()
            .map(|rate| (rate.config_id, rate))
            .collect();
        assert!(
            configs.contains_key(&current),
            "current config {current:?} not in config table"
        );

        let policy = Policy::with_default(current);
        let available = Self::filter_modes(&configs, &policy);
        Self {
            configs,
            state: Mutex::new(SelectorState {
                policy,
                current,
                available,
            }),
        }
    }

    fn filter_modes(configs: &BTreeMap<ConfigId, RefreshRate>, policy: &Policy) -> Vec<RefreshRate> {
        let group = configs[&policy.default_id].group;
        let mut available: Vec<RefreshRate> = configs
            .values()
            .filter(|rate| {
                rate.group == group && rate.fps >= policy.min_fps && rate.fps <= policy.max_fps
            })
            .cloned()
            .collect();
        available.sort_by(|a, b| b.vsync_period_ns.cmp(&a.vsync_period_ns));
        available
    }

    // ------------------------------------------------------------------
    // Policy
    // ------------------------------------------------------------------

    /// Install a new policy. Rejected with unchanged state when the
    /// default mode is unknown or falls outside the fps window.
    pub fn set_policy(&self, policy: Policy) -> Result<(), SelectorError> {
        let default = self
            .configs
            .get(&policy.default_id)
            .ok_or(SelectorError::BadValue)?;
        if default.fps < policy.min_fps || default.fps > policy.max_fps {
            return Err(SelectorError::BadValue);
        }
        let mut state = self.state.lock();
        state.available = Self::filter_modes(&self.configs, &policy);
        state.policy = policy;
        tracing::debug!(
            default = ?policy.default_id,
            available = state.available.len(),
            "policy updated"
        );
        Ok(())
    }

    pub fn policy(&self) -> Policy {
        self.state.lock().policy
    }

    /// The active hardware mode.
    pub fn current(&self) -> RefreshRate {
        let state = self.state.lock();
        self.configs[&state.current].clone()
    }

    /// Record a completed mode switch.
    pub fn set_current(&self, config_id: ConfigId) -> Result<(), SelectorError> {
        if !self.configs.contains_key(&config_id) {
            return Err(SelectorError::BadValue);
        }
        self.state.lock().current = config_id;
        Ok(())
    }

    /// Lowest-fps mode allowed by the policy.
    pub fn min_supported(&self) -> RefreshRate {
        self.state.lock().available.first().cloned().expect("available never empty")
    }

    /// Highest-fps mode allowed by the policy.
    pub fn max_supported(&self) -> RefreshRate {
        self.state.lock().available.last().cloned().expect("available never empty")
    }

    // ------------------------------------------------------------------
    // Content v2 selection
    // ------------------------------------------------------------------

    /// Score every available mode against the layer votes and pick the
    /// winner.
    pub fn best_refresh_rate(&self, layers: &[LayerRequirement]) -> RefreshRate {
        let state = self.state.lock();

        let mut no_votes = 0usize;
        let mut min_votes = 0usize;
        let mut max_votes = 0usize;
        let mut explicit_default_votes = 0usize;
        let mut explicit_exact_votes = 0usize;
        for layer in layers {
            match layer.vote {
                LayerVoteType::NoVote => no_votes += 1,
                LayerVoteType::Min => min_votes += 1,
                LayerVoteType::Max => max_votes += 1,
                LayerVoteType::Heuristic => {}
                LayerVoteType::ExplicitDefault => explicit_default_votes += 1,
                LayerVoteType::ExplicitExactOrMultiple => explicit_exact_votes += 1,
            }
        }

        // Only uninterested and min-rate layers: pick the floor.
        if no_votes + min_votes == layers.len() {
            return state.available.first().cloned().expect("available never empty");
        }

        // Max votes win outright unless an explicit vote is in play.
        if max_votes > 0 && explicit_default_votes + explicit_exact_votes == 0 {
            return state.available.last().cloned().expect("available never empty");
        }

        let mut scores: Vec<f32> = vec![0.0; state.available.len()];
        let has_explicit = explicit_default_votes + explicit_exact_votes > 0;
        let has_exact = explicit_exact_votes > 0;

        for layer in layers {
            if matches!(
                layer.vote,
                LayerVoteType::NoVote | LayerVoteType::Min | LayerVoteType::Max
            ) {
                continue;
            }

            let mut weight = layer.weight;
            if has_explicit && layer.vote == LayerVoteType::Heuristic {
                weight /= 2.0;
            }
            if has_exact
                && matches!(
                    layer.vote,
                    LayerVoteType::Heuristic | LayerVoteType::ExplicitDefault
                )
            {
                weight /= 2.0;
            }

            for (score, rate) in scores.iter_mut().zip(&state.available) {
                *score += layer_score(layer.desired_refresh_rate, weight, rate.vsync_period_ns);
            }
        }

        // Strictly-greater comparison in ascending-fps order: ties keep
        // the earlier, lower-fps mode.
        let mut best: Option<&RefreshRate> = None;
        let mut best_score = 0.0f32;
        for (rate, &score) in state.available.iter().zip(&scores) {
            if score > best_score {
                best_score = score;
                best = Some(rate);
            }
        }
        match best {
            Some(rate) => rate.clone(),
            None => self.configs[&state.current].clone(),
        }
    }

    // ------------------------------------------------------------------
    // Legacy v1 selection
    // ------------------------------------------------------------------

    /// Pick the mode nearest the highest voted content rate, preferring
    /// an integer multiple of it.
    pub fn refresh_rate_for_content(&self, layers: &[LayerRequirement]) -> RefreshRate {
        let state = self.state.lock();

        let content_fps = layers
            .iter()
            .filter(|layer| layer.vote != LayerVoteType::NoVote)
            .map(|layer| layer.desired_refresh_rate)
            .fold(0.0f32, f32::max);
        if content_fps <= 0.0 {
            return self.configs[&state.current].clone();
        }

        let nearest_idx = state
            .available
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (a.fps - content_fps)
                    .abs()
                    .partial_cmp(&(b.fps - content_fps).abs())
                    .expect("fps is finite")
            })
            .map(|(idx, _)| idx)
            .expect("available never empty");

        let is_multiple = |rate: &RefreshRate| {
            let ratio = rate.fps / content_fps;
            (ratio.round() - ratio).abs() <= V1_RATIO_MARGIN
        };

        if !is_multiple(&state.available[nearest_idx]) {
            // Scan toward higher rates for one that divides evenly.
            for rate in &state.available[nearest_idx..] {
                if is_multiple(rate) {
                    return rate.clone();
                }
            }
        }
        state.available[nearest_idx].clone()
    }
}

/// Score one content layer against one display period.
///
/// Exact multiples (within the margin) earn the full weight. Rates slower
/// than the content are penalized by how much of the frame they can show.
/// Otherwise the score decays with the number of vsyncs it takes the
/// cadence to realign.
fn layer_score(desired_refresh_rate: f32, weight: f32, display_period_ns: i64) -> f32 {
    if desired_refresh_rate <= 0.0 {
        return 0.0;
    }
    let layer_period_ns = (1e9 / desired_refresh_rate).round() as i64;

    let remainder = layer_period_ns % display_period_ns;
    if remainder <= MARGIN_NS || display_period_ns - remainder <= MARGIN_NS {
        // The layer period is a whole number of vsyncs.
        return weight;
    }

    if layer_period_ns / display_period_ns == 0 {
        // Content is faster than the display; it can only show a fraction
        // of its frames.
        return weight * (layer_period_ns as f32 / display_period_ns as f32)
            / (MAX_FRAMES_TO_FIT + 1) as f32;
    }

    let mut diff = (remainder - (display_period_ns - remainder)).abs();
    let mut iter = 2i64;
    while diff > MARGIN_NS && iter < MAX_FRAMES_TO_FIT {
        diff -= display_period_ns - diff;
        iter += 1;
    }
    weight / iter as f32
}
