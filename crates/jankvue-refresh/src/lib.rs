//! jankvue-refresh: display-mode table and refresh-rate selection
//!
//! Holds the table of hardware display modes, filters it by the active
//! policy, and picks a mode per call from a set of per-layer cadence votes.
//! Independent of the frame timeline; the compositor consults it when
//! content changes and feeds the chosen vsync period back into frame
//! predictions.

pub mod rate;
pub mod selector;

pub use rate::{ConfigId, LayerRequirement, LayerVoteType, Policy, RefreshRate, SelectorError};
pub use selector::RefreshRateSelector;
