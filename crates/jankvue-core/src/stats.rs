//! Jank statistics sink
//!
//! Classification reports every janky frame to a [`JankStats`] sink, once
//! keyed by owner uid and layer and once globally. The sink is best-effort;
//! the engine holds it behind an `Arc` and surface frames observe it weakly
//! so a torn-down sink never extends frame lifetime.

use parking_lot::Mutex;

use crate::jank::JankType;

/// Best-effort jank counters.
pub trait JankStats: Send + Sync {
    /// Count a janky surface frame for one layer.
    fn increment_janky_frames_for_layer(&self, uid: i32, layer_name: &str, jank: JankType);

    /// Count a janky display frame.
    fn increment_janky_frames(&self, jank: JankType);
}

/// Sink that drops every report.
#[derive(Debug, Default)]
pub struct NoopStats;

impl JankStats for NoopStats {
    fn increment_janky_frames_for_layer(&self, _uid: i32, _layer_name: &str, _jank: JankType) {}

    fn increment_janky_frames(&self, _jank: JankType) {}
}

/// One layer-keyed report captured by [`RecordingStats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerJankReport {
    pub uid: i32,
    pub layer_name: String,
    pub jank: JankType,
}

#[derive(Debug, Default)]
struct RecordedReports {
    layer: Vec<LayerJankReport>,
    global: Vec<JankType>,
}

/// Sink recording every report, for tests and the CLI replay.
#[derive(Debug, Default)]
pub struct RecordingStats {
    reports: Mutex<RecordedReports>,
}

impl RecordingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer_reports(&self) -> Vec<LayerJankReport> {
        self.reports.lock().layer.clone()
    }

    pub fn global_reports(&self) -> Vec<JankType> {
        self.reports.lock().global.clone()
    }
}

impl JankStats for RecordingStats {
    fn increment_janky_frames_for_layer(&self, uid: i32, layer_name: &str, jank: JankType) {
        self.reports.lock().layer.push(LayerJankReport {
            uid,
            layer_name: layer_name.to_string(),
            jank,
        });
    }

    fn increment_janky_frames(&self, jank: JankType) {
        self.reports.lock().global.push(jank);
    }
}
