//! Textual dump of retained display frames
//!
//! Renders the engine's retained frames for the compositor's dumpsys
//! surface: `-jank` limits output to frames that classified janky, `-all`
//! prints every retained frame. All times are printed relative to the
//! frame's earliest known timestamp, in milliseconds.

use std::fmt::Write;

use crate::display_frame::DisplayFrame;
use crate::surface_frame::SurfaceFrame;
use crate::timeline::FrameTimeline;
use crate::types::{PredictionState, TimelineItem};

/// Dump selection, mapped from the `-jank` / `-all` flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpOptions {
    /// Print only frames with a non-empty jank classification.
    pub jank_only: bool,
}

impl FrameTimeline {
    /// Render the retained display frames as text.
    pub fn dump(&self, options: DumpOptions) -> String {
        let frames = self.retained_frames();
        let mut selected = Vec::new();
        for frame in &frames {
            let frame = frame.lock();
            if options.jank_only && !frame.has_jank() {
                continue;
            }
            selected.push(render_display_frame(&frame));
        }

        let mut out = String::new();
        let _ = writeln!(out, "Number of display frames : {}", selected.len());
        for block in selected {
            let _ = writeln!(out);
            out.push_str(&block);
        }
        out
    }
}

/// Earliest known timestamp of a prediction/actuals pair.
///
/// Considers the predicted start only for valid predictions and skips
/// unknown (zero) actuals. Returns `i64::MAX` when nothing is known.
fn min_time(prediction_state: PredictionState, predictions: TimelineItem, actuals: TimelineItem) -> i64 {
    let mut min = i64::MAX;
    if prediction_state == PredictionState::Valid {
        min = min.min(predictions.start_ns);
    }
    for actual in [actuals.start_ns, actuals.end_ns, actuals.present_ns] {
        if actual != 0 {
            min = min.min(actual);
        }
    }
    min
}

fn display_frame_base_time(frame: &DisplayFrame) -> i64 {
    let mut base = min_time(frame.prediction_state(), frame.predictions(), frame.actuals());
    for surface_frame in frame.surface_frames() {
        base = base.min(min_time(
            surface_frame.prediction_state(),
            surface_frame.predictions(),
            surface_frame.actuals(),
        ));
    }
    if base == i64::MAX {
        0
    } else {
        base
    }
}

fn fmt_rel_ms(time_ns: i64, base_ns: i64) -> String {
    if time_ns == 0 {
        return "N/A".to_string();
    }
    format!("{:.2}", (time_ns - base_ns) as f64 / 1e6)
}

fn fmt_ms(duration_ns: i64) -> String {
    format!("{:.2}", duration_ns as f64 / 1e6)
}

fn render_timeline_table(
    out: &mut String,
    indent: &str,
    predictions: TimelineItem,
    actuals: TimelineItem,
    base_ns: i64,
) {
    let _ = writeln!(
        out,
        "{indent}{:<12}{:<12}{:<12}{:<12}",
        "", "Start", "End", "Present"
    );
    let _ = writeln!(
        out,
        "{indent}{:<12}{:<12}{:<12}{:<12}",
        "Predicted",
        fmt_rel_ms(predictions.start_ns, base_ns),
        fmt_rel_ms(predictions.end_ns, base_ns),
        fmt_rel_ms(predictions.present_ns, base_ns),
    );
    let _ = writeln!(
        out,
        "{indent}{:<12}{:<12}{:<12}{:<12}",
        "Actual",
        fmt_rel_ms(actuals.start_ns, base_ns),
        fmt_rel_ms(actuals.end_ns, base_ns),
        fmt_rel_ms(actuals.present_ns, base_ns),
    );
}

fn render_display_frame(frame: &DisplayFrame) -> String {
    let base_ns = display_frame_base_time(frame);
    let actuals = frame.actuals();
    let predictions = frame.predictions();
    let present_delta_ns = actuals.present_ns - predictions.present_ns;
    let vsync_period_ns = frame.vsync_period_ns();
    let delta_to_vsync_ns = if vsync_period_ns > 0 {
        present_delta_ns.abs() % vsync_period_ns
    } else {
        0
    };

    let mut out = String::new();
    let _ = writeln!(out, "Display Frame : token = {}", frame.token());
    let _ = writeln!(out, "  Prediction state : {}", frame.prediction_state().label());
    let _ = writeln!(out, "  Jank type : {}", frame.jank_type().description());
    let _ = writeln!(out, "  Present metadata : {}", frame.present_metadata().label());
    let _ = writeln!(out, "  Ready metadata : {}", frame.ready_metadata().label());
    let _ = writeln!(out, "  Start metadata : {}", frame.start_metadata().label());
    let _ = writeln!(out, "  Vsync period : {} ms", fmt_ms(vsync_period_ns));
    let _ = writeln!(out, "  Present delta : {} ms", fmt_ms(present_delta_ns));
    let _ = writeln!(
        out,
        "  Present delta (mod vsync) : {} ms",
        fmt_ms(delta_to_vsync_ns)
    );
    render_timeline_table(&mut out, "  ", predictions, actuals, base_ns);

    for surface_frame in frame.surface_frames() {
        render_surface_frame(&mut out, surface_frame, base_ns);
    }
    out
}

fn render_surface_frame(out: &mut String, frame: &SurfaceFrame, base_ns: i64) {
    let _ = writeln!(
        out,
        "    Surface Frame : token = {}, layer = {} (pid {}, uid {})",
        frame.token(),
        frame.layer_name(),
        frame.owner_pid(),
        frame.owner_uid(),
    );
    let _ = writeln!(out, "      Present state : {}", frame.present_state().label());
    let _ = writeln!(
        out,
        "      Prediction state : {}",
        frame.prediction_state().label()
    );
    let _ = writeln!(out, "      Jank type : {}", frame.jank_type().description());
    let _ = writeln!(
        out,
        "      Present metadata : {}",
        frame.present_metadata().label()
    );
    let _ = writeln!(
        out,
        "      Ready metadata : {}",
        frame.ready_metadata().label()
    );
    render_timeline_table(out, "      ", frame.predictions(), frame.actuals(), base_ns);
}
