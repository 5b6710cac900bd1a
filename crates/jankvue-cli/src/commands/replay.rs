//! Replay command - drive a synthetic schedule through the engine
//!
//! Simulates a 60Hz compositor: one layer submitting every cycle, with
//! periodic app deadline misses, compositor CPU overruns, and dropped
//! frames mixed in so every classification path shows up in the dump.

use std::sync::Arc;

use anyhow::{bail, Result};

use jankvue_core::{
    DumpOptions, FrameTimeline, JankStats, JankThresholds, ManualClock, ManualFence,
    MonotonicClock, PresentState, RecordingStats, TimelineItem,
};
use jankvue_trace::{InMemorySink, TraceSink};

const MS: i64 = 1_000_000;
const VSYNC: i64 = 16 * MS + 666_667;
const SF_PID: i32 = 1;

pub fn run(cycles: usize, jank: bool, all: bool, format: &str) -> Result<()> {
    let clock = Arc::new(ManualClock::new(0));
    let stats = Arc::new(RecordingStats::new());
    let sink = Arc::new(InMemorySink::new());
    let timeline = FrameTimeline::new(
        clock.clone() as Arc<dyn MonotonicClock>,
        stats.clone() as Arc<dyn JankStats>,
        sink.clone() as Arc<dyn TraceSink>,
        SF_PID,
        JankThresholds::default(),
    );

    replay_schedule(&timeline, &clock, cycles);
    sink.flush_staged();

    match format {
        "json" => {
            let packets = sink.packets();
            println!("{}", serde_json::to_string_pretty(&packets)?);
        }
        "text" => {
            // `--jank` narrows the dump; `--all` (or neither) prints
            // every retained frame.
            let jank_only = jank && !all;
            print!("{}", timeline.dump(DumpOptions { jank_only }));

            let janky_layers = stats.layer_reports().iter().filter(|r| !r.jank.is_empty()).count();
            println!();
            println!("Janky surface frames : {janky_layers}");
            println!(
                "Observed fps (app#0) : {:.2}",
                timeline.compute_fps(&["app#0"])
            );
        }
        other => bail!("unknown output format: {other}"),
    }

    Ok(())
}

/// One layer at 60Hz with every classification path represented.
fn replay_schedule(timeline: &FrameTimeline, clock: &ManualClock, cycles: usize) {
    for k in 0..cycles as i64 {
        let cycle_start = k * VSYNC;
        clock.set_ns(cycle_start);

        let app_start = cycle_start;
        let app_deadline = cycle_start + 8 * MS;
        let sf_wake = cycle_start + 10 * MS;
        let sf_deadline = cycle_start + 14 * MS;
        let predicted_present = cycle_start + VSYNC;

        let surface_token =
            timeline.generate_token(TimelineItem::new(app_start, app_deadline, predicted_present));
        let display_token =
            timeline.generate_token(TimelineItem::new(sf_wake, sf_deadline, predicted_present));

        let frame = timeline.create_surface_frame_for_token(
            Some(surface_token),
            1000,
            10032,
            "app#0".to_string(),
            "com.example.app".to_string(),
        );
        frame.set_actual_start_time(app_start);

        let dropped = k % 13 == 5;
        let app_miss = k % 7 == 3;
        let sf_miss = k % 11 == 4;

        // An app miss pushes the acquire fence past the app deadline.
        let acquire_time = if app_miss {
            app_deadline + 6 * MS
        } else {
            app_deadline - 2 * MS
        };
        frame.set_acquire_fence_time(acquire_time);
        frame.set_actual_queue_time(acquire_time - MS);

        timeline.set_sf_wake_up(display_token, sf_wake, VSYNC);
        if dropped {
            frame.set_present_state(PresentState::Dropped, 0);
        } else {
            frame.set_present_state(PresentState::Presented, 0);
        }
        timeline.add_surface_frame(frame);

        // A compositor miss overruns the cycle and slips one vsync.
        let (sf_end, signal_time) = if sf_miss || app_miss {
            (sf_deadline + 4 * MS, predicted_present + VSYNC)
        } else {
            (sf_deadline - MS, predicted_present)
        };
        clock.set_ns(sf_end);

        let fence = ManualFence::pending();
        timeline.set_sf_present(sf_end, fence.clone(), None);
        fence.signal_at(signal_time);
    }

    // One trailing cycle so the last real fence gets swept.
    clock.advance_ns(VSYNC);
    timeline.set_sf_present(clock.now_ns(), ManualFence::pending(), None);
}
