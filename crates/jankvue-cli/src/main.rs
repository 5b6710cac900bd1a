//! Jankvue CLI - frame timeline replay and dump tool
//!
//! Replays a synthetic compositor schedule through a real engine so the
//! dump surface and trace output can be inspected without a compositor.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

/// Jankvue - frame timeline observability tool
#[derive(Parser, Debug)]
#[command(name = "jankvue")]
#[command(about = "Replay and inspect compositor frame timelines", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a synthetic schedule and print the frame dump
    Replay {
        /// Number of vsync cycles to replay
        #[arg(short = 'n', long, default_value = "32")]
        cycles: usize,

        /// Print only janky frames (the `-jank` dump)
        #[arg(long)]
        jank: bool,

        /// Print every retained frame (the `-all` dump)
        #[arg(long)]
        all: bool,

        /// Emit captured trace packets as JSON instead of the dump
        #[arg(short = 'F', long, default_value = "text")]
        format: String,
    },

    /// Exercise the refresh-rate selector against sample vote sets
    Modes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level.parse().unwrap_or(tracing::Level::WARN))
        .init();

    match cli.command {
        Commands::Replay {
            cycles,
            jank,
            all,
            format,
        } => {
            commands::replay::run(cycles, jank, all, &format)?;
        }
        Commands::Modes => {
            commands::modes::run();
        }
    }

    Ok(())
}
