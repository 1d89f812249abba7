// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Spectre CLI entrypoint.
//!
//! Runs physics scenarios headless and prints what happened.
//!
//! # Usage
//! ```text
//! spectre run --scenario scene.json --ticks 600
//! spectre config
//! ```
//!
//! `run` writes a JSON [`report::RunReport`] to stdout; logs go to stderr.
//! The CLI exits with code `0` on success and non-zero on error.

// The CLI is expected to print to stdout.
#![allow(clippy::print_stdout)]

mod report;
mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use spectre_physics::{update, PhysicsConfig, PoseRecorder, SimContext};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::report::RunReport;
use crate::scenario::Scenario;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Maximum log level written to stderr
    #[clap(long, global = true, default_value_t = Level::INFO)]
    log_level: Level,

    /// Command to execute
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Step a scenario file and print a JSON report
    Run {
        /// Path to the scenario JSON
        #[clap(short, long)]
        scenario: PathBuf,

        /// Number of ticks to step
        #[clap(short, long, default_value_t = 60)]
        ticks: u64,

        /// Seconds per tick
        #[clap(long, default_value_t = 1.0 / 60.0)]
        dt: f32,

        /// Print the report on one line
        #[clap(long)]
        compact: bool,
    },
    /// Print the default physics config as JSON
    Config,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    match args.cmd {
        Command::Run { scenario, ticks, dt, compact } => {
            let report = run(&scenario, ticks, dt)?;
            let json = if compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            println!("{json}");
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&PhysicsConfig::default())?);
        }
    }
    Ok(())
}

fn run(path: &Path, ticks: u64, dt: f32) -> Result<RunReport> {
    if !(dt.is_finite() && dt > 0.0) {
        bail!("--dt must be a positive number of seconds, got {dt}");
    }
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let scenario = Scenario::from_json(&text)?;
    let world = scenario.build_world()?;
    let terrain = scenario.terrain.build()?;
    info!(bodies = world.len(), ticks, dt, "scenario loaded");

    let mut ctx = SimContext::new(world, terrain, PoseRecorder::new());
    let mut report = RunReport::default();
    for _ in 0..ticks {
        update(&mut ctx, dt).with_context(|| format!("tick {} failed", ctx.world.ticks() + 1))?;
        report.record_tick(&ctx.world);
    }
    report.finish(&ctx.world, &ctx.presentation);
    info!(ticks = report.ticks, events = report.events.len(), "run complete");
    Ok(report)
}
