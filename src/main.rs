//! Moon Lander headless runner
//!
//! Flies the autopilot over a seeded terrain and prints the final snapshot as
//! JSON.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;

use moon_lander::autopilot::autopilot;
use moon_lander::settings::{RcsFrame, SpawnAnchor};
use moon_lander::sim::{FixedTimestep, GamePhase, Session, SessionCommand, TickInput, tick};
use moon_lander::{Seed, Settings};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Terrain seed: an integer, or any phrase
    #[arg(default_value = "42")]
    seed: Seed,

    /// Settings json file path
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Number of attempts, each on fresh terrain
    #[arg(long, default_value = "1")]
    attempts: u32,

    /// Tick limit per attempt (3600 is a minute at 60 Hz)
    #[arg(long, default_value = "3600")]
    max_ticks: u64,

    /// RCS thrust frame: world or body
    #[arg(long, value_name = "FRAME", value_parser = parse_rcs)]
    rcs: Option<RcsFrame>,

    /// Spawn anchor: center or pad
    #[arg(long, value_name = "ANCHOR", value_parser = parse_spawn)]
    spawn: Option<SpawnAnchor>,

    /// Pace ticks against the wall clock
    #[arg(long)]
    realtime: bool,
}

fn parse_rcs(s: &str) -> Result<RcsFrame, String> {
    RcsFrame::from_str(s).ok_or_else(|| format!("unknown RCS frame {s:?} (world, body)"))
}

fn parse_spawn(s: &str) -> Result<SpawnAnchor, String> {
    SpawnAnchor::from_str(s).ok_or_else(|| format!("unknown spawn anchor {s:?} (center, pad)"))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(rcs) = cli.rcs {
        settings.physics.rcs_frame = rcs;
    }
    if let Some(anchor) = cli.spawn {
        settings.spawn.anchor = anchor;
    }

    log::info!(
        "Moon Lander starting with seed {} (RCS {}, spawn {})",
        cli.seed,
        settings.physics.rcs_frame.as_str(),
        settings.spawn.anchor.as_str()
    );
    let mut session = Session::new(cli.seed, settings);

    run_attempts(&mut session, cli.attempts, cli.max_ticks, cli.realtime);

    let json = serde_json::to_string_pretty(&session.snapshot()).context("encoding snapshot")?;
    println!("{json}");
    Ok(())
}

/// Fly up to `attempts` attempts, each on new terrain; returns how many ended
fn run_attempts(session: &mut Session, attempts: u32, max_ticks: u64, realtime: bool) -> u32 {
    let mut finished = 0;
    for attempt in 0..attempts {
        if attempt > 0 {
            tick(session, &TickInput::command(SessionCommand::NewTerrain));
        }
        let phase = fly(session, max_ticks, realtime);
        if phase.is_flying() {
            // The session only takes commands once an attempt has ended
            log::warn!(
                "Attempt {} still flying after {} ticks, stopping",
                session.attempt(),
                max_ticks
            );
            break;
        }
        finished += 1;
        log::info!(
            "Attempt {} on seed {}: {} after {} ticks",
            session.attempt(),
            session.seed(),
            phase.label(),
            session.time_ticks()
        );
    }
    finished
}

/// Run one attempt until it ends or the tick limit is hit
fn fly(session: &mut Session, max_ticks: u64, realtime: bool) -> GamePhase {
    if !realtime {
        while session.phase().is_flying() && session.time_ticks() < max_ticks {
            tick(session, &TickInput::controls(autopilot(session)));
        }
        return session.phase();
    }

    let mut clock = FixedTimestep::default();
    let frame = Duration::from_secs_f64(clock.step_secs());
    let mut last = Instant::now();
    while session.phase().is_flying() && session.time_ticks() < max_ticks {
        let now = Instant::now();
        let substeps = clock.advance(now - last);
        last = now;

        for _ in 0..substeps {
            // Controls are sampled once per tick
            let input = TickInput::controls(autopilot(session));
            if !tick(session, &input).is_flying() {
                break;
            }
        }
        std::thread::sleep(frame);
    }
    session.phase()
}
