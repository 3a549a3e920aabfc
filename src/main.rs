//! Headless runner: plays a scripted or recorded input sequence over a
//! level and prints where the actor ends up.
//!
//! ```bash
//! cargo run --release -- --script "R*120 R+J R*60 .*60" --trace
//! cargo run --release -- --level hills.txt --set topspeed=420 --record run.bin
//! cargo run --release -- --replay run.bin
//! ```

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use log::info;

use platphys::{
    logging,
    sim::{FIXED_TIMESTEP, PhysicsActor, Replay},
    world::{Level, level},
};

const DEFAULT_SCRIPT: &str = "R*120 R+J R*60 .*30 L*40 D*5 .*60";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// ASCII level file; the built-in demo level when omitted
    #[arg(long, value_name = "FILE")]
    level: Option<PathBuf>,

    /// Input script, e.g. "R*60 R+J .*30"
    #[arg(long, conflicts_with = "replay")]
    script: Option<String>,

    /// Play back a recorded replay
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Save the input sequence that was played
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,

    /// Override a tunable, e.g. --set grv=500 (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,

    /// Print one line per simulated frame
    #[arg(long)]
    trace: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    // ─────────── level ────────────
    let level = match &args.level {
        Some(path) => {
            Level::load(path).with_context(|| format!("loading level {}", path.display()))?
        }
        None => level::parse(level::DEMO)?,
    };
    info!(
        "level: {} bricks, {}x{} px, spawn at {}",
        level.map.len(),
        level.size.x,
        level.size.y,
        level.spawn
    );

    // ─────────── input ────────────
    let replay = match &args.replay {
        Some(path) => {
            Replay::load(path).with_context(|| format!("loading replay {}", path.display()))?
        }
        None => {
            let script = args.script.as_deref().unwrap_or(DEFAULT_SCRIPT);
            Replay::from_script(level.spawn, FIXED_TIMESTEP, script)?
        }
    };
    if replay.is_empty() {
        bail!("nothing to play: the input sequence is empty");
    }

    // ─────────── actor ────────────
    let mut actor = PhysicsActor::new(replay.spawn());
    for assignment in &args.set {
        actor
            .apply_assignment(assignment)
            .with_context(|| format!("--set {assignment}"))?;
    }

    if let Some(path) = &args.record {
        replay
            .save(path)
            .with_context(|| format!("saving replay {}", path.display()))?;
        info!("recorded {} frames to {}", replay.len(), path.display());
    }

    // ─────────── run ────────────
    let trace = args.trace;
    let last = replay.play_with(actor, &level.map, |frame, pa| {
        if trace {
            let state = format!("{:?}", pa.state());
            println!(
                "{frame:5} {state:<10} pos ({:8.2}, {:8.2}) gsp {:8.2} xsp {:8.2} ysp {:8.2} angle {:3}° {:?}",
                pa.position().x,
                pa.position().y,
                pa.gsp(),
                pa.xsp(),
                pa.ysp(),
                pa.angle_degrees(),
                pa.movement_mode(),
            );
        }
    });

    println!(
        "after {} frames: {:?} at ({:.2}, {:.2}), gsp {:.2}, {}",
        replay.len(),
        last.state,
        last.position.x,
        last.position.y,
        last.gsp,
        if last.midair { "midair" } else { "grounded" },
    );
    Ok(())
}
