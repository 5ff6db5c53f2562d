//! Dreadwalk sandbox.
//!
//! Loads a scene, steps it for a fixed number of frames with the scene's
//! scripted input, and logs what happened.

mod demo;
mod logging;

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use dreadwalk_core::{Event, FrameContext, FrameReport, SceneConfig, Simulation};
use tracing::{debug, info, warn};

/// Headless runner for Dreadwalk encounters
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scene file (JSON). Uses the built-in demo scene when omitted.
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Frame time in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Totals gathered over a run.
#[derive(Debug, Default, Clone, PartialEq)]
struct Summary {
    frames: u64,
    shots: usize,
    hits: usize,
    dry_fires: usize,
    deaths: usize,
    removed: usize,
}

impl Summary {
    fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.removed += report.removed.len();
        for event in &report.events {
            match event {
                Event::ShotFired { hit, .. } => {
                    self.shots += 1;
                    self.hits += usize::from(hit.is_some());
                }
                Event::DryFire { .. } => self.dry_fires += 1,
                Event::Died { .. } => self.deaths += 1,
                _ => {}
            }
        }
    }
}

fn load_scene(path: Option<&PathBuf>) -> Result<SceneConfig> {
    let Some(path) = path else {
        info!("using built-in demo scene");
        return Ok(demo::scene());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scene {}", path.display()))?;
    SceneConfig::from_json(&text).with_context(|| format!("parsing scene {}", path.display()))
}

fn run(scene: &SceneConfig, frames: u64, dt: f32) -> Result<(Simulation, Summary)> {
    let mut sim = Simulation::from_scene(scene)?;
    let mut summary = Summary::default();

    for frame in 0..frames {
        let report = sim.step(&FrameContext::new(dt, scene.input_at(frame)))?;
        if !report.is_quiet() {
            debug!(tick = report.tick, events = report.events.len(), removed = ?report.removed, "frame");
        }
        for event in &report.events {
            if let Event::Died { entity } = event {
                info!(tick = report.tick, %entity, "died");
            }
        }
        summary.record(&report);

        let player_alive = sim
            .player()
            .and_then(|id| sim.arena().get(id))
            .and_then(|e| e.as_damageable())
            .is_some_and(|d| d.health().is_alive());
        if !player_alive {
            warn!(tick = report.tick, "player is dead, stopping early");
            break;
        }
    }
    Ok((sim, summary))
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);
    ensure!(
        args.dt.is_finite() && args.dt >= 0.0,
        "frame time must be a non-negative number, got {}",
        args.dt
    );

    let scene = load_scene(args.scene.as_ref())?;
    let (sim, summary) = run(&scene, args.frames, args.dt)?;

    let pursuers_left = sim.arena().entities_sorted().filter(|e| e.is_pursuer()).count();
    if let Some(player) = sim.player().and_then(|id| sim.arena().get(id)) {
        let health = player.as_damageable().map_or(0.0, |d| d.health().current());
        info!(
            position = ?player.inner().transform().position,
            health,
            "player"
        );
    }
    info!(
        frames = summary.frames,
        shots = summary.shots,
        hits = summary.hits,
        dry_fires = summary.dry_fires,
        deaths = summary.deaths,
        removed = summary.removed,
        pursuers_left,
        "run complete"
    );
    Ok(())
}
