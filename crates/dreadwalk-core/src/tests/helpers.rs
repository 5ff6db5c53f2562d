//! Test helper functions for setting up simulations and actors.
//!
//! This module provides factory functions and setup utilities that make
//! writing tests more ergonomic and consistent.

use glam::Vec3;

use crate::arena::Arena;
use crate::config::{PlayerConfig, PursuerConfig, SimulationConfig};
use crate::entity::{Classification, EntityId, PlayerComponents, PursuerComponents};
use crate::input::InputFrame;
use crate::plugin::FrameContext;
use crate::simulation::{FrameReport, Simulation};

/// Frame time used throughout the suites.
pub const DT: f32 = 1.0 / 60.0;

// =============================================================================
// Scenario Setup
// =============================================================================

/// Creates a simulation with a large floor whose top is at y = 0.
pub fn floor_sim(config: SimulationConfig) -> Simulation {
    let mut sim = Simulation::new(config).unwrap();
    sim.spawn_scenery(
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(200.0, 0.5, 200.0),
        Classification::GROUND | Classification::SOLID,
    )
    .unwrap();
    sim
}

/// Sets up the standard encounter: the player at the origin facing +Z and
/// one pursuer straight ahead at `distance`.
///
/// # Returns
///
/// A tuple of (player_id, pursuer_id).
pub fn setup_encounter(
    sim: &mut Simulation,
    player_config: PlayerConfig,
    distance: f32,
) -> (EntityId, EntityId) {
    let player = sim.spawn_player(Vec3::ZERO, 0.0, player_config).unwrap();
    let pursuer = sim
        .spawn_pursuer(
            Vec3::new(0.0, 0.0, distance),
            player,
            PursuerConfig::default(),
        )
        .unwrap();
    (player, pursuer)
}

// =============================================================================
// Frame Driving
// =============================================================================

/// Steps one frame with `input`.
pub fn step(sim: &mut Simulation, input: InputFrame) -> FrameReport {
    sim.step(&FrameContext::new(DT, input)).unwrap()
}

/// Steps `frames` frames with the same input and returns every report.
pub fn run_frames(sim: &mut Simulation, frames: usize, input: InputFrame) -> Vec<FrameReport> {
    (0..frames).map(|_| step(sim, input)).collect()
}

// =============================================================================
// State Query Functions
// =============================================================================

/// Gets the player components of an entity.
///
/// # Panics
///
/// Panics if the entity is missing or not a player.
pub fn player(arena: &Arena, id: EntityId) -> &PlayerComponents {
    arena
        .get(id)
        .and_then(|e| e.inner().as_player())
        .expect("player exists")
}

/// Gets the pursuer components of an entity.
///
/// # Panics
///
/// Panics if the entity is missing or not a pursuer.
pub fn pursuer(arena: &Arena, id: EntityId) -> &PursuerComponents {
    arena
        .get(id)
        .and_then(|e| e.inner().as_pursuer())
        .expect("pursuer exists")
}

/// Gets the current health of an entity.
///
/// Returns 0.0 if the entity doesn't exist or has no health.
pub fn health(arena: &Arena, id: EntityId) -> f32 {
    arena
        .get(id)
        .and_then(|e| e.as_damageable())
        .map_or(0.0, |d| d.health().current())
}

/// Gets the position of an entity, if it exists.
pub fn position(arena: &Arena, id: EntityId) -> Option<Vec3> {
    arena.get(id).map(|e| e.inner().transform().position)
}

// =============================================================================
// Tests for helpers
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encounter_places_actors() {
        let mut sim = floor_sim(SimulationConfig::default());
        let (p, e) = setup_encounter(&mut sim, PlayerConfig::default(), 10.0);

        assert_eq!(position(sim.arena(), p), Some(Vec3::ZERO));
        assert_eq!(position(sim.arena(), e), Some(Vec3::new(0.0, 0.0, 10.0)));
        assert!((health(sim.arena(), e) - 5.0).abs() < f32::EPSILON);
        assert!((health(sim.arena(), p) - 10.0).abs() < f32::EPSILON);
        assert_eq!(pursuer(sim.arena(), e).navigation.target, p);
    }

    #[test]
    fn run_frames_reports_each_tick() {
        let mut sim = floor_sim(SimulationConfig::default());
        let reports = run_frames(&mut sim, 3, InputFrame::IDLE);
        let ticks: Vec<u64> = reports.iter().map(|r| r.tick).collect();
        assert_eq!(ticks, vec![0, 1, 2]);
    }

    #[test]
    fn missing_entities_have_no_health() {
        let sim = floor_sim(SimulationConfig::default());
        assert!(health(sim.arena(), EntityId::new(1234)).abs() < f32::EPSILON);
        assert_eq!(position(sim.arena(), EntityId::new(1234)), None);
    }
}
