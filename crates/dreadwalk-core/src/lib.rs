//! # Dreadwalk Core
//!
//! Frame-stepped actor simulation for Dreadwalk.
//!
//! This crate provides the deterministic simulation of a first-person
//! survival-horror encounter: a player who walks, looks, jumps and shoots,
//! and enemies that relentlessly close in. It implements the
//! Entity-Plugin-Resolver architecture.
//!
//! ## Architecture
//!
//! - **Entities**: Player, pursuers, static scenery
//! - **Plugins**: Locomotion (player input), pursuit (enemy re-targeting)
//! - **Resolvers**: Physics, navigation, combat, events
//!
//! Each [`Simulation::step`](simulation::Simulation::step) runs plugins
//! against a frozen snapshot, routes their outputs to resolvers that write
//! the next state, then swaps the two.
//!
//! ## Usage
//!
//! ```
//! use dreadwalk_core::config::{PlayerConfig, SimulationConfig};
//! use dreadwalk_core::entity::Classification;
//! use dreadwalk_core::input::InputFrame;
//! use dreadwalk_core::plugin::FrameContext;
//! use dreadwalk_core::simulation::Simulation;
//! use glam::Vec3;
//!
//! let mut sim = Simulation::new(SimulationConfig::default())?;
//! sim.spawn_scenery(
//!     Vec3::new(0.0, -0.5, 0.0),
//!     Vec3::new(50.0, 0.5, 50.0),
//!     Classification::GROUND | Classification::SOLID,
//! )?;
//! let player = sim.spawn_player(Vec3::ZERO, 0.0, PlayerConfig::default())?;
//!
//! let report = sim.step(&FrameContext::new(1.0 / 60.0, InputFrame::walk(0.0, 1.0)))?;
//! assert_eq!(report.tick, 0);
//! assert!(sim.arena().contains(player));
//! # Ok::<(), dreadwalk_core::error::SimError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod combat;
pub mod config;
pub mod entity;
pub mod error;
pub mod input;
pub mod output;
pub mod plugin;
pub mod plugins;
pub mod resolver;
pub mod simulation;
pub mod world_view;

#[cfg(test)]
mod tests;

pub use arena::Arena;
pub use combat::{perform_trace, Damageable, TraceHit};
pub use config::{PlayerConfig, PursuerConfig, SceneConfig, SimulationConfig};
pub use entity::{Classification, DamageOutcome, EntityId, EntityTag};
pub use error::{ConfigError, SimError, SimResult};
pub use input::{Axis, Button, InputFrame, InputSource};
pub use output::Event;
pub use plugin::FrameContext;
pub use simulation::{FrameReport, Simulation};
