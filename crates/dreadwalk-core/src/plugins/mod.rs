//! Actor plugins for the Entity-Plugin-Resolver architecture.
//!
//! - [`LocomotionPlugin`]: Player look, movement, jump and fire from input
//! - [`PursuitPlugin`]: Enemy re-targeting toward a tracked entity
//!
//! # Architecture
//!
//! Plugins follow the Entity-Plugin-Resolver pattern:
//! - Plugins read from an immutable [`WorldView`](crate::world_view::WorldView)
//! - Plugins emit [`Output`](crate::output::Output)s as proposals for state changes
//! - Resolvers collect and process outputs to mutate state
//!
//! # Registration
//!
//! Use [`PluginRegistry::default_bundles()`](crate::plugin::PluginRegistry::default_bundles)
//! to create a registry with both plugins registered for their entity types.

mod locomotion;
mod pursuit;

pub use locomotion::{clamp_pitch, movement_direction, LocomotionPlugin};
pub use pursuit::PursuitPlugin;
