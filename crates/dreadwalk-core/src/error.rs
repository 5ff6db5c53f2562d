//! Error types for configuration and simulation setup.
//!
//! Only misconfiguration is an error. Domain no-ops (zero movement input, a
//! trace that misses, damage on a dead actor) are ordinary outcomes and never
//! surface here.

use thiserror::Error;

use crate::entity::{EntityId, EntityTag};

/// A tuning value or configuration file was rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value that must be strictly positive was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A value that may be zero was negative.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A value was NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation setup or frame-start failure.
///
/// Every variant is raised before any state changes, so a failed call leaves
/// the simulation untouched.
#[derive(Debug, Error)]
pub enum SimError {
    /// Spawn-time configuration was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A pursuer was bound to something other than a live player.
    #[error("pursuer target {target} is not a player (found {found:?})")]
    InvalidTarget {
        /// Requested target.
        target: EntityId,
        /// What the id resolved to, if anything.
        found: Option<EntityTag>,
    },

    /// A pursuer's target was removed after the pursuer was spawned.
    #[error("pursuer {pursuer} lost its target {target}")]
    TargetMissing {
        /// The pursuer whose binding is dangling.
        pursuer: EntityId,
        /// The removed target.
        target: EntityId,
    },

    /// No entity with this id exists.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// The entity has no health.
    #[error("entity {0} cannot take damage")]
    NotDamageable(EntityId),

    /// The frame time was negative or not finite.
    #[error("invalid frame time {0}")]
    InvalidFrameTime(f32),
}

/// Convenience alias for simulation results.
pub type SimResult<T> = Result<T, SimError>;
