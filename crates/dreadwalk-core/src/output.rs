//! Output system for the Entity-Plugin-Resolver architecture.
//!
//! Plugins never mutate state. They emit outputs, which are proposals for
//! state changes collected during the plugin phase and applied by resolvers.
//!
//! # Architecture
//!
//! The output system uses a nested enum hierarchy for categorical routing:
//! - [`Command`]: Direct state change requests (`SetLook`, `ApplyImpulse`, etc.)
//! - [`Modifier`]: Value modifications (`ApplyDamage`)
//! - [`Event`]: Notifications of things that happened (`ShotFired`, `DamageDealt`, etc.)
//!
//! All outputs are wrapped in [`OutputEnvelope`], which records the emitting
//! plugin instance, a trace id, the tick and a sequence number. The sequence
//! number preserves emission order within one plugin run.
//!
//! # Example
//!
//! ```
//! use dreadwalk_core::output::{
//!     Output, Command, OutputEnvelope, PluginInstanceId, PluginId, TraceId,
//! };
//! use dreadwalk_core::entity::EntityId;
//! use glam::Vec2;
//!
//! let command = Command::SetHorizontalVelocity {
//!     target: EntityId::new(1),
//!     velocity: Vec2::new(0.0, 5.0),
//! };
//!
//! let envelope = OutputEnvelope::new(
//!     Output::Command(command),
//!     PluginInstanceId::new(EntityId::new(1), PluginId::new("locomotion")),
//!     TraceId::new(42),
//!     100, // tick
//!     0,   // sequence
//! );
//!
//! assert!(matches!(envelope.output(), Output::Command(_)));
//! ```

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::combat::TraceHit;
use crate::entity::{ContactPhase, DamageOutcome, EntityId};

// =============================================================================
// Plugin Identification Types
// =============================================================================

/// Unique identifier for a plugin type.
///
/// # Example
///
/// ```
/// use dreadwalk_core::output::PluginId;
///
/// const LOCOMOTION: PluginId = PluginId::from_static("locomotion");
/// assert_eq!(LOCOMOTION, PluginId::new("locomotion"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginId(Cow<'static, str>);

impl PluginId {
    /// Creates a new `PluginId` from a string.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(Cow::Owned(id.to_string()))
    }

    /// Creates a `PluginId` from a static string without allocating.
    #[must_use]
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Returns the plugin ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PluginId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PluginId {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

/// Identifies a specific plugin instance (entity + plugin type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginInstanceId {
    entity_id: EntityId,
    plugin_id: PluginId,
}

impl PluginInstanceId {
    /// Creates a new plugin instance ID.
    #[must_use]
    pub fn new(entity_id: EntityId, plugin_id: PluginId) -> Self {
        Self {
            entity_id,
            plugin_id,
        }
    }

    /// Returns the entity this plugin instance ran on.
    #[must_use]
    pub const fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Returns the plugin type.
    #[must_use]
    pub fn plugin_id(&self) -> &PluginId {
        &self.plugin_id
    }
}

impl fmt::Display for PluginInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.plugin_id, self.entity_id)
    }
}

/// Groups the outputs of one plugin run for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraceId(u64);

impl TraceId {
    /// Creates a new trace ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for TraceId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// Output Categories
// =============================================================================

/// Direct state change requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Marks the player's look mode as entered.
    EngageLook {
        /// Player entering look mode.
        target: EntityId,
    },
    /// Sets body yaw and camera pitch, both in degrees.
    SetLook {
        /// Player to rotate.
        target: EntityId,
        /// New body yaw.
        yaw: f32,
        /// New camera pitch, already clamped.
        pitch: f32,
    },
    /// Overwrites the input-driven planar velocity. Vertical velocity is untouched.
    SetHorizontalVelocity {
        /// Player to move.
        target: EntityId,
        /// Velocity on the (x, z) plane.
        velocity: Vec2,
    },
    /// Adds an instantaneous impulse.
    ApplyImpulse {
        /// Body receiving the impulse.
        target: EntityId,
        /// Impulse vector.
        impulse: Vec3,
        /// Clears the grounded flag (jump).
        grounds_off: bool,
    },
    /// Hands a new destination to the navigator.
    SetDestination {
        /// Pursuer being steered.
        target: EntityId,
        /// World-space destination.
        destination: Vec3,
    },
    /// Spends one loaded round.
    ConsumeRound {
        /// Player firing.
        target: EntityId,
    },
    /// Refills the magazine from spare rounds.
    Reload {
        /// Player reloading.
        target: EntityId,
    },
}

impl Command {
    /// Returns the entity the command acts on.
    #[must_use]
    pub const fn target(&self) -> EntityId {
        match self {
            Self::EngageLook { target }
            | Self::SetLook { target, .. }
            | Self::SetHorizontalVelocity { target, .. }
            | Self::ApplyImpulse { target, .. }
            | Self::SetDestination { target, .. }
            | Self::ConsumeRound { target }
            | Self::Reload { target } => *target,
        }
    }
}

/// Value modifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Modifier {
    /// Subtracts health from a damageable entity.
    ApplyDamage {
        /// Entity that caused the damage.
        source: EntityId,
        /// Entity taking the damage.
        target: EntityId,
        /// Health to subtract.
        amount: f32,
    },
}

impl Modifier {
    /// Returns the entity being modified.
    #[must_use]
    pub const fn target(&self) -> EntityId {
        match self {
            Self::ApplyDamage { target, .. } => *target,
        }
    }
}

/// Notifications reported to the host in the frame report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// The player entered look mode; presentation should lock and hide its cursor.
    LookModeEntered {
        /// The player.
        entity: EntityId,
    },
    /// A hit-scan was fired.
    ShotFired {
        /// Shooter.
        source: EntityId,
        /// Muzzle position.
        origin: Vec3,
        /// Unit shot direction.
        direction: Vec3,
        /// Nearest hit within range, if any.
        hit: Option<TraceHit>,
    },
    /// Fire was requested with an empty magazine.
    DryFire {
        /// Shooter.
        source: EntityId,
    },
    /// Damage was applied.
    DamageDealt {
        /// Entity that caused the damage.
        source: EntityId,
        /// Entity that took it.
        target: EntityId,
        /// Requested amount.
        amount: f32,
        /// What the damage did.
        outcome: DamageOutcome,
    },
    /// A damageable entity died this frame.
    Died {
        /// The dead entity.
        entity: EntityId,
    },
    /// The player's ground contact changed.
    GroundContact {
        /// The player.
        entity: EntityId,
        /// Landed or left the ground.
        phase: ContactPhase,
    },
}

impl Event {
    /// Returns the entity the event is primarily about.
    #[must_use]
    pub const fn primary_entity(&self) -> EntityId {
        match self {
            Self::LookModeEntered { entity }
            | Self::Died { entity }
            | Self::GroundContact { entity, .. } => *entity,
            Self::ShotFired { source, .. } | Self::DryFire { source } => *source,
            Self::DamageDealt { target, .. } => *target,
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// Category of an [`Output`], used to route outputs to resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// [`Command`] outputs.
    Command,
    /// [`Modifier`] outputs.
    Modifier,
    /// [`Event`] outputs.
    Event,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "Command"),
            Self::Modifier => write!(f, "Modifier"),
            Self::Event => write!(f, "Event"),
        }
    }
}

/// Any output a plugin can emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// A state change request.
    Command(Command),
    /// A value modification.
    Modifier(Modifier),
    /// A notification.
    Event(Event),
}

impl Output {
    /// Returns the category of this output.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        match self {
            Self::Command(_) => OutputKind::Command,
            Self::Modifier(_) => OutputKind::Modifier,
            Self::Event(_) => OutputKind::Event,
        }
    }

    /// Returns the command, if this is one.
    #[must_use]
    pub const fn as_command(&self) -> Option<&Command> {
        match self {
            Self::Command(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the modifier, if this is one.
    #[must_use]
    pub const fn as_modifier(&self) -> Option<&Modifier> {
        match self {
            Self::Modifier(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the event, if this is one.
    #[must_use]
    pub const fn as_event(&self) -> Option<&Event> {
        match self {
            Self::Event(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Command> for Output {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

impl From<Modifier> for Output {
    fn from(modifier: Modifier) -> Self {
        Self::Modifier(modifier)
    }
}

impl From<Event> for Output {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

// =============================================================================
// Output Envelope
// =============================================================================

/// An [`Output`] with the metadata needed to order and trace it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEnvelope {
    output: Output,
    source: PluginInstanceId,
    trace_id: TraceId,
    tick: u64,
    sequence: u32,
}

impl OutputEnvelope {
    /// Creates a new output envelope.
    ///
    /// # Arguments
    ///
    /// * `output` - The output to wrap
    /// * `source` - The plugin instance that emitted this output
    /// * `trace_id` - Trace ID of the plugin run
    /// * `tick` - Current simulation tick
    /// * `sequence` - Emission index within the plugin run
    #[must_use]
    pub fn new(
        output: Output,
        source: PluginInstanceId,
        trace_id: TraceId,
        tick: u64,
        sequence: u32,
    ) -> Self {
        Self {
            output,
            source,
            trace_id,
            tick,
            sequence,
        }
    }

    /// Returns a reference to the wrapped output.
    #[must_use]
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Consumes the envelope and returns the wrapped output.
    #[must_use]
    pub fn into_output(self) -> Output {
        self.output
    }

    /// Returns the source plugin instance.
    #[must_use]
    pub fn source(&self) -> &PluginInstanceId {
        &self.source
    }

    /// Returns the trace ID.
    #[must_use]
    pub const fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Returns the tick when this output was emitted.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns the sequence number within the plugin run.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Returns the kind of the wrapped output.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        self.output.kind()
    }
}

// =============================================================================
// Tests
// =============================================================================
