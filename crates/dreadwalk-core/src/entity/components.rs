//! State components carried by entities.
//!
//! Each entity type owns a concrete component struct ([`PlayerComponents`],
//! [`PursuerComponents`], [`SceneryComponents`]) built from the smaller state
//! blocks defined here. Angles are stored in degrees, matching the units of
//! the look tuning values.
//!
//! # Axes
//!
//! World up is `+Y`. A yaw of 0 faces `+Z`; positive yaw turns clockwise when
//! seen from above, so a yaw of 90 faces `+X`. Positive pitch looks down.

use bitflags::bitflags;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::{AmmoConfig, PlayerConfig, PursuerConfig};
use crate::entity::EntityId;

// =============================================================================
// Classification
// =============================================================================

bitflags! {
    /// Classification flags used by trace and contact queries.
    ///
    /// Classification is a set, so a single entity may be both `SOLID` and
    /// `GROUND` (a floor slab that also blocks shots).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Classification: u32 {
        /// Valid target for the player's hit-scan.
        const HOSTILE = 0b0001;
        /// The player character.
        const PLAYER = 0b0010;
        /// Walkable surface that grounds the player on contact.
        const GROUND = 0b0100;
        /// Blocks traces but is not otherwise interesting.
        const SOLID = 0b1000;
    }
}

// =============================================================================
// Transform
// =============================================================================

/// World placement of an entity.
///
/// `position` is the feet position for actors and the pivot for scenery.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformState {
    /// World position.
    pub position: Vec3,
    /// Rotation about world up, in degrees. Unbounded.
    pub yaw: f32,
}

impl TransformState {
    /// Creates a transform at `position` facing `yaw` degrees.
    #[must_use]
    pub const fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Unit forward axis of the body on the horizontal plane.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        let (sin, cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(sin, 0.0, cos)
    }

    /// Unit right axis of the body on the horizontal plane.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        let (sin, cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(cos, 0.0, -sin)
    }

    /// Unit view direction for the given camera pitch (degrees, positive down).
    #[must_use]
    pub fn look_direction(&self, pitch: f32) -> Vec3 {
        let (sin_pitch, cos_pitch) = pitch.to_radians().sin_cos();
        self.forward() * cos_pitch - Vec3::Y * sin_pitch
    }
}

// =============================================================================
// Body (player physics)
// =============================================================================

/// Which way a contact changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactPhase {
    /// The body started touching the surface.
    Enter,
    /// The body stopped touching the surface.
    Exit,
}

/// A contact change reported by the physics layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactEvent {
    /// Enter or exit.
    pub phase: ContactPhase,
    /// Classification of the surface that was touched.
    pub surface: Classification,
}

impl ContactEvent {
    /// Contact with a walkable surface began.
    #[must_use]
    pub const fn ground_enter() -> Self {
        Self {
            phase: ContactPhase::Enter,
            surface: Classification::GROUND,
        }
    }

    /// Contact with a walkable surface ended.
    #[must_use]
    pub const fn ground_exit() -> Self {
        Self {
            phase: ContactPhase::Exit,
            surface: Classification::GROUND,
        }
    }
}

/// Rigid-body state of the player.
///
/// Horizontal velocity is driven by input and overwritten every frame;
/// vertical velocity belongs to gravity and impulses and is never touched by
/// movement input. Knockback is kept apart from input velocity so the next
/// movement command cannot erase it before it has been integrated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    /// Input-driven velocity on the (x, z) plane.
    pub horizontal_velocity: Vec2,
    /// Velocity along world up.
    pub vertical_velocity: f32,
    /// Impulse-driven velocity on the (x, z) plane, consumed by the next integration.
    pub knockback_velocity: Vec2,
    /// True while standing on a `GROUND` surface.
    pub grounded: bool,
    /// Mass used to turn impulses into velocity changes.
    pub mass: f32,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            horizontal_velocity: Vec2::ZERO,
            vertical_velocity: 0.0,
            knockback_velocity: Vec2::ZERO,
            grounded: false,
            mass: 1.0,
        }
    }
}

impl BodyState {
    /// Applies an instantaneous impulse.
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        let inverse_mass = self.mass.recip();
        self.vertical_velocity += impulse.y * inverse_mass;
        self.knockback_velocity += Vec2::new(impulse.x, impulse.z) * inverse_mass;
    }

    /// Updates the grounded flag from a contact change.
    ///
    /// Only `GROUND` surfaces affect the flag. Landing also stops the fall.
    pub fn on_contact(&mut self, contact: ContactEvent) {
        if !contact.surface.contains(Classification::GROUND) {
            return;
        }
        match contact.phase {
            ContactPhase::Enter => {
                self.grounded = true;
                self.vertical_velocity = self.vertical_velocity.max(0.0);
            }
            ContactPhase::Exit => self.grounded = false,
        }
    }

    /// Full velocity used for integration this frame.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        let planar = self.horizontal_velocity + self.knockback_velocity;
        Vec3::new(planar.x, self.vertical_velocity, planar.y)
    }
}

// =============================================================================
// Look
// =============================================================================

/// Camera state of the player.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LookState {
    /// Camera pitch in degrees, positive looks down. Always within the look limit.
    pub pitch: f32,
    /// Set once the look mode has been entered.
    pub engaged: bool,
}

// =============================================================================
// Health
// =============================================================================

/// Result of applying damage to a [`HealthState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// The actor took damage and is still alive.
    Wounded {
        /// Health left after the hit.
        remaining: f32,
    },
    /// This hit killed the actor. Reported exactly once per actor.
    Killed,
    /// The actor was already dead; nothing changed.
    AlreadyDead,
    /// The amount was negative or not finite; nothing changed.
    Ignored,
}

impl DamageOutcome {
    /// Returns true if health changed.
    #[must_use]
    pub const fn changed_health(&self) -> bool {
        matches!(self, Self::Wounded { .. } | Self::Killed)
    }
}

/// Current and maximum health of an actor.
///
/// Invariant: `0 <= current <= max`. Death is a one-way latch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthState {
    current: f32,
    max: f32,
    dead: bool,
}

impl HealthState {
    /// Creates full health with the given maximum.
    #[must_use]
    pub const fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    /// Current health.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum health, fixed at spawn.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Returns true until the actor has died.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Subtracts `amount` from current health.
    ///
    /// The result is clamped to `[0, max]`. Reaching zero or below kills the
    /// actor; any later call is a no-op returning [`DamageOutcome::AlreadyDead`].
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::AlreadyDead;
        }
        if !amount.is_finite() || amount < 0.0 {
            return DamageOutcome::Ignored;
        }

        let remaining = self.current - amount;
        self.current = remaining.clamp(0.0, self.max);
        if remaining <= 0.0 {
            self.dead = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded {
                remaining: self.current,
            }
        }
    }
}

// =============================================================================
// Ammunition
// =============================================================================

/// Magazine and spare rounds of a firearm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoState {
    /// Rounds in the magazine.
    pub loaded: u32,
    /// Magazine size.
    pub capacity: u32,
    /// Rounds carried outside the magazine.
    pub spare: u32,
}

impl AmmoState {
    /// Creates a magazine from configuration, without topping it up.
    #[must_use]
    pub fn from_config(config: &AmmoConfig) -> Self {
        Self {
            loaded: config.loaded.min(config.capacity),
            capacity: config.capacity,
            spare: config.spare,
        }
    }

    /// Moves spare rounds into the magazine until it is full or spares run out.
    ///
    /// Returns the number of rounds moved.
    pub fn reload(&mut self) -> u32 {
        let missing = self.capacity.saturating_sub(self.loaded);
        let moved = missing.min(self.spare);
        self.loaded += moved;
        self.spare -= moved;
        moved
    }

    /// Spends one loaded round. Returns false on an empty magazine.
    pub fn try_consume(&mut self) -> bool {
        if self.loaded == 0 {
            return false;
        }
        self.loaded -= 1;
        true
    }
}

// =============================================================================
// Navigation
// =============================================================================

/// Pursuit state of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Entity being chased. A lookup-only reference; validated at spawn.
    pub target: EntityId,
    /// Latest destination handed to the navigator.
    pub destination: Option<Vec3>,
    /// Travel speed along the path in metres per second.
    pub move_speed: f32,
}

impl NavigationState {
    /// Creates navigation state chasing `target`.
    #[must_use]
    pub const fn new(target: EntityId, move_speed: f32) -> Self {
        Self {
            target,
            destination: None,
            move_speed,
        }
    }
}

// =============================================================================
// Collider
// =============================================================================

/// Axis-aligned box collider relative to the entity transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Offset of the box center from the entity position.
    pub center_offset: Vec3,
    /// Half size along each axis.
    pub half_extents: Vec3,
}

impl Collider {
    /// Creates a box collider.
    #[must_use]
    pub const fn new(center_offset: Vec3, half_extents: Vec3) -> Self {
        Self {
            center_offset,
            half_extents,
        }
    }

    /// A 1 x 2 x 1 box standing on the entity position.
    #[must_use]
    pub const fn actor() -> Self {
        Self::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.5, 1.0, 0.5))
    }

    /// World-space `(min, max)` corners for an entity at `position`.
    #[must_use]
    pub fn bounds_at(&self, position: Vec3) -> (Vec3, Vec3) {
        let center = position + self.center_offset;
        (center - self.half_extents, center + self.half_extents)
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self::actor()
    }
}

// =============================================================================
// Entity component bundles
// =============================================================================

/// Components for the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerComponents {
    /// Body placement and yaw.
    pub transform: TransformState,
    /// Velocities and ground contact.
    pub body: BodyState,
    /// Camera pitch.
    pub look: LookState,
    /// Health.
    pub health: HealthState,
    /// Magazine, or `None` for unlimited fire.
    pub ammo: Option<AmmoState>,
    /// Trace and ground-contact volume.
    pub collider: Collider,
    /// Tuning values fixed at spawn.
    pub config: PlayerConfig,
}

impl PlayerComponents {
    /// Builds player components from configuration.
    ///
    /// The magazine is topped up from spare rounds, and the player starts
    /// grounded.
    #[must_use]
    pub fn from_config(position: Vec3, yaw: f32, config: PlayerConfig) -> Self {
        let ammo = config.ammo.as_ref().map(|ammo_config| {
            let mut ammo = AmmoState::from_config(ammo_config);
            ammo.reload();
            ammo
        });
        Self {
            transform: TransformState::new(position, yaw),
            body: BodyState {
                grounded: true,
                mass: config.mass,
                ..BodyState::default()
            },
            look: LookState::default(),
            health: HealthState::new(config.max_health),
            ammo,
            collider: Collider::actor(),
            config,
        }
    }

    /// World position of the camera.
    #[must_use]
    pub fn eye_position(&self) -> Vec3 {
        self.transform.position + Vec3::Y * self.config.eye_height
    }
}

impl Default for PlayerComponents {
    fn default() -> Self {
        Self::from_config(Vec3::ZERO, 0.0, PlayerConfig::default())
    }
}

/// Components for a pursuing enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PursuerComponents {
    /// Placement.
    pub transform: TransformState,
    /// Health.
    pub health: HealthState,
    /// Chase target and destination.
    pub navigation: NavigationState,
    /// Trace volume.
    pub collider: Collider,
}

impl PursuerComponents {
    /// Builds pursuer components chasing `target`.
    #[must_use]
    pub fn from_config(position: Vec3, target: EntityId, config: &PursuerConfig) -> Self {
        Self {
            transform: TransformState::new(position, 0.0),
            health: HealthState::new(config.max_health),
            navigation: NavigationState::new(target, config.move_speed),
            collider: Collider::actor(),
        }
    }
}

/// Components for static level geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneryComponents {
    /// Placement.
    pub transform: TransformState,
    /// Shape.
    pub collider: Collider,
}

impl SceneryComponents {
    /// A box centered on `center` with the given half extents.
    #[must_use]
    pub const fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            transform: TransformState::new(center, 0.0),
            collider: Collider::new(Vec3::ZERO, half_extents),
        }
    }
}
