//! Entity module for the Entity-Plugin-Resolver architecture.
//!
//! This module provides the core entity types for the Dreadwalk actor simulation:
//! - [`EntityId`]: Unique identifier for entities
//! - [`EntityTag`]: Type classification for plugin bundle selection
//! - [`EntityInner`]: Type-safe storage for entity-specific components
//! - [`Entity`]: The complete entity container
//!
//! # Architecture
//!
//! - `EntityTag` determines which plugins run on an entity
//! - `EntityInner` provides type-safe component storage
//! - [`Classification`] is the set-based label used by trace and contact queries
//!
//! # Example
//!
//! ```
//! use dreadwalk_core::entity::{Classification, Entity, EntityId, EntityTag};
//!
//! let player = Entity::new_player(EntityId::new(1));
//!
//! assert_eq!(player.tag(), EntityTag::Player);
//! assert!(player.classification().contains(Classification::PLAYER));
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::combat::Damageable;

pub use components::{
    AmmoState, BodyState, Classification, Collider, ContactEvent, ContactPhase, DamageOutcome,
    HealthState, LookState, NavigationState, PlayerComponents, PursuerComponents,
    SceneryComponents, TransformState,
};

/// Unique identifier for an entity.
///
/// Entity IDs are assigned monotonically by the arena and never reused.
/// Ordering follows the numeric value, which fixes iteration order.
///
/// # Example
///
/// ```
/// use dreadwalk_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity type tag for plugin bundle selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// The input-driven player character.
    Player,
    /// An enemy chasing a target through the navigator.
    Pursuer,
    /// Static level geometry (floors, walls).
    Scenery,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Pursuer => write!(f, "Pursuer"),
            Self::Scenery => write!(f, "Scenery"),
        }
    }
}

/// Type-safe storage for entity-specific components.
///
/// The variant always matches the entity's [`EntityTag`]; the arena only
/// builds entities through constructors that keep the two in step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Player components (body, look, health, magazine, tuning)
    Player(PlayerComponents),
    /// Pursuer components (health, navigation)
    Pursuer(PursuerComponents),
    /// Scenery components (transform, collider)
    Scenery(SceneryComponents),
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this inner storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Player(_) => EntityTag::Player,
            Self::Pursuer(_) => EntityTag::Pursuer,
            Self::Scenery(_) => EntityTag::Scenery,
        }
    }

    /// Returns a reference to the player components, if this is a player.
    #[must_use]
    pub const fn as_player(&self) -> Option<&PlayerComponents> {
        match self {
            Self::Player(components) => Some(components),
            _ => None,
        }
    }

    /// Returns a mutable reference to the player components, if this is a player.
    #[must_use]
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerComponents> {
        match self {
            Self::Player(components) => Some(components),
            _ => None,
        }
    }

    /// Returns a reference to the pursuer components, if this is a pursuer.
    #[must_use]
    pub const fn as_pursuer(&self) -> Option<&PursuerComponents> {
        match self {
            Self::Pursuer(components) => Some(components),
            _ => None,
        }
    }

    /// Returns a mutable reference to the pursuer components, if this is a pursuer.
    #[must_use]
    pub fn as_pursuer_mut(&mut self) -> Option<&mut PursuerComponents> {
        match self {
            Self::Pursuer(components) => Some(components),
            _ => None,
        }
    }

    /// Returns a reference to the scenery components, if this is scenery.
    #[must_use]
    pub const fn as_scenery(&self) -> Option<&SceneryComponents> {
        match self {
            Self::Scenery(components) => Some(components),
            _ => None,
        }
    }

    /// Transform shared by every entity type.
    #[must_use]
    pub const fn transform(&self) -> &TransformState {
        match self {
            Self::Player(c) => &c.transform,
            Self::Pursuer(c) => &c.transform,
            Self::Scenery(c) => &c.transform,
        }
    }

    /// Collider shared by every entity type.
    #[must_use]
    pub const fn collider(&self) -> &Collider {
        match self {
            Self::Player(c) => &c.collider,
            Self::Pursuer(c) => &c.collider,
            Self::Scenery(c) => &c.collider,
        }
    }
}

/// A complete entity in the actor simulation.
///
/// An `Entity` combines:
/// - A unique [`EntityId`] for identification and ordering
/// - An [`EntityTag`] that determines which plugins operate on it
/// - A [`Classification`] set used by queries
/// - An [`EntityInner`] containing type-specific components
///
/// # Example
///
/// ```
/// use dreadwalk_core::entity::{Entity, EntityId};
///
/// let pursuer = Entity::new_pursuer(EntityId::new(2), EntityId::new(1));
///
/// assert!(pursuer.is_pursuer());
/// assert!(pursuer.as_damageable().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    tag: EntityTag,
    classification: Classification,
    inner: EntityInner,
}

impl Entity {
    /// Creates a new entity. The tag is derived from `inner`.
    #[must_use]
    pub const fn new(id: EntityId, classification: Classification, inner: EntityInner) -> Self {
        Self {
            id,
            tag: inner.tag(),
            classification,
            inner,
        }
    }

    /// Creates a player with default components, classified `PLAYER`.
    #[must_use]
    pub fn new_player(id: EntityId) -> Self {
        Self::new(
            id,
            Classification::PLAYER,
            EntityInner::Player(PlayerComponents::default()),
        )
    }

    /// Creates a pursuer chasing `target` with default tuning, classified `HOSTILE`.
    #[must_use]
    pub fn new_pursuer(id: EntityId, target: EntityId) -> Self {
        Self::new(
            id,
            Classification::HOSTILE,
            EntityInner::Pursuer(PursuerComponents::from_config(
                glam::Vec3::ZERO,
                target,
                &crate::config::PursuerConfig::default(),
            )),
        )
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's type tag.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.tag
    }

    /// Returns the entity's classification set.
    #[must_use]
    pub const fn classification(&self) -> Classification {
        self.classification
    }

    /// Returns a reference to the entity's inner component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the entity's inner component storage.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Returns `true` if this entity is the player.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(self.tag, EntityTag::Player)
    }

    /// Returns `true` if this entity is a pursuer.
    #[must_use]
    pub const fn is_pursuer(&self) -> bool {
        matches!(self.tag, EntityTag::Pursuer)
    }

    /// Returns `true` if this entity is scenery.
    #[must_use]
    pub const fn is_scenery(&self) -> bool {
        matches!(self.tag, EntityTag::Scenery)
    }

    /// Returns the health capability, if this entity has one.
    #[must_use]
    pub fn as_damageable(&self) -> Option<&dyn Damageable> {
        match &self.inner {
            EntityInner::Player(c) => Some(c),
            EntityInner::Pursuer(c) => Some(c),
            EntityInner::Scenery(_) => None,
        }
    }

    /// Returns the mutable health capability, if this entity has one.
    #[must_use]
    pub fn as_damageable_mut(&mut self) -> Option<&mut dyn Damageable> {
        match &mut self.inner {
            EntityInner::Player(c) => Some(c),
            EntityInner::Pursuer(c) => Some(c),
            EntityInner::Scenery(_) => None,
        }
    }

    /// Returns true for damageable entities that have died.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.as_damageable().is_some_and(|d| !d.health().is_alive())
    }
}
