//! Arena module for the actor simulation.
//!
//! The Arena is the container for all entities in a simulation. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - A bounds index of world-space collider boxes for trace and contact queries
//! - Entity lifecycle management (spawn/despawn)
//! - Tick tracking
//!
//! # Bounds Index Synchronization
//!
//! The bounds index is NOT automatically synchronized when entity positions
//! change. When modifying a position via `get_mut()`, call
//! `update_bounds(id)` afterward. Spawning and despawning keep the index in
//! sync on their own.
//!
//! ```
//! # use dreadwalk_core::arena::Arena;
//! # use dreadwalk_core::entity::{Classification, EntityInner, PlayerComponents};
//! # use glam::Vec3;
//! # let mut arena = Arena::new();
//! # let id = arena.spawn(Classification::PLAYER, EntityInner::Player(PlayerComponents::default()));
//! if let Some(player) = arena.get_mut(id).and_then(|e| e.inner_mut().as_player_mut()) {
//!     player.transform.position = Vec3::new(5.0, 0.0, 5.0);
//! }
//! // REQUIRED: sync the bounds index after a position change
//! arena.update_bounds(id);
//! ```
//!
//! # Example
//!
//! ```
//! use dreadwalk_core::arena::Arena;
//! use dreadwalk_core::entity::{Classification, EntityInner, SceneryComponents};
//! use glam::Vec3;
//!
//! let mut arena = Arena::new();
//! let floor = arena.spawn(
//!     Classification::GROUND,
//!     EntityInner::Scenery(SceneryComponents::cuboid(Vec3::new(0.0, -0.5, 0.0), Vec3::new(10.0, 0.5, 10.0))),
//! );
//!
//! let below = arena.bounds().query_box(Vec3::new(-1.0, -0.1, -1.0), Vec3::new(1.0, 0.0, 1.0));
//! assert_eq!(below, vec![floor]);
//! ```

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{Classification, Entity, EntityId, EntityInner};

// =============================================================================
// Bounds Index
// =============================================================================

/// World-space box of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Bounds {
    /// Returns true if the two boxes overlap, touching faces included.
    #[must_use]
    pub fn overlaps(&self, min: Vec3, max: Vec3) -> bool {
        self.min.cmple(max).all() && min.cmple(self.max).all()
    }

    /// Returns true if `point` lies inside the box or on its surface.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }
}

/// World-space collider boxes keyed by entity.
///
/// A linear index: queries scan every box. Stored in a `BTreeMap` so scans
/// visit entities in id order and tie-breaking is reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundsIndex {
    boxes: BTreeMap<EntityId, Bounds>,
}

impl BoundsIndex {
    /// Creates a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entity's box.
    pub fn insert(&mut self, id: EntityId, bounds: Bounds) {
        self.boxes.insert(id, bounds);
    }

    /// Removes an entity's box.
    pub fn remove(&mut self, id: EntityId) {
        self.boxes.remove(&id);
    }

    /// Returns the box of an entity, if known.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Bounds> {
        self.boxes.get(&id).copied()
    }

    /// Entities whose box overlaps `[min, max]`, sorted by id.
    #[must_use]
    pub fn query_box(&self, min: Vec3, max: Vec3) -> Vec<EntityId> {
        self.boxes
            .iter()
            .filter(|(_, bounds)| bounds.overlaps(min, max))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Iterates every box in id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, Bounds)> + '_ {
        self.boxes.iter().map(|(id, bounds)| (*id, *bounds))
    }

    /// Returns the number of boxes in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns true if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Container of every entity in a simulation.
///
/// # Determinism
///
/// Entity IDs are assigned monotonically and stored in a `BTreeMap`, so
/// iterating over entities always produces the same sequence.
///
/// # Example
///
/// ```
/// use dreadwalk_core::arena::Arena;
/// use dreadwalk_core::entity::{Classification, EntityInner, PlayerComponents, PursuerComponents};
/// use dreadwalk_core::config::PursuerConfig;
/// use glam::Vec3;
///
/// let mut arena = Arena::new();
/// let player = arena.spawn(Classification::PLAYER, EntityInner::Player(PlayerComponents::default()));
/// let pursuer = arena.spawn(
///     Classification::HOSTILE,
///     EntityInner::Pursuer(PursuerComponents::from_config(Vec3::Z * 10.0, player, &PursuerConfig::default())),
/// );
///
/// let ids: Vec<_> = arena.entity_ids_sorted().collect();
/// assert_eq!(ids, vec![player, pursuer]);
/// assert!(arena.get(pursuer).unwrap().is_pursuer());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing entity ID counter.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
    /// Collider boxes for queries.
    bounds: BoundsIndex,
    /// Current simulation tick.
    tick: u64,
}

impl Arena {
    /// Creates a new empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entities: BTreeMap::new(),
            bounds: BoundsIndex::new(),
            tick: 0,
        }
    }

    /// Spawns a new entity and indexes its collider.
    ///
    /// # Returns
    ///
    /// The unique ID assigned to the new entity. IDs are never reused.
    pub fn spawn(&mut self, classification: Classification, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let entity = Entity::new(id, classification, inner);
        self.bounds.insert(id, Self::entity_bounds(&entity));
        self.entities.insert(id, entity);
        id
    }

    /// Removes an entity from the arena and the bounds index.
    ///
    /// # Returns
    ///
    /// The removed entity, if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.bounds.remove(id);
        self.entities.remove(&id)
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns true if an entity with this ID exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Returns an iterator over entity IDs in deterministic (sorted) order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Returns an iterator over entities in deterministic (sorted by ID) order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns an iterator over mutable entities in deterministic order.
    pub fn entities_sorted_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.values_mut()
    }

    /// Returns the number of entities in the arena.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns a reference to the bounds index.
    #[must_use]
    pub fn bounds(&self) -> &BoundsIndex {
        &self.bounds
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the simulation tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Re-indexes an entity's collider after its position changed.
    pub fn update_bounds(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get(&id) {
            self.bounds.insert(id, Self::entity_bounds(entity));
        }
    }

    fn entity_bounds(entity: &Entity) -> Bounds {
        let inner = entity.inner();
        let (min, max) = inner.collider().bounds_at(inner.transform().position);
        Bounds { min, max }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
