//! Simulation module with the 4-phase frame loop.
//!
//! The `Simulation` struct orchestrates the Entity-Plugin-Resolver architecture
//! through a deterministic frame loop:
//!
//! 1. **SNAPSHOT**: Freeze current state (implicit - `current` is immutable during plugins)
//! 2. **PLUGIN**: Execute all plugins in parallel, collecting outputs
//! 3. **RESOLUTION**: Clone current to next, run resolvers with outputs
//! 4. **APPLY**: Swap buffers, remove dead pursuers, advance tick
//!
//! # Determinism
//!
//! The simulation guarantees deterministic execution:
//! - Plugins are executed in parallel but their outputs are sorted deterministically
//! - Entities are iterated in ID order (via `BTreeMap`)
//! - Trace IDs are generated deterministically from the configured seed
//!
//! # Example
//!
//! ```
//! use dreadwalk_core::config::{PlayerConfig, PursuerConfig, SimulationConfig};
//! use dreadwalk_core::plugin::FrameContext;
//! use dreadwalk_core::simulation::Simulation;
//! use glam::Vec3;
//!
//! let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
//! let player = sim.spawn_player(Vec3::ZERO, 0.0, PlayerConfig::default()).unwrap();
//! sim.spawn_pursuer(Vec3::new(0.0, 0.0, 20.0), player, PursuerConfig::default())
//!     .unwrap();
//!
//! for _ in 0..10 {
//!     sim.step(&FrameContext::idle(1.0 / 60.0)).unwrap();
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! ```

use rayon::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, info, trace};

use crate::arena::Arena;
use crate::combat::{damage_entity, perform_trace, TraceHit};
use crate::config::{
    finite, finite_vec, PlayerConfig, PursuerConfig, SceneConfig, SimulationConfig,
};
use crate::entity::{
    Classification, ContactEvent, DamageOutcome, EntityId, EntityInner, PlayerComponents,
    PursuerComponents, SceneryComponents,
};
use crate::error::{SimError, SimResult};
use crate::output::{Event, OutputEnvelope, PluginInstanceId, TraceId};
use crate::plugin::{FrameContext, PluginContext, PluginRegistry};
use crate::resolver::{
    CombatResolver, DirectNavigator, EventResolver, NavigationResolver, Navigator,
    PhysicsResolver, Resolver,
};
use crate::world_view::WorldView;

// =============================================================================
// Frame Report
// =============================================================================

/// What happened during one [`Simulation::step`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// The tick that was simulated.
    pub tick: u64,
    /// Events raised this frame: plugin events first, then events raised by
    /// physics and combat resolution.
    pub events: Vec<Event>,
    /// Dead pursuers removed at the end of the frame, in id order.
    pub removed: Vec<EntityId>,
}

impl FrameReport {
    /// Returns true if nothing notable happened.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.events.is_empty() && self.removed.is_empty()
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// The main simulation orchestrator implementing the 4-phase frame loop.
///
/// `Simulation` manages:
/// - Current and next arena state (double-buffered)
/// - Plugin registry for entity-to-plugin mapping
/// - Resolvers for output processing
/// - World settings, including the seed for trace ID generation
///
/// # Double Buffering
///
/// The simulation uses two arenas:
/// - `current`: Read-only snapshot for plugin execution
/// - `next`: Mutable state that resolvers write to
///
/// After each frame, the buffers are swapped to avoid copying.
///
/// # Death Removal
///
/// A pursuer killed during a frame stays in the arena, marked dead, until
/// the APPLY phase of that frame, and is listed in [`FrameReport::removed`].
/// A pursuer killed between frames through [`Simulation::apply_damage`] or
/// [`Simulation::fire_trace`] is removed at the end of the next frame.
/// Players are never removed.
pub struct Simulation {
    /// Current arena state (read-only during plugin phase).
    current: Arena,
    /// Next arena state (written to by resolvers).
    next: Arena,
    /// Registry of plugins organized by entity tag.
    plugins: PluginRegistry,
    /// Resolvers that process plugin outputs, run in order.
    resolvers: Vec<Box<dyn Resolver>>,
    /// World settings.
    config: SimulationConfig,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("current", &self.current)
            .field("next", &self.next)
            .field("plugins", &self.plugins)
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("config", &self.config)
            .finish()
    }
}

impl Simulation {
    /// Creates a simulation with the default plugins and resolvers.
    ///
    /// Pursuers move with the [`DirectNavigator`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the settings are invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use dreadwalk_core::config::SimulationConfig;
    /// use dreadwalk_core::simulation::Simulation;
    ///
    /// let sim = Simulation::new(SimulationConfig::default()).unwrap();
    /// assert_eq!(sim.tick(), 0);
    /// assert_eq!(sim.resolver_count(), 4);
    /// ```
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        Self::with_navigator(config, Arc::new(DirectNavigator))
    }

    /// Creates a simulation whose pursuers move with `navigator`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the settings are invalid.
    pub fn with_navigator(config: SimulationConfig, navigator: Arc<dyn Navigator>) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::build(config, navigator))
    }

    fn build(config: SimulationConfig, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            current: Arena::default(),
            next: Arena::default(),
            plugins: PluginRegistry::default_bundles(),
            resolvers: vec![
                Box::new(EventResolver::new()),
                Box::new(
                    PhysicsResolver::new(config.gravity)
                        .with_ground_detection(config.ground_detection),
                ),
                Box::new(NavigationResolver::new(navigator)),
                Box::new(CombatResolver::new()),
            ],
            config,
        }
    }

    /// Builds a simulation from a scene description.
    ///
    /// Scenery is spawned first, then the player, then pursuers bound to the
    /// player.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if any part of the scene is invalid.
    pub fn from_scene(scene: &SceneConfig) -> SimResult<Self> {
        scene.validate()?;
        let mut sim = Self::new(scene.simulation)?;
        for block in &scene.scenery {
            sim.spawn_scenery(block.center, block.half_extents, block.classification)?;
        }
        let player = sim.spawn_player(
            scene.player.position,
            scene.player.yaw,
            scene.player.config.clone(),
        )?;
        for pursuer in &scene.pursuers {
            sim.spawn_pursuer(pursuer.position, player, pursuer.config)?;
        }
        info!(
            entities = sim.current.entity_count(),
            pursuers = scene.pursuers.len(),
            "scene loaded"
        );
        Ok(sim)
    }

    // -------------------------------------------------------------------------
    // Spawning
    // -------------------------------------------------------------------------

    /// Spawns the player at `position` facing `yaw` degrees.
    ///
    /// The magazine, if configured, is topped up from spare rounds and the
    /// player starts grounded.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the placement is not finite or the
    /// tuning is invalid.
    pub fn spawn_player(
        &mut self,
        position: Vec3,
        yaw: f32,
        config: PlayerConfig,
    ) -> SimResult<EntityId> {
        finite_vec("player.position", position)?;
        finite("player.yaw", yaw)?;
        config.validate()?;
        let id = self.current.spawn(
            Classification::PLAYER,
            EntityInner::Player(PlayerComponents::from_config(position, yaw, config)),
        );
        debug!(%id, ?position, yaw, "spawned player");
        Ok(id)
    }

    /// Spawns a pursuer bound to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the position is not finite or the
    /// tuning is invalid, or [`SimError::InvalidTarget`] if `target` is not
    /// a player.
    pub fn spawn_pursuer(
        &mut self,
        position: Vec3,
        target: EntityId,
        config: PursuerConfig,
    ) -> SimResult<EntityId> {
        finite_vec("pursuer.position", position)?;
        config.validate()?;
        match self.current.get(target) {
            Some(entity) if entity.is_player() => {}
            other => {
                return Err(SimError::InvalidTarget {
                    target,
                    found: other.map(|e| e.tag()),
                })
            }
        }
        let id = self.current.spawn(
            Classification::HOSTILE,
            EntityInner::Pursuer(PursuerComponents::from_config(position, target, &config)),
        );
        debug!(%id, %target, ?position, "spawned pursuer");
        Ok(id)
    }

    /// Spawns a static box such as a floor or wall.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the box is not finite.
    pub fn spawn_scenery(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        classification: Classification,
    ) -> SimResult<EntityId> {
        finite_vec("scenery.center", center)?;
        finite_vec("scenery.half_extents", half_extents)?;
        let id = self.current.spawn(
            classification,
            EntityInner::Scenery(SceneryComponents::cuboid(center, half_extents.abs())),
        );
        trace!(%id, ?center, ?half_extents, ?classification, "spawned scenery");
        Ok(id)
    }

    // -------------------------------------------------------------------------
    // Host operations between frames
    // -------------------------------------------------------------------------

    /// Reports a contact change detected by the host's own physics.
    ///
    /// Contacts on entities without a body are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownEntity`] if `entity` does not exist.
    pub fn report_contact(&mut self, entity: EntityId, contact: ContactEvent) -> SimResult<()> {
        let found = self
            .current
            .get_mut(entity)
            .ok_or(SimError::UnknownEntity(entity))?;
        if let Some(player) = found.inner_mut().as_player_mut() {
            player.body.on_contact(contact);
            debug!(%entity, ?contact, "contact reported");
        }
        Ok(())
    }

    /// Applies damage immediately.
    ///
    /// A pursuer killed this way is removed at once.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownEntity`] if `target` does not exist, or
    /// [`SimError::NotDamageable`] if it has no health.
    pub fn apply_damage(&mut self, target: EntityId, amount: f32) -> SimResult<DamageOutcome> {
        let entity = self
            .current
            .get(target)
            .ok_or(SimError::UnknownEntity(target))?;
        if entity.as_damageable().is_none() {
            return Err(SimError::NotDamageable(target));
        }
        let outcome = damage_entity(&mut self.current, target, amount)
            .ok_or(SimError::NotDamageable(target))?;
        if outcome == DamageOutcome::Killed {
            self.remove_if_dead_pursuer(target);
        }
        Ok(outcome)
    }

    /// Casts a hit-scan trace and damages the hit entity if it is a hostile
    /// with health.
    ///
    /// Returns the nearest hit within `max_range`, damaged or not. A pursuer
    /// killed by the trace is removed at once.
    pub fn fire_trace(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        max_range: f32,
        damage: f32,
    ) -> Option<TraceHit> {
        let hit = perform_trace(&self.current, origin, direction, max_range, None)?;
        if hit.is_damage_target() {
            let outcome = damage_entity(&mut self.current, hit.entity, damage);
            debug!(target = %hit.entity, distance = hit.distance, ?outcome, "trace hit");
            if outcome == Some(DamageOutcome::Killed) {
                self.remove_if_dead_pursuer(hit.entity);
            }
        }
        Some(hit)
    }

    /// Removes a pursuer killed outside a frame. No frame holds outputs that
    /// could refer to it.
    fn remove_if_dead_pursuer(&mut self, id: EntityId) {
        if self
            .current
            .get(id)
            .is_some_and(|e| e.is_pursuer() && e.is_dead())
        {
            self.current.despawn(id);
            debug!(%id, "removed dead pursuer");
        }
    }

    // -------------------------------------------------------------------------
    // Frame loop
    // -------------------------------------------------------------------------

    /// Executes one frame using the 4-phase loop.
    ///
    /// # Execution Phases
    ///
    /// 1. **SNAPSHOT**: The current arena is treated as immutable during this frame.
    ///    Plugins read from a frozen snapshot of the world state.
    ///
    /// 2. **PLUGIN**: All plugins for all entities are executed in parallel.
    ///    Each plugin reads from a `WorldView` scoped to its declared components
    ///    and emits `Output`s wrapped in `OutputEnvelope`s.
    ///
    /// 3. **RESOLUTION**: The next arena is cloned from current. Each resolver
    ///    processes its relevant outputs and mutates the next arena.
    ///
    /// 4. **APPLY**: The current and next arenas are swapped (O(1) pointer swap),
    ///    dead pursuers are removed, and the tick counter is advanced.
    ///
    /// # Errors
    ///
    /// Fails before any state changes with [`SimError::InvalidFrameTime`] if
    /// `frame.dt` is negative or not finite, or [`SimError::TargetMissing`]
    /// if a pursuer's target has been removed.
    pub fn step(&mut self, frame: &FrameContext) -> SimResult<FrameReport> {
        if !frame.dt.is_finite() || frame.dt < 0.0 {
            return Err(SimError::InvalidFrameTime(frame.dt));
        }
        self.check_targets()?;

        let tick = self.current.current_tick();
        let _span = debug_span!("step", tick).entered();

        // PHASE 1: SNAPSHOT (implicit - current is immutable during plugin phase)

        // PHASE 2: PLUGIN - execute all plugins in parallel
        let outputs = self.execute_plugins_parallel(tick, frame);
        trace!(outputs = outputs.len(), "plugin phase complete");

        // PHASE 3: RESOLUTION - clone current to next, run resolvers
        self.next.clone_from(&self.current);
        let mut events = Vec::new();
        for resolver in &self.resolvers {
            let relevant: Vec<_> = outputs
                .iter()
                .filter(|o| resolver.handles().contains(&o.output().kind()))
                .collect();
            events.extend(resolver.resolve(frame, &relevant, &self.current, &mut self.next));
        }

        // PHASE 4: APPLY - swap buffers, remove the dead, advance tick
        std::mem::swap(&mut self.current, &mut self.next);
        let removed = self.remove_dead_pursuers();
        self.current.advance_tick();

        if !removed.is_empty() {
            debug!(?removed, "removed dead pursuers");
        }
        Ok(FrameReport {
            tick,
            events,
            removed,
        })
    }

    /// Fails if any pursuer is bound to an entity that is gone.
    fn check_targets(&self) -> SimResult<()> {
        for entity in self.current.entities_sorted() {
            let Some(pursuer) = entity.inner().as_pursuer() else {
                continue;
            };
            let target = pursuer.navigation.target;
            if !self.current.get(target).is_some_and(|t| t.is_player()) {
                return Err(SimError::TargetMissing {
                    pursuer: entity.id(),
                    target,
                });
            }
        }
        Ok(())
    }

    fn remove_dead_pursuers(&mut self) -> Vec<EntityId> {
        let dead: Vec<EntityId> = self
            .current
            .entities_sorted()
            .filter(|e| e.is_pursuer() && e.is_dead())
            .map(|e| e.id())
            .collect();
        for id in &dead {
            self.current.despawn(*id);
        }
        dead
    }

    /// Executes all plugins in parallel and collects their outputs.
    ///
    /// This method:
    /// 1. Collects all (`entity_id`, `plugin_index`, plugin) tuples
    /// 2. Executes plugins in parallel using rayon
    /// 3. Wraps outputs in envelopes with trace metadata
    /// 4. Sorts outputs for deterministic resolution order
    ///
    /// # Returns
    ///
    /// A vector of `OutputEnvelope`s sorted by (`entity_id`, `plugin_id`, sequence).
    fn execute_plugins_parallel(&self, tick: u64, frame: &FrameContext) -> Vec<OutputEnvelope> {
        // Collect (entity_id, plugin_idx, plugin) tuples
        let plugin_instances: Vec<_> = self
            .current
            .entities_sorted()
            .flat_map(|entity| {
                self.plugins
                    .plugins_for(entity.tag())
                    .iter()
                    .enumerate()
                    .map(move |(idx, plugin)| (entity.id(), idx, Arc::clone(plugin)))
            })
            .collect();

        // Execute in parallel with rayon
        let mut all_outputs: Vec<OutputEnvelope> = plugin_instances
            .par_iter()
            .flat_map(|(entity_id, plugin_idx, plugin)| {
                let decl = plugin.declaration();
                let view = WorldView::for_plugin(&self.current, decl, tick);
                let trace_id =
                    self.generate_trace_id(tick, entity_id.as_u64(), *plugin_idx as u64);

                let ctx = PluginContext {
                    entity_id: *entity_id,
                    tick,
                    trace_id,
                    dt: frame.dt,
                    input: frame.input,
                };

                let outputs = plugin.run(&ctx, &view);

                // A plugin emits a handful of outputs per frame; u32 never truncates.
                #[allow(clippy::cast_possible_truncation)]
                outputs
                    .into_iter()
                    .enumerate()
                    .map(|(seq, output)| {
                        OutputEnvelope::new(
                            output,
                            PluginInstanceId::new(*entity_id, decl.id.clone()),
                            trace_id,
                            tick,
                            seq as u32,
                        )
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        // CRITICAL: Sort for determinism
        all_outputs.sort_by(|a, b| {
            a.source()
                .entity_id()
                .cmp(&b.source().entity_id())
                .then_with(|| a.source().plugin_id().as_str().cmp(b.source().plugin_id().as_str()))
                .then_with(|| a.sequence().cmp(&b.sequence()))
        });

        all_outputs
    }

    /// Generates a deterministic trace ID from (seed, tick, entity, plugin).
    fn generate_trace_id(&self, tick: u64, entity: u64, plugin: u64) -> TraceId {
        let mut hasher = DefaultHasher::new();
        self.config.trace_seed.hash(&mut hasher);
        tick.hash(&mut hasher);
        entity.hash(&mut hasher);
        plugin.hash(&mut hasher);
        TraceId::new(hasher.finish())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Returns a read-only reference to the current arena state.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.current
    }

    /// Returns a mutable reference to the current arena.
    ///
    /// Use this for host-side edits between frames. Removing a player that
    /// pursuers are bound to makes the next `step` fail.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.current
    }

    /// Returns the lowest-id player, if any.
    #[must_use]
    pub fn player(&self) -> Option<EntityId> {
        self.current
            .entities_sorted()
            .find(|e| e.is_player())
            .map(|e| e.id())
    }

    /// Returns the current simulation tick.
    ///
    /// The tick counter starts at 0 and increments by 1 after each `step()`.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.current.current_tick()
    }

    /// Returns the world settings.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns a mutable reference to the plugin registry.
    ///
    /// The registry starts with the default locomotion and pursuit bundles.
    #[must_use]
    pub fn plugins_mut(&mut self) -> &mut PluginRegistry {
        &mut self.plugins
    }

    /// Adds a custom resolver after the built-in ones.
    pub fn add_resolver(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    /// Returns the number of resolvers in the simulation.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::build(SimulationConfig::default(), Arc::new(DirectNavigator))
    }
}

// =============================================================================
// Tests
// =============================================================================
