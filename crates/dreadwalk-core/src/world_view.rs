//! `WorldView` provides scoped, read-only access to arena state for plugins.
//!
//! The [`WorldView`] is the only way plugins read game state. It enforces
//! component-level access control based on what the plugin declared in its
//! [`PluginDeclaration`](crate::plugin::PluginDeclaration).
//!
//! # Access Control
//!
//! - In debug builds, accessing an undeclared component panics
//! - In release builds, it returns `None`
//!
//! # Immutability
//!
//! `WorldView` borrows the frozen snapshot immutably, so plugins cannot
//! mutate state and may run in parallel.
//!
//! # Example
//!
//! ```
//! use dreadwalk_core::arena::Arena;
//! use dreadwalk_core::entity::{Classification, EntityInner, EntityTag, PlayerComponents};
//! use dreadwalk_core::plugin::{PluginDeclaration, PluginId, ComponentKind};
//! use dreadwalk_core::output::OutputKind;
//! use dreadwalk_core::world_view::WorldView;
//!
//! let mut arena = Arena::new();
//! let player = arena.spawn(Classification::PLAYER, EntityInner::Player(PlayerComponents::default()));
//!
//! let decl = PluginDeclaration {
//!     id: PluginId::new("test"),
//!     required_tags: vec![EntityTag::Player],
//!     reads: vec![ComponentKind::Transform],
//!     emits: vec![OutputKind::Command],
//! };
//!
//! let view = WorldView::for_plugin(&arena, &decl, arena.current_tick());
//! assert!(view.get_transform(player).is_some());
//! ```

use glam::Vec3;

use crate::arena::Arena;
use crate::combat::{perform_trace, TraceHit};
use crate::config::PlayerConfig;
use crate::entity::components::{
    AmmoState, BodyState, HealthState, LookState, NavigationState, TransformState,
};
use crate::entity::{Entity, EntityId, EntityInner, EntityTag};
use crate::plugin::{ComponentKind, PluginDeclaration};

// =============================================================================
// WorldView
// =============================================================================

/// Scoped, read-only view of the arena for plugin access.
///
/// Each `get_*` method checks the plugin's declared reads before returning
/// the component. Entity metadata and trace queries are always allowed.
#[derive(Debug)]
pub struct WorldView<'a> {
    arena: &'a Arena,
    tick: u64,
    allowed_components: &'a [ComponentKind],
}

impl<'a> WorldView<'a> {
    /// Creates a `WorldView` scoped to a plugin's declared component access.
    #[must_use]
    pub fn for_plugin(arena: &'a Arena, decl: &'a PluginDeclaration, tick: u64) -> Self {
        Self {
            arena,
            tick,
            allowed_components: &decl.reads,
        }
    }

    /// Creates a `WorldView` with full access to all components.
    ///
    /// Intended for tests and host-side tooling.
    #[must_use]
    pub fn full_access(arena: &'a Arena, tick: u64) -> Self {
        static ALL_COMPONENTS: &[ComponentKind] = &[
            ComponentKind::Transform,
            ComponentKind::Body,
            ComponentKind::Look,
            ComponentKind::Health,
            ComponentKind::Ammo,
            ComponentKind::Navigation,
            ComponentKind::Tuning,
        ];

        Self {
            arena,
            tick,
            allowed_components: ALL_COMPONENTS,
        }
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns a reference to an entity by ID. Always allowed.
    #[must_use]
    pub fn get_entity(&self, id: EntityId) -> Option<&'a Entity> {
        self.arena.get(id)
    }

    /// Transform of any entity. Requires `ComponentKind::Transform`.
    #[must_use]
    pub fn get_transform(&self, id: EntityId) -> Option<&'a TransformState> {
        self.check_access(ComponentKind::Transform)?;
        Some(self.arena.get(id)?.inner().transform())
    }

    /// Body state of a player. Requires `ComponentKind::Body`.
    #[must_use]
    pub fn get_body(&self, id: EntityId) -> Option<&'a BodyState> {
        self.check_access(ComponentKind::Body)?;
        Some(&self.player(id)?.body)
    }

    /// Look state of a player. Requires `ComponentKind::Look`.
    #[must_use]
    pub fn get_look(&self, id: EntityId) -> Option<&'a LookState> {
        self.check_access(ComponentKind::Look)?;
        Some(&self.player(id)?.look)
    }

    /// Health of a player or pursuer. Requires `ComponentKind::Health`.
    #[must_use]
    pub fn get_health(&self, id: EntityId) -> Option<&'a HealthState> {
        self.check_access(ComponentKind::Health)?;
        match self.arena.get(id)?.inner() {
            EntityInner::Player(c) => Some(&c.health),
            EntityInner::Pursuer(c) => Some(&c.health),
            EntityInner::Scenery(_) => None,
        }
    }

    /// Magazine of a player, if one is configured. Requires `ComponentKind::Ammo`.
    #[must_use]
    pub fn get_ammo(&self, id: EntityId) -> Option<&'a AmmoState> {
        self.check_access(ComponentKind::Ammo)?;
        self.player(id)?.ammo.as_ref()
    }

    /// Navigation state of a pursuer. Requires `ComponentKind::Navigation`.
    #[must_use]
    pub fn get_navigation(&self, id: EntityId) -> Option<&'a NavigationState> {
        self.check_access(ComponentKind::Navigation)?;
        Some(&self.arena.get(id)?.inner().as_pursuer()?.navigation)
    }

    /// Tuning of a player. Requires `ComponentKind::Tuning`.
    #[must_use]
    pub fn get_player_config(&self, id: EntityId) -> Option<&'a PlayerConfig> {
        self.check_access(ComponentKind::Tuning)?;
        Some(&self.player(id)?.config)
    }

    /// Casts a hit-scan ray against the snapshot. Always allowed.
    #[must_use]
    pub fn trace(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_range: f32,
        ignore: Option<EntityId>,
    ) -> Option<TraceHit> {
        perform_trace(self.arena, origin, direction, max_range, ignore)
    }

    /// Entities with the given tag, in id order.
    pub fn query_by_tag(&self, tag: EntityTag) -> impl Iterator<Item = EntityId> + 'a {
        self.arena
            .entities_sorted()
            .filter(move |e| e.tag() == tag)
            .map(Entity::id)
    }

    fn player(&self, id: EntityId) -> Option<&'a crate::entity::PlayerComponents> {
        self.arena.get(id)?.inner().as_player()
    }

    /// `Some(())` if access is allowed. Panics in debug builds otherwise.
    #[allow(clippy::unnecessary_wraps)]
    fn check_access(&self, kind: ComponentKind) -> Option<()> {
        if self.allowed_components.contains(&kind) {
            Some(())
        } else {
            #[cfg(debug_assertions)]
            panic!(
                "WorldView access denied: plugin tried to access {:?} but only declared: {:?}",
                kind, self.allowed_components
            );

            #[cfg(not(debug_assertions))]
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
