//! Plugin system for the Entity-Plugin-Resolver architecture.
//!
//! Plugins read from an immutable [`WorldView`] and emit [`Output`]s that
//! are collected and applied by the resolution phase.
//!
//! # Architecture
//!
//! Plugins follow a strict read-only paradigm:
//! - Plugins receive a [`WorldView`] scoped to only the components they declared
//! - Plugins emit [`Output`]s as proposals for state changes
//! - Plugins cannot directly mutate state
//! - Plugins can run in parallel (since they only read)
//!
//! # Plugin Registry
//!
//! The [`PluginRegistry`] bundles plugins by entity tag, allowing efficient
//! lookup of which plugins should run on each entity type.
//!
//! # Example
//!
//! ```
//! use dreadwalk_core::plugin::{
//!     Plugin, PluginContext, PluginDeclaration, PluginId, PluginRegistry,
//!     ComponentKind,
//! };
//! use dreadwalk_core::world_view::WorldView;
//! use dreadwalk_core::output::{Output, OutputKind};
//! use dreadwalk_core::entity::EntityTag;
//! use std::sync::Arc;
//!
//! struct IdlePlugin {
//!     declaration: PluginDeclaration,
//! }
//!
//! impl Plugin for IdlePlugin {
//!     fn declaration(&self) -> &PluginDeclaration {
//!         &self.declaration
//!     }
//!
//!     fn run(&self, _ctx: &PluginContext, _view: &WorldView) -> Vec<Output> {
//!         vec![]
//!     }
//! }
//!
//! let mut registry = PluginRegistry::new();
//! registry.register(
//!     EntityTag::Pursuer,
//!     Arc::new(IdlePlugin {
//!         declaration: PluginDeclaration {
//!             id: PluginId::new("idle"),
//!             required_tags: vec![EntityTag::Pursuer],
//!             reads: vec![ComponentKind::Transform],
//!             emits: vec![OutputKind::Command],
//!         },
//!     }),
//! );
//!
//! assert_eq!(registry.plugins_for(EntityTag::Pursuer).len(), 1);
//! assert!(registry.plugins_for(EntityTag::Scenery).is_empty());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityTag};
use crate::input::InputFrame;
use crate::output::{Output, OutputKind, TraceId};
use crate::world_view::WorldView;

pub use crate::output::PluginId;

// =============================================================================
// Component Kind
// =============================================================================

/// Component type identifiers for plugin declarations.
///
/// The [`WorldView`] only hands out components listed in a plugin's `reads`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Position and yaw
    Transform,
    /// Velocities and ground contact
    Body,
    /// Camera pitch and look mode
    Look,
    /// Current and maximum health
    Health,
    /// Magazine
    Ammo,
    /// Pursuit target and destination
    Navigation,
    /// Per-player tuning values
    Tuning,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform => write!(f, "Transform"),
            Self::Body => write!(f, "Body"),
            Self::Look => write!(f, "Look"),
            Self::Health => write!(f, "Health"),
            Self::Ammo => write!(f, "Ammo"),
            Self::Navigation => write!(f, "Navigation"),
            Self::Tuning => write!(f, "Tuning"),
        }
    }
}

// =============================================================================
// Plugin Declaration
// =============================================================================

/// Declaration of a plugin's capabilities and requirements.
///
/// - `id`: Unique identifier for the plugin
/// - `required_tags`: Which entity types this plugin operates on
/// - `reads`: Which component types the plugin needs to read
/// - `emits`: Which output kinds the plugin may emit
#[derive(Debug, Clone)]
pub struct PluginDeclaration {
    /// Unique identifier for this plugin.
    pub id: PluginId,
    /// Entity tags this plugin operates on.
    pub required_tags: Vec<EntityTag>,
    /// Component types this plugin reads.
    pub reads: Vec<ComponentKind>,
    /// Output kinds this plugin may emit.
    pub emits: Vec<OutputKind>,
}

impl PluginDeclaration {
    /// Checks if this plugin operates on the given entity tag.
    #[must_use]
    pub fn supports_tag(&self, tag: EntityTag) -> bool {
        self.required_tags.contains(&tag)
    }

    /// Checks if this plugin reads the given component kind.
    #[must_use]
    pub fn reads_component(&self, kind: ComponentKind) -> bool {
        self.reads.contains(&kind)
    }

    /// Checks if this plugin emits the given output kind.
    #[must_use]
    pub fn emits_output(&self, kind: OutputKind) -> bool {
        self.emits.contains(&kind)
    }
}

// =============================================================================
// Frame and Plugin Context
// =============================================================================

/// Per-frame data supplied by the host scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameContext {
    /// Elapsed frame time in seconds.
    pub dt: f32,
    /// Input sampled once for this frame.
    pub input: InputFrame,
}

impl FrameContext {
    /// Creates a frame context.
    #[must_use]
    pub const fn new(dt: f32, input: InputFrame) -> Self {
        Self { dt, input }
    }

    /// A frame with no input.
    #[must_use]
    pub const fn idle(dt: f32) -> Self {
        Self::new(dt, InputFrame::IDLE)
    }
}

/// Contextual information passed to a plugin during execution.
#[derive(Debug, Clone, Copy)]
pub struct PluginContext {
    /// The entity this plugin is operating on.
    pub entity_id: EntityId,
    /// The current simulation tick.
    pub tick: u64,
    /// Trace ID for log correlation.
    pub trace_id: TraceId,
    /// Elapsed frame time in seconds.
    pub dt: f32,
    /// This frame's input sample.
    pub input: InputFrame,
}

// =============================================================================
// Plugin Trait
// =============================================================================

/// Per-entity logic run during the plugin phase.
///
/// # Implementation Guidelines
///
/// 1. **No side effects**: all effects are expressed through outputs.
/// 2. **Determinism**: the same context and view always produce the same outputs.
/// 3. **Respect declarations**: only access components declared in `reads`,
///    and only emit output kinds declared in `emits`.
pub trait Plugin: Send + Sync {
    /// Returns the plugin's declaration.
    fn declaration(&self) -> &PluginDeclaration;

    /// Executes the plugin logic for one entity.
    fn run(&self, ctx: &PluginContext, view: &WorldView) -> Vec<Output>;
}

// =============================================================================
// Plugin Registry
// =============================================================================

/// Registry of plugins organized by entity tag.
#[derive(Default)]
pub struct PluginRegistry {
    bundles: HashMap<EntityTag, Vec<Arc<dyn Plugin>>>,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundles: HashMap::new(),
        }
    }

    /// Registers a plugin for the given entity tag.
    pub fn register(&mut self, tag: EntityTag, plugin: Arc<dyn Plugin>) {
        self.bundles.entry(tag).or_default().push(plugin);
    }

    /// Returns the plugins registered for the given entity tag.
    #[must_use]
    pub fn plugins_for(&self, tag: EntityTag) -> &[Arc<dyn Plugin>] {
        self.bundles.get(&tag).map_or(&[], Vec::as_slice)
    }

    /// Returns the total number of plugin registrations.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.bundles.values().map(Vec::len).sum()
    }

    /// Returns true if the registry has no plugins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.values().all(Vec::is_empty)
    }

    /// Clears all plugins from the registry.
    pub fn clear(&mut self) {
        self.bundles.clear();
    }

    /// Creates a registry with the standard bundles.
    ///
    /// - Players: locomotion
    /// - Pursuers: pursuit
    /// - Scenery: none
    ///
    /// # Example
    ///
    /// ```
    /// use dreadwalk_core::plugin::PluginRegistry;
    /// use dreadwalk_core::entity::EntityTag;
    ///
    /// let registry = PluginRegistry::default_bundles();
    /// assert_eq!(registry.plugins_for(EntityTag::Player).len(), 1);
    /// assert_eq!(registry.plugins_for(EntityTag::Pursuer).len(), 1);
    /// assert!(registry.plugins_for(EntityTag::Scenery).is_empty());
    /// ```
    #[must_use]
    pub fn default_bundles() -> Self {
        use crate::plugins::{LocomotionPlugin, PursuitPlugin};

        let mut registry = Self::new();
        registry.register(EntityTag::Player, Arc::new(LocomotionPlugin::new()));
        registry.register(EntityTag::Pursuer, Arc::new(PursuitPlugin::new()));
        registry
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("bundle_count", &self.bundles.len())
            .field("registration_count", &self.registration_count())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct TestPlugin {
        declaration: PluginDeclaration,
    }

    impl Plugin for TestPlugin {
        fn declaration(&self) -> &PluginDeclaration {
            &self.declaration
        }

        fn run(&self, _ctx: &PluginContext, _view: &WorldView) -> Vec<Output> {
            vec![]
        }
    }

    fn make_test_declaration() -> PluginDeclaration {
        PluginDeclaration {
            id: PluginId::new("test"),
            required_tags: vec![EntityTag::Player],
            reads: vec![ComponentKind::Transform, ComponentKind::Body],
            emits: vec![OutputKind::Command, OutputKind::Event],
        }
    }

    mod plugin_declaration_tests {
        use super::*;

        #[test]
        fn supports_tag() {
            let decl = make_test_declaration();
            assert!(decl.supports_tag(EntityTag::Player));
            assert!(!decl.supports_tag(EntityTag::Pursuer));
        }

        #[test]
        fn reads_and_emits() {
            let decl = make_test_declaration();
            assert!(decl.reads_component(ComponentKind::Body));
            assert!(!decl.reads_component(ComponentKind::Navigation));
            assert!(decl.emits_output(OutputKind::Event));
            assert!(!decl.emits_output(OutputKind::Modifier));
        }
    }

    mod component_kind_tests {
        use super::*;

        #[test]
        fn display_format() {
            assert_eq!(ComponentKind::Navigation.to_string(), "Navigation");
            assert_eq!(ComponentKind::Tuning.to_string(), "Tuning");
        }
    }

    mod frame_context_tests {
        use super::*;

        #[test]
        fn idle_has_no_input() {
            let frame = FrameContext::idle(0.016);
            assert_eq!(frame.dt, 0.016);
            assert_eq!(frame.input, InputFrame::IDLE);
        }
    }

    mod plugin_registry_tests {
        use super::*;

        #[test]
        fn register_and_lookup() {
            let mut registry = PluginRegistry::new();
            assert!(registry.is_empty());

            let plugin: Arc<dyn Plugin> = Arc::new(TestPlugin {
                declaration: make_test_declaration(),
            });
            registry.register(EntityTag::Player, Arc::clone(&plugin));
            registry.register(EntityTag::Pursuer, plugin);

            assert_eq!(registry.registration_count(), 2);
            assert_eq!(registry.plugins_for(EntityTag::Player).len(), 1);
            assert!(registry.plugins_for(EntityTag::Scenery).is_empty());

            registry.clear();
            assert!(registry.is_empty());
        }

        #[test]
        fn default_bundles_cover_actors() {
            let registry = PluginRegistry::default_bundles();
            assert_eq!(
                registry.plugins_for(EntityTag::Player)[0]
                    .declaration()
                    .id
                    .as_str(),
                "locomotion"
            );
            assert_eq!(
                registry.plugins_for(EntityTag::Pursuer)[0]
                    .declaration()
                    .id
                    .as_str(),
                "pursuit"
            );
        }

        #[test]
        fn debug_reports_counts() {
            let registry = PluginRegistry::default_bundles();
            let debug = format!("{registry:?}");
            assert!(debug.contains("registration_count: 2"));
        }
    }
}
