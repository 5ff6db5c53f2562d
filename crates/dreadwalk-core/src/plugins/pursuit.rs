//! Pursuit plugin for enemies.
//!
//! Every frame, a pursuer re-targets its navigation destination to the
//! tracked entity's position in the frame snapshot. There is no caching,
//! distance threshold or line-of-sight check; the navigator does the rest.
//!
//! # Supported Entity Types
//!
//! - Pursuer
//!
//! # Outputs
//!
//! - `Command::SetDestination`: every frame

use tracing::warn;

use crate::entity::EntityTag;
use crate::output::{Command, Output, OutputKind, PluginId};
use crate::plugin::{ComponentKind, Plugin, PluginContext, PluginDeclaration};
use crate::world_view::WorldView;

/// Plugin that points a pursuer at its target.
///
/// # Example
///
/// ```
/// use dreadwalk_core::plugins::PursuitPlugin;
/// use dreadwalk_core::plugin::Plugin;
///
/// let plugin = PursuitPlugin::new();
/// assert_eq!(plugin.declaration().id.as_str(), "pursuit");
/// ```
pub struct PursuitPlugin {
    declaration: PluginDeclaration,
}

impl PursuitPlugin {
    /// Creates a new `PursuitPlugin`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: PluginDeclaration {
                id: PluginId::from_static("pursuit"),
                required_tags: vec![EntityTag::Pursuer],
                reads: vec![
                    ComponentKind::Transform,
                    ComponentKind::Health,
                    ComponentKind::Navigation,
                ],
                emits: vec![OutputKind::Command],
            },
        }
    }
}

impl Default for PursuitPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PursuitPlugin {
    fn declaration(&self) -> &PluginDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &PluginContext, view: &WorldView) -> Vec<Output> {
        let Some(navigation) = view.get_navigation(ctx.entity_id) else {
            return vec![];
        };
        if view
            .get_health(ctx.entity_id)
            .is_some_and(|health| !health.is_alive())
        {
            return vec![];
        }

        // Targets are validated before the plugin phase; a miss here means the
        // arena was edited mid-frame.
        let Some(target) = view.get_transform(navigation.target) else {
            warn!(pursuer = %ctx.entity_id, target = %navigation.target, "pursuit target missing");
            return vec![];
        };

        vec![Output::Command(Command::SetDestination {
            target: ctx.entity_id,
            destination: target.position,
        })]
    }
}

// =============================================================================
// Tests
// =============================================================================
