//! Resolver module for the Entity-Plugin-Resolver architecture.
//!
//! Resolvers process plugin outputs and mutate the next state. They are the
//! write phase of the execution loop where proposed changes become actual
//! state mutations.
//!
//! # Architecture
//!
//! Each resolver declares which output kinds it handles via [`Resolver::handles()`].
//! During resolution:
//! 1. Outputs are collected from all plugins and sorted
//! 2. Outputs are routed to resolvers based on their kind
//! 3. Each resolver, in a fixed order, processes its outputs and mutates `next`
//! 4. Events raised while resolving are returned for the frame report
//!
//! # Invariants
//!
//! - Cross-entity lookups (targets, positions of others) use `current`
//! - A resolver only touches the fields it owns in `next`
//! - Resolvers are deterministic given the same inputs and output order
//!
//! # Available Resolvers
//!
//! - [`PhysicsResolver`]: Look, velocity, impulses, gravity and ground contact
//! - [`NavigationResolver`]: Pursuer destinations and navigator-driven movement
//! - [`CombatResolver`]: Damage, knockback and magazine commands
//! - [`EventResolver`]: Forwards plugin events to the host (no state mutation)

mod combat;
mod event;
mod navigation;
mod physics;

pub use combat::CombatResolver;
pub use event::EventResolver;
pub use navigation::{DirectNavigator, NavigationResolver, Navigator};
pub use physics::PhysicsResolver;

use crate::arena::Arena;
use crate::output::{Event, OutputEnvelope, OutputKind};
use crate::plugin::FrameContext;

/// Resolver processes outputs and mutates the next state.
///
/// # Example
///
/// ```
/// use dreadwalk_core::resolver::Resolver;
/// use dreadwalk_core::output::{Event, OutputKind, OutputEnvelope};
/// use dreadwalk_core::plugin::FrameContext;
/// use dreadwalk_core::arena::Arena;
///
/// struct CountingResolver;
///
/// impl Resolver for CountingResolver {
///     fn handles(&self) -> &[OutputKind] {
///         &[OutputKind::Command]
///     }
///
///     fn resolve(
///         &self,
///         _frame: &FrameContext,
///         outputs: &[&OutputEnvelope],
///         _current: &Arena,
///         _next: &mut Arena,
///     ) -> Vec<Event> {
///         assert!(outputs.iter().all(|o| o.kind() == OutputKind::Command));
///         vec![]
///     }
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Returns the output kinds this resolver handles.
    fn handles(&self) -> &[OutputKind];

    /// Resolves outputs into state mutations.
    ///
    /// # Arguments
    ///
    /// * `frame` - Frame time and input of the frame being resolved
    /// * `outputs` - The outputs routed to this resolver (filtered by `handles()`)
    /// * `current` - The frame snapshot (read-only reference for lookups)
    /// * `next` - The next frame's state (mutate this)
    ///
    /// # Returns
    ///
    /// Events raised while resolving, in the order they happened.
    fn resolve(
        &self,
        frame: &FrameContext,
        outputs: &[&OutputEnvelope],
        current: &Arena,
        next: &mut Arena,
    ) -> Vec<Event>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::entity::EntityId;
    use crate::output::{Output, OutputEnvelope, PluginId, PluginInstanceId, TraceId};

    /// Wraps outputs as if one plugin run on `source` emitted them in order.
    pub fn envelopes(source: EntityId, outputs: Vec<Output>) -> Vec<OutputEnvelope> {
        outputs
            .into_iter()
            .enumerate()
            .map(|(seq, output)| {
                OutputEnvelope::new(
                    output,
                    PluginInstanceId::new(source, PluginId::new("test")),
                    TraceId::new(0),
                    0,
                    u32::try_from(seq).unwrap(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn Resolver>) {}
        fn _accepts_slice(_resolvers: &[Box<dyn Resolver>]) {}
    }
}
