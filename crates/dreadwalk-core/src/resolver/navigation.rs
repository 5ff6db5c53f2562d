//! Navigation resolver for pursuer destinations and movement.
//!
//! Pursuers do not integrate physics. Each frame the resolver records the
//! destination proposed by the pursuit plugin and asks a [`Navigator`] where
//! the agent ends up after `dt` at its move speed.

use std::fmt;
use std::sync::Arc;

use glam::Vec3;

use crate::arena::Arena;
use crate::entity::{EntityId, PursuerComponents};
use crate::output::{Command, Event, OutputEnvelope, OutputKind};
use crate::plugin::FrameContext;

use super::Resolver;

// =============================================================================
// Navigator
// =============================================================================

/// Path-following collaborator for pursuers.
///
/// Hosts with a navigation mesh implement this to route agents around
/// obstacles. Implementations must be deterministic.
pub trait Navigator: Send + Sync {
    /// Returns the agent's position after moving toward `destination` for
    /// `dt` seconds at `speed`.
    fn next_position(&self, from: Vec3, destination: Vec3, speed: f32, dt: f32) -> Vec3;
}

/// Straight-line navigator on the horizontal plane.
///
/// Keeps the agent's height and never overshoots the destination.
///
/// # Example
///
/// ```
/// use dreadwalk_core::resolver::{DirectNavigator, Navigator};
/// use glam::Vec3;
///
/// let next = DirectNavigator.next_position(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 5.0, 0.5);
/// assert!((next.x - 2.5).abs() < 1e-5);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectNavigator;

impl Navigator for DirectNavigator {
    fn next_position(&self, from: Vec3, destination: Vec3, speed: f32, dt: f32) -> Vec3 {
        let offset = Vec3::new(destination.x - from.x, 0.0, destination.z - from.z);
        let step = speed * dt;
        let distance = offset.length();
        if distance <= step {
            Vec3::new(destination.x, from.y, destination.z)
        } else {
            from + offset * (step / distance)
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolver for `SetDestination` commands and pursuer movement.
///
/// # Processing Order
///
/// 1. Store destinations from `SetDestination` commands (last write wins)
/// 2. Move every living pursuer that has a destination
/// 3. Face the direction of travel and re-index the collider
///
/// # Example
///
/// ```
/// use dreadwalk_core::resolver::{NavigationResolver, Resolver};
/// use dreadwalk_core::output::OutputKind;
///
/// let resolver = NavigationResolver::default();
/// assert_eq!(resolver.handles(), &[OutputKind::Command]);
/// ```
#[derive(Clone)]
pub struct NavigationResolver {
    navigator: Arc<dyn Navigator>,
}

impl NavigationResolver {
    /// Creates a resolver that moves pursuers with `navigator`.
    #[must_use]
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    fn pursuer_mut(next: &mut Arena, id: EntityId) -> Option<&mut PursuerComponents> {
        next.get_mut(id)?.inner_mut().as_pursuer_mut()
    }

    fn advance(&self, pursuer: &mut PursuerComponents, dt: f32) -> bool {
        let Some(destination) = pursuer.navigation.destination else {
            return false;
        };
        if !pursuer.health.is_alive() {
            return false;
        }
        let from = pursuer.transform.position;
        let to = self.navigator.next_position(from, destination, pursuer.navigation.move_speed, dt);
        if to == from {
            return false;
        }
        let travel = to - from;
        if travel.x != 0.0 || travel.z != 0.0 {
            pursuer.transform.yaw = travel.x.atan2(travel.z).to_degrees();
        }
        pursuer.transform.position = to;
        true
    }
}

impl Default for NavigationResolver {
    fn default() -> Self {
        Self::new(Arc::new(DirectNavigator))
    }
}

impl fmt::Debug for NavigationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationResolver").finish_non_exhaustive()
    }
}

impl Resolver for NavigationResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Command]
    }

    fn resolve(
        &self,
        frame: &FrameContext,
        outputs: &[&OutputEnvelope],
        _current: &Arena,
        next: &mut Arena,
    ) -> Vec<Event> {
        for envelope in outputs {
            if let Some(Command::SetDestination {
                target,
                destination,
            }) = envelope.output().as_command()
            {
                if let Some(pursuer) = Self::pursuer_mut(next, *target) {
                    pursuer.navigation.destination = Some(*destination);
                }
            }
        }

        let pursuers: Vec<EntityId> = next
            .entities_sorted()
            .filter(|e| e.is_pursuer())
            .map(|e| e.id())
            .collect();

        for id in pursuers {
            let moved = Self::pursuer_mut(next, id).is_some_and(|p| self.advance(p, frame.dt));
            if moved {
                next.update_bounds(id);
            }
        }
        vec![]
    }
}
