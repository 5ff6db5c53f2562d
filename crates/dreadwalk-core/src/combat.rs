//! Health capability and hit-scan traces.
//!
//! [`Damageable`] is the capability trait for entities with health. The
//! trace is an instantaneous ray query against every collider in the arena;
//! it reports the nearest hit and leaves deciding what to do with it to the
//! caller.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arena::{Arena, Bounds};
use crate::entity::{
    Classification, DamageOutcome, Entity, EntityId, HealthState, PlayerComponents,
    PursuerComponents,
};

// =============================================================================
// Damageable
// =============================================================================

/// Capability of entities that carry health.
pub trait Damageable {
    /// Current health state.
    fn health(&self) -> &HealthState;

    /// Mutable health state.
    fn health_mut(&mut self) -> &mut HealthState;

    /// Applies damage and records it in the diagnostics stream.
    fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        let outcome = self.health_mut().apply_damage(amount);
        debug!(amount, ?outcome, "took damage");
        outcome
    }
}

impl Damageable for PlayerComponents {
    fn health(&self) -> &HealthState {
        &self.health
    }

    fn health_mut(&mut self) -> &mut HealthState {
        &mut self.health
    }
}

impl Damageable for PursuerComponents {
    fn health(&self) -> &HealthState {
        &self.health
    }

    fn health_mut(&mut self) -> &mut HealthState {
        &mut self.health
    }
}

/// Push received by a player when damaged: `knockback` opposite its facing.
#[must_use]
pub fn knockback_impulse(player: &PlayerComponents) -> Vec3 {
    -player.transform.forward() * player.config.knockback
}

/// Applies damage to an arena entity through its [`Damageable`] capability.
///
/// Players that lose health also receive their knockback impulse; a player
/// killed by the hit stops moving. Returns `None` if the entity does not
/// exist or has no health.
pub fn damage_entity(arena: &mut Arena, target: EntityId, amount: f32) -> Option<DamageOutcome> {
    let entity = arena.get_mut(target)?;
    let outcome = entity.as_damageable_mut()?.take_damage(amount);

    if let Some(player) = entity.inner_mut().as_player_mut() {
        if outcome.changed_health() {
            let impulse = knockback_impulse(player);
            player.body.apply_impulse(impulse);
        }
        if outcome == DamageOutcome::Killed {
            player.body.horizontal_velocity = Vec2::ZERO;
        }
    }
    Some(outcome)
}

// =============================================================================
// Trace
// =============================================================================

/// Nearest collider struck by a trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceHit {
    /// Entity that was hit.
    pub entity: EntityId,
    /// Distance from the origin along the ray.
    pub distance: f32,
    /// World-space impact point.
    pub point: Vec3,
    /// Classification of the hit entity.
    pub classification: Classification,
    /// Whether the hit entity carries health.
    pub damageable: bool,
}

impl TraceHit {
    /// True if a hit should deal damage: the target is `HOSTILE` and has health.
    #[must_use]
    pub const fn is_damage_target(&self) -> bool {
        self.damageable && self.classification.contains(Classification::HOSTILE)
    }
}

/// Entry distance of a ray into a box, using the slab method.
///
/// Returns `None` if the ray misses, or if the origin is inside the box.
fn ray_entry(origin: Vec3, direction: Vec3, bounds: Bounds) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
        if d.abs() < f32::EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = d.recip();
        let (t0, t1) = {
            let a = (lo - o) * inv;
            let b = (hi - o) * inv;
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        };
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    (t_min >= 0.0).then_some(t_min)
}

fn is_hostile_actor(entity: &Entity) -> bool {
    entity.classification().contains(Classification::HOSTILE) && entity.as_damageable().is_some()
}

/// Casts a ray and returns the nearest collider hit within `max_range`.
///
/// `direction` is normalized first; a zero or non-finite direction hits
/// nothing. `ignore` excludes one entity, usually the shooter. Equal
/// distances resolve to the lowest entity id.
///
/// Dead actors are transparent. A ray starting inside a live hostile hits it
/// at distance 0; other boxes containing the origin are passed through.
#[must_use]
pub fn perform_trace(
    arena: &Arena,
    origin: Vec3,
    direction: Vec3,
    max_range: f32,
    ignore: Option<EntityId>,
) -> Option<TraceHit> {
    let direction = direction.try_normalize()?;
    if !origin.is_finite() || max_range.is_nan() || max_range < 0.0 {
        return None;
    }

    let mut nearest: Option<(EntityId, f32)> = None;
    for (id, bounds) in arena.bounds().iter() {
        if Some(id) == ignore {
            continue;
        }
        let Some(entity) = arena.get(id) else {
            continue;
        };
        if entity.is_dead() {
            continue;
        }
        let distance = match ray_entry(origin, direction, bounds) {
            Some(distance) => distance,
            None if is_hostile_actor(entity) && bounds.contains(origin) => 0.0,
            None => continue,
        };
        if distance > max_range {
            continue;
        }
        if nearest.map_or(true, |(_, best)| distance < best) {
            nearest = Some((id, distance));
        }
    }

    let (entity_id, distance) = nearest?;
    let entity = arena.get(entity_id)?;
    Some(TraceHit {
        entity: entity_id,
        distance,
        point: origin + direction * distance,
        classification: entity.classification(),
        damageable: entity.as_damageable().is_some(),
    })
}
