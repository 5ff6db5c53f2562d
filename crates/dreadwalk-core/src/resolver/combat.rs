//! Combat resolver for damage and magazines.
//!
//! The `CombatResolver` handles:
//! - `ApplyDamage` modifiers: Reduce health through the `Damageable` capability
//! - `ConsumeRound` commands: Spend one loaded round
//! - `Reload` commands: Refill the magazine from spare rounds
//!
//! # Death Handling
//!
//! When health reaches 0 the actor is marked dead and a `Died` event is
//! raised once. Dead pursuers are removed from the arena when the frame is
//! applied, not here, so later outputs in the same frame never refer to a
//! missing entity.

use tracing::{debug, warn};

use crate::arena::Arena;
use crate::combat::damage_entity;
use crate::entity::{DamageOutcome, EntityId};
use crate::output::{Command, Event, Modifier, OutputEnvelope, OutputKind};
use crate::plugin::FrameContext;

use super::Resolver;

/// Resolver for combat modifiers and magazine commands.
///
/// Damage is processed in output order, one hit at a time, so two hits on
/// the same target in one frame both count and only the killing hit raises
/// `Died`.
///
/// # Example
///
/// ```
/// use dreadwalk_core::resolver::CombatResolver;
/// use dreadwalk_core::resolver::Resolver;
/// use dreadwalk_core::output::OutputKind;
///
/// let resolver = CombatResolver::new();
/// assert!(resolver.handles().contains(&OutputKind::Modifier));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a new combat resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn apply_damage(
        next: &mut Arena,
        source: EntityId,
        target: EntityId,
        amount: f32,
        events: &mut Vec<Event>,
    ) {
        let Some(outcome) = damage_entity(next, target, amount) else {
            warn!(%source, %target, "damage target missing or not damageable");
            return;
        };
        events.push(Event::DamageDealt {
            source,
            target,
            amount,
            outcome,
        });
        if outcome == DamageOutcome::Killed {
            debug!(%target, "killed");
            events.push(Event::Died { entity: target });
        }
    }

    fn apply_magazine(next: &mut Arena, command: &Command) {
        let (target, reload) = match *command {
            Command::ConsumeRound { target } => (target, false),
            Command::Reload { target } => (target, true),
            _ => return,
        };
        let Some(ammo) = next
            .get_mut(target)
            .and_then(|e| e.inner_mut().as_player_mut())
            .and_then(|p| p.ammo.as_mut())
        else {
            return;
        };
        if reload {
            let moved = ammo.reload();
            debug!(%target, moved, loaded = ammo.loaded, spare = ammo.spare, "reloaded");
        } else if !ammo.try_consume() {
            warn!(%target, "round consumed from empty magazine");
        }
    }
}

impl Resolver for CombatResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Modifier, OutputKind::Command]
    }

    fn resolve(
        &self,
        _frame: &FrameContext,
        outputs: &[&OutputEnvelope],
        _current: &Arena,
        next: &mut Arena,
    ) -> Vec<Event> {
        let mut events = Vec::new();
        for envelope in outputs {
            if let Some(Modifier::ApplyDamage {
                source,
                target,
                amount,
            }) = envelope.output().as_modifier()
            {
                Self::apply_damage(next, *source, *target, *amount, &mut events);
            } else if let Some(command) = envelope.output().as_command() {
                Self::apply_magazine(next, command);
            }
        }
        events
    }
}
