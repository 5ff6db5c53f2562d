//! Locomotion plugin for the player.
//!
//! Turns one frame of input into look, movement, jump and fire outputs.
//!
//! # Supported Entity Types
//!
//! - Player
//!
//! # Outputs
//!
//! In emission order:
//! - `Command::EngageLook` and `Event::LookModeEntered` on the first frame
//! - `Command::SetLook` every frame
//! - `Command::SetHorizontalVelocity` every frame
//! - `Command::ApplyImpulse` when jumping from the ground
//! - `Command::ConsumeRound` or `Event::DryFire`, then `Event::ShotFired`
//!   and possibly `Modifier::ApplyDamage`, on the fire edge
//! - `Command::Reload` on the reload edge
//!
//! A dead player emits nothing.

use glam::{Vec2, Vec3};
use tracing::trace;

use crate::combat::TraceHit;
use crate::entity::{EntityTag, TransformState};
use crate::output::{Command, Event, Modifier, Output, OutputKind, PluginId};
use crate::plugin::{ComponentKind, Plugin, PluginContext, PluginDeclaration};
use crate::world_view::WorldView;

/// Accumulates a pitch change and clamps the result to `[-limit, limit]`.
///
/// A non-finite change leaves the pitch as it was.
#[must_use]
pub fn clamp_pitch(current: f32, delta: f32, limit: f32) -> f32 {
    let limit = limit.abs();
    let next = current + delta;
    if next.is_finite() {
        next.clamp(-limit, limit)
    } else {
        current.clamp(-limit, limit)
    }
}

/// World-space planar direction for the given walk axes.
///
/// Returns a unit (x, z) vector along `right * horizontal + forward * vertical`
/// for any nonzero input, and exactly zero when both axes are zero.
#[must_use]
pub fn movement_direction(transform: &TransformState, horizontal: f32, vertical: f32) -> Vec2 {
    let local = Vec2::new(horizontal, vertical);
    let largest = horizontal.abs().max(vertical.abs());
    if !(largest > 0.0 && largest.is_finite()) {
        return Vec2::ZERO;
    }
    // Pre-scaling keeps tiny inputs from underflowing during normalization.
    let local = (local / largest).normalize_or_zero();
    let world = transform.right() * local.x + transform.forward() * local.y;
    Vec2::new(world.x, world.z)
}

/// Plugin that drives the player from input.
///
/// # Example
///
/// ```
/// use dreadwalk_core::plugins::LocomotionPlugin;
/// use dreadwalk_core::plugin::Plugin;
///
/// let plugin = LocomotionPlugin::new();
/// assert_eq!(plugin.declaration().id.as_str(), "locomotion");
/// ```
pub struct LocomotionPlugin {
    declaration: PluginDeclaration,
}

impl LocomotionPlugin {
    /// Creates a new `LocomotionPlugin`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: PluginDeclaration {
                id: PluginId::from_static("locomotion"),
                required_tags: vec![EntityTag::Player],
                reads: vec![
                    ComponentKind::Transform,
                    ComponentKind::Body,
                    ComponentKind::Look,
                    ComponentKind::Health,
                    ComponentKind::Ammo,
                    ComponentKind::Tuning,
                ],
                emits: vec![OutputKind::Command, OutputKind::Modifier, OutputKind::Event],
            },
        }
    }
}

impl Default for LocomotionPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for LocomotionPlugin {
    fn declaration(&self) -> &PluginDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &PluginContext, view: &WorldView) -> Vec<Output> {
        let mut outputs: Vec<Output> = vec![];
        let id = ctx.entity_id;

        let (Some(transform), Some(body), Some(look), Some(health), Some(config)) = (
            view.get_transform(id),
            view.get_body(id),
            view.get_look(id),
            view.get_health(id),
            view.get_player_config(id),
        ) else {
            return outputs;
        };
        if !health.is_alive() {
            return outputs;
        }
        let input = ctx.input;

        if !look.engaged {
            outputs.push(Command::EngageLook { target: id }.into());
            outputs.push(Event::LookModeEntered { entity: id }.into());
        }

        // Look
        let turn = config.mouse_sensitivity * ctx.dt;
        let mut yaw = transform.yaw + input.mouse_dx * turn;
        if !yaw.is_finite() {
            yaw = transform.yaw;
        }
        let pitch = clamp_pitch(look.pitch, -input.mouse_dy * turn, config.vertical_look_limit);
        outputs.push(
            Command::SetLook {
                target: id,
                yaw,
                pitch,
            }
            .into(),
        );
        let facing = TransformState::new(transform.position, yaw);

        // Move
        let velocity =
            movement_direction(&facing, input.horizontal, input.vertical) * config.move_speed;
        outputs.push(
            Command::SetHorizontalVelocity {
                target: id,
                velocity,
            }
            .into(),
        );

        // Jump, only from the ground; dropped otherwise.
        if input.jump_pressed && body.grounded {
            outputs.push(
                Command::ApplyImpulse {
                    target: id,
                    impulse: Vec3::Y * config.jump_impulse,
                    grounds_off: true,
                }
                .into(),
            );
        }

        // Fire
        if input.fire_pressed {
            let chambered = match view.get_ammo(id) {
                Some(ammo) if ammo.loaded == 0 => {
                    outputs.push(Event::DryFire { source: id }.into());
                    false
                }
                Some(_) => {
                    outputs.push(Command::ConsumeRound { target: id }.into());
                    true
                }
                None => true,
            };

            if chambered {
                let origin = transform.position + Vec3::Y * config.eye_height;
                let direction = facing.look_direction(pitch);
                let hit = view.trace(origin, direction, config.trace_range, Some(id));
                trace!(entity = %id, ?hit, "shot fired");

                outputs.push(
                    Event::ShotFired {
                        source: id,
                        origin,
                        direction,
                        hit,
                    }
                    .into(),
                );
                if let Some(hit) = hit.filter(TraceHit::is_damage_target) {
                    outputs.push(
                        Modifier::ApplyDamage {
                            source: id,
                            target: hit.entity,
                            amount: config.trace_damage,
                        }
                        .into(),
                    );
                }
            }
        }

        // Reload
        if input.reload_pressed && view.get_ammo(id).is_some() {
            outputs.push(Command::Reload { target: id }.into());
        }

        outputs
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::config::{AmmoConfig, PlayerConfig, PursuerConfig};
    use crate::entity::{
        Classification, EntityId, EntityInner, PlayerComponents, PursuerComponents,
    };
    use crate::input::InputFrame;
    use crate::output::TraceId;
    use proptest::prelude::*;

    fn spawn_player(arena: &mut Arena, config: PlayerConfig) -> EntityId {
        let mut player = PlayerComponents::from_config(Vec3::ZERO, 0.0, config);
        player.look.engaged = true;
        arena.spawn(Classification::PLAYER, EntityInner::Player(player))
    }

    fn run(arena: &Arena, id: EntityId, dt: f32, input: InputFrame) -> Vec<Output> {
        let plugin = LocomotionPlugin::new();
        let view = WorldView::for_plugin(arena, plugin.declaration(), arena.current_tick());
        let ctx = PluginContext {
            entity_id: id,
            tick: arena.current_tick(),
            trace_id: TraceId::new(0),
            dt,
            input,
        };
        plugin.run(&ctx, &view)
    }

    fn commands(outputs: &[Output]) -> Vec<&Command> {
        outputs.iter().filter_map(Output::as_command).collect()
    }

    fn set_look(outputs: &[Output]) -> (f32, f32) {
        commands(outputs)
            .into_iter()
            .find_map(|c| match c {
                Command::SetLook { yaw, pitch, .. } => Some((*yaw, *pitch)),
                _ => None,
            })
            .unwrap()
    }

    fn velocity(outputs: &[Output]) -> Vec2 {
        commands(outputs)
            .into_iter()
            .find_map(|c| match c {
                Command::SetHorizontalVelocity { velocity, .. } => Some(*velocity),
                _ => None,
            })
            .unwrap()
    }

    mod declaration_tests {
        use super::*;

        #[test]
        fn targets_players_only() {
            let plugin = LocomotionPlugin::default();
            let decl = plugin.declaration();
            assert!(decl.supports_tag(EntityTag::Player));
            assert!(!decl.supports_tag(EntityTag::Pursuer));
            assert!(decl.emits_output(OutputKind::Modifier));
        }
    }

    mod look_tests {
        use super::*;

        #[test]
        fn first_frame_enters_look_mode() {
            let mut arena = Arena::new();
            let id = arena.spawn(
                Classification::PLAYER,
                EntityInner::Player(PlayerComponents::default()),
            );
            let outputs = run(&arena, id, 0.016, InputFrame::IDLE);
            assert_eq!(outputs[0], Command::EngageLook { target: id }.into());
            assert_eq!(outputs[1], Event::LookModeEntered { entity: id }.into());
        }

        #[test]
        fn engaged_player_does_not_reenter() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, PlayerConfig::default());
            let outputs = run(&arena, id, 0.016, InputFrame::IDLE);
            assert!(!outputs
                .iter()
                .any(|o| matches!(o, Output::Event(Event::LookModeEntered { .. }))));
        }

        #[test]
        fn mouse_turns_yaw_and_pitch() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, PlayerConfig::default());
            // 60 deg/unit/s * 0.5 s: dx 1 -> +30 yaw, dy 1 -> -30 pitch (looks up).
            let (yaw, pitch) = set_look(&run(&arena, id, 0.5, InputFrame::look(1.0, 1.0)));
            assert!((yaw - 30.0).abs() < 1e-4);
            assert!((pitch + 30.0).abs() < 1e-4);
        }

        #[test]
        fn large_pitch_request_clamps_to_limit() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, PlayerConfig::default());
            // -dy * 60 * 1 = +200 degrees requested.
            let (_, pitch) = set_look(&run(&arena, id, 1.0, InputFrame::look(0.0, -200.0 / 60.0)));
            assert_eq!(pitch, 80.0);
        }
    }

    mod move_tests {
        use super::*;

        #[test]
        fn zero_input_gives_zero_velocity() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, PlayerConfig::default());
            assert_eq!(velocity(&run(&arena, id, 0.016, InputFrame::IDLE)), Vec2::ZERO);
        }

        #[test]
        fn diagonal_is_normalized_to_move_speed() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, PlayerConfig::default());
            let v = velocity(&run(&arena, id, 0.016, InputFrame::walk(1.0, 1.0)));
            assert!((v.length() - 5.0).abs() < 1e-4);
            assert!(v.x > 0.0 && v.y > 0.0);
        }

        #[test]
        fn movement_uses_this_frames_yaw() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, PlayerConfig::default());
            // Turn 90 degrees and walk forward in the same frame: move along +X.
            let input = InputFrame {
                vertical: 1.0,
                mouse_dx: 90.0 / 60.0,
                ..InputFrame::IDLE
            };
            let v = velocity(&run(&arena, id, 1.0, input));
            assert!((v - Vec2::new(5.0, 0.0)).length() < 1e-4);
        }
    }

    mod jump_tests {
        use super::*;

        fn impulses(outputs: &[Output]) -> usize {
            commands(outputs)
                .into_iter()
                .filter(|c| matches!(c, Command::ApplyImpulse { .. }))
                .count()
        }

        #[test]
        fn grounded_jump_emits_impulse() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, PlayerConfig::default());
            let outputs = run(&arena, id, 0.016, InputFrame::IDLE.with_jump());
            assert_eq!(impulses(&outputs), 1);
            assert!(commands(&outputs).contains(&&Command::ApplyImpulse {
                target: id,
                impulse: Vec3::new(0.0, 5.0, 0.0),
                grounds_off: true,
            }));
        }

        #[test]
        fn airborne_jump_is_dropped() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, PlayerConfig::default());
            if let Some(p) = arena.get_mut(id).and_then(|e| e.inner_mut().as_player_mut()) {
                p.body.grounded = false;
            }
            assert_eq!(impulses(&run(&arena, id, 0.016, InputFrame::IDLE.with_jump())), 0);
        }
    }

    mod fire_tests {
        use super::*;

        fn arena_with_target(config: PlayerConfig, distance: f32) -> (Arena, EntityId, EntityId) {
            let mut arena = Arena::new();
            let player = spawn_player(&mut arena, config);
            let pursuer = arena.spawn(
                Classification::HOSTILE,
                EntityInner::Pursuer(PursuerComponents::from_config(
                    Vec3::new(0.0, 0.0, distance),
                    player,
                    &PursuerConfig::default(),
                )),
            );
            (arena, player, pursuer)
        }

        fn damage(outputs: &[Output]) -> Vec<&Modifier> {
            outputs.iter().filter_map(Output::as_modifier).collect()
        }

        #[test]
        fn hit_within_range_applies_damage() {
            let (arena, player, pursuer) = arena_with_target(PlayerConfig::default(), 10.0);
            let outputs = run(&arena, player, 0.016, InputFrame::IDLE.with_fire());
            assert_eq!(
                damage(&outputs),
                vec![&Modifier::ApplyDamage {
                    source: player,
                    target: pursuer,
                    amount: 1.0,
                }]
            );
        }

        #[test]
        fn short_range_misses() {
            let config = PlayerConfig {
                trace_range: 5.0,
                ..PlayerConfig::default()
            };
            let (arena, player, _) = arena_with_target(config, 10.0);
            let outputs = run(&arena, player, 0.016, InputFrame::IDLE.with_fire());
            assert!(damage(&outputs).is_empty());
            assert!(outputs.iter().any(|o| matches!(
                o,
                Output::Event(Event::ShotFired { hit: None, .. })
            )));
        }

        #[test]
        fn empty_magazine_dry_fires_without_trace() {
            let config = PlayerConfig {
                ammo: Some(AmmoConfig {
                    loaded: 0,
                    capacity: 6,
                    spare: 0,
                }),
                ..PlayerConfig::default()
            };
            let (arena, player, _) = arena_with_target(config, 10.0);
            let outputs = run(&arena, player, 0.016, InputFrame::IDLE.with_fire());
            assert!(outputs.contains(&Event::DryFire { source: player }.into()));
            assert!(!outputs
                .iter()
                .any(|o| matches!(o, Output::Event(Event::ShotFired { .. }))));
            assert!(damage(&outputs).is_empty());
        }

        #[test]
        fn loaded_magazine_consumes_before_shot() {
            let config = PlayerConfig {
                ammo: Some(AmmoConfig {
                    loaded: 0,
                    capacity: 6,
                    spare: 6,
                }),
                ..PlayerConfig::default()
            };
            let (arena, player, _) = arena_with_target(config, 10.0);
            let outputs = run(&arena, player, 0.016, InputFrame::IDLE.with_fire().with_reload());
            let consume = outputs
                .iter()
                .position(|o| *o == Command::ConsumeRound { target: player }.into())
                .unwrap();
            let shot = outputs
                .iter()
                .position(|o| matches!(o, Output::Event(Event::ShotFired { .. })))
                .unwrap();
            let reload = outputs
                .iter()
                .position(|o| *o == Command::Reload { target: player }.into())
                .unwrap();
            assert!(consume < shot && shot < reload);
        }

        #[test]
        fn reload_without_magazine_is_ignored() {
            let (arena, player, _) = arena_with_target(PlayerConfig::default(), 10.0);
            let outputs = run(&arena, player, 0.016, InputFrame::IDLE.with_reload());
            assert!(!outputs.contains(&Command::Reload { target: player }.into()));
        }
    }

    #[test]
    fn dead_player_is_inert() {
        let mut arena = Arena::new();
        let id = spawn_player(&mut arena, PlayerConfig::default());
        if let Some(p) = arena.get_mut(id).and_then(|e| e.inner_mut().as_player_mut()) {
            p.health.apply_damage(100.0);
        }
        let input = InputFrame::walk(1.0, 1.0).with_jump().with_fire();
        assert!(run(&arena, id, 0.016, input).is_empty());
    }

    mod property_tests {
        use super::*;

        proptest! {
            #[test]
            fn pitch_stays_within_limit(
                start in -80.0f32..=80.0,
                deltas in prop::collection::vec(-1000.0f32..1000.0, 1..20),
                limit in 0.0f32..90.0,
            ) {
                let mut pitch = start.clamp(-limit, limit);
                for delta in deltas {
                    pitch = clamp_pitch(pitch, delta, limit);
                    prop_assert!(pitch >= -limit && pitch <= limit);
                }
            }

            #[test]
            fn direction_is_unit_or_zero(
                horizontal in -1.0f32..=1.0,
                vertical in -1.0f32..=1.0,
                yaw in -720.0f32..720.0,
            ) {
                let transform = TransformState::new(Vec3::ZERO, yaw);
                let dir = movement_direction(&transform, horizontal, vertical);
                if horizontal == 0.0 && vertical == 0.0 {
                    prop_assert_eq!(dir, Vec2::ZERO);
                } else {
                    prop_assert!((dir.length() - 1.0).abs() < 1e-4);
                }
            }
        }
    }
}
