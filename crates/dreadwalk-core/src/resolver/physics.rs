//! Physics resolver for player look, velocity and integration.
//!
//! The `PhysicsResolver` handles:
//! - `EngageLook` / `SetLook` commands: Look mode and orientation
//! - `SetHorizontalVelocity` commands: Input-driven planar velocity
//! - `ApplyImpulse` commands: Jumps and other instantaneous pushes
//! - Integration: gravity, `position += velocity * dt`, knockback consumption
//! - Ground contact: landing on and walking off `GROUND` scenery
//!
//! # Variable Timestep
//!
//! The timestep is the host's frame time from [`FrameContext::dt`], so
//! movement speed is independent of frame rate.

use glam::{Vec2, Vec3};

use crate::arena::Arena;
use crate::entity::{Classification, ContactEvent, ContactPhase, EntityId, PlayerComponents};
use crate::output::{Command, Event, OutputEnvelope, OutputKind};
use crate::plugin::FrameContext;

use super::Resolver;

/// Vertical tolerance for standing on a surface.
pub const GROUND_TOLERANCE: f32 = 0.05;

/// Resolver for physics-related commands and integration.
///
/// # Processing Order
///
/// 1. Apply look, velocity and impulse commands in output order
/// 2. Integrate every player with the frame's `dt`
/// 3. Resolve ground contacts (if enabled) and re-index moved colliders
///
/// # Example
///
/// ```
/// use dreadwalk_core::resolver::PhysicsResolver;
/// use dreadwalk_core::resolver::Resolver;
/// use dreadwalk_core::output::OutputKind;
///
/// let resolver = PhysicsResolver::new(9.81);
/// assert!(resolver.handles().contains(&OutputKind::Command));
/// ```
#[derive(Debug, Clone)]
pub struct PhysicsResolver {
    gravity: f32,
    ground_detection: bool,
}

impl PhysicsResolver {
    /// Creates a physics resolver with automatic ground detection.
    #[must_use]
    pub const fn new(gravity: f32) -> Self {
        Self {
            gravity,
            ground_detection: true,
        }
    }

    /// Enables or disables deriving ground contacts from scenery.
    #[must_use]
    pub const fn with_ground_detection(mut self, enabled: bool) -> Self {
        self.ground_detection = enabled;
        self
    }

    /// Returns the downward acceleration.
    #[must_use]
    pub const fn gravity(&self) -> f32 {
        self.gravity
    }

    fn player_mut(next: &mut Arena, id: EntityId) -> Option<&mut PlayerComponents> {
        next.get_mut(id)?.inner_mut().as_player_mut()
    }

    fn apply_command(next: &mut Arena, command: &Command) {
        match *command {
            Command::EngageLook { target } => {
                if let Some(player) = Self::player_mut(next, target) {
                    player.look.engaged = true;
                }
            }
            Command::SetLook { target, yaw, pitch } => {
                if let Some(player) = Self::player_mut(next, target) {
                    player.transform.yaw = yaw;
                    player.look.pitch = pitch;
                }
            }
            Command::SetHorizontalVelocity { target, velocity } => {
                if let Some(player) = Self::player_mut(next, target) {
                    player.body.horizontal_velocity = velocity;
                }
            }
            Command::ApplyImpulse {
                target,
                impulse,
                grounds_off,
            } => {
                if let Some(player) = Self::player_mut(next, target) {
                    player.body.apply_impulse(impulse);
                    if grounds_off {
                        player.body.grounded = false;
                    }
                }
            }
            // Navigation and magazine commands belong to other resolvers
            Command::SetDestination { .. }
            | Command::ConsumeRound { .. }
            | Command::Reload { .. } => {}
        }
    }

    /// Integrates one player. Returns the feet height before the move.
    fn integrate(&self, player: &mut PlayerComponents, dt: f32) -> f32 {
        let before = player.transform.position.y;
        if !player.body.grounded {
            player.body.vertical_velocity -= self.gravity * dt;
        }
        player.transform.position += player.body.velocity() * dt;
        player.body.knockback_velocity = Vec2::ZERO;
        before
    }

    /// Tops of `GROUND` boxes under a player's footprint, in id order.
    fn ground_tops(arena: &Arena, player_id: EntityId, player: &PlayerComponents) -> Vec<f32> {
        let (min, max) = player.collider.bounds_at(player.transform.position);
        let column_min = Vec3::new(min.x, f32::MIN, min.z);
        let column_max = Vec3::new(max.x, f32::MAX, max.z);
        arena
            .bounds()
            .query_box(column_min, column_max)
            .into_iter()
            .filter(|id| *id != player_id)
            .filter(|id| {
                arena
                    .get(*id)
                    .is_some_and(|e| e.classification().contains(Classification::GROUND))
            })
            .filter_map(|id| arena.bounds().get(id).map(|b| b.max.y))
            .collect()
    }

    /// Lands or drops one player. Returns the contact change, if any.
    fn resolve_ground(next: &mut Arena, id: EntityId, feet_before: f32) -> Option<ContactPhase> {
        let (tops, grounded, falling, feet) = {
            let player = next.get(id)?.inner().as_player()?;
            (
                Self::ground_tops(next, id, player),
                player.body.grounded,
                player.body.vertical_velocity <= 0.0,
                player.transform.position.y,
            )
        };

        if grounded {
            let supported = tops
                .iter()
                .any(|top| (feet - top).abs() <= GROUND_TOLERANCE);
            if supported {
                return None;
            }
            let player = Self::player_mut(next, id)?;
            player.body.on_contact(ContactEvent::ground_exit());
            return Some(ContactPhase::Exit);
        }

        if !falling {
            return None;
        }
        let landing = tops
            .into_iter()
            .filter(|top| feet <= top + GROUND_TOLERANCE && feet_before >= top - GROUND_TOLERANCE)
            .reduce(f32::max)?;

        let player = Self::player_mut(next, id)?;
        player.transform.position.y = landing;
        player.body.on_contact(ContactEvent::ground_enter());
        Some(ContactPhase::Enter)
    }
}

impl Default for PhysicsResolver {
    fn default() -> Self {
        Self::new(9.81)
    }
}

impl Resolver for PhysicsResolver {
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
        // Commands first, in sorted output order
        for envelope in outputs {
            if let Some(command) = envelope.output().as_command() {
                Self::apply_command(next, command);
            }
        }

        let players: Vec<EntityId> = next
            .entities_sorted()
            .filter(|e| e.is_player())
            .map(|e| e.id())
            .collect();

        let mut events = Vec::new();
        for id in players {
            let Some(player) = Self::player_mut(next, id) else {
                continue;
            };
            let feet_before = self.integrate(player, frame.dt);
            next.update_bounds(id);

            if self.ground_detection {
                if let Some(phase) = Self::resolve_ground(next, id, feet_before) {
                    next.update_bounds(id);
                    events.push(Event::GroundContact { entity: id, phase });
                }
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityInner, SceneryComponents};
    use crate::input::InputFrame;
    use crate::output::Output;
    use crate::resolver::test_support::envelopes;

    const DT: f32 = 0.1;

    fn frame() -> FrameContext {
        FrameContext::new(DT, InputFrame::IDLE)
    }

    fn spawn_player(arena: &mut Arena, position: Vec3, grounded: bool) -> EntityId {
        let mut player = PlayerComponents::default();
        player.transform.position = position;
        player.body.grounded = grounded;
        arena.spawn(Classification::PLAYER, EntityInner::Player(player))
    }

    fn spawn_floor(arena: &mut Arena) -> EntityId {
        arena.spawn(
            Classification::GROUND | Classification::SOLID,
            EntityInner::Scenery(SceneryComponents::cuboid(
                Vec3::new(0.0, -0.5, 0.0),
                Vec3::new(50.0, 0.5, 50.0),
            )),
        )
    }

    fn player(arena: &Arena, id: EntityId) -> &PlayerComponents {
        arena.get(id).unwrap().inner().as_player().unwrap()
    }

    fn run(
        resolver: &PhysicsResolver,
        arena: &mut Arena,
        outputs: Vec<Output>,
        source: EntityId,
    ) -> Vec<Event> {
        let envs = envelopes(source, outputs);
        let refs: Vec<&OutputEnvelope> = envs.iter().collect();
        let current = arena.clone();
        resolver.resolve(&frame(), &refs, &current, arena)
    }

    mod resolver_trait_tests {
        use super::*;

        #[test]
        fn handles_command_kind() {
            let resolver = PhysicsResolver::default();
            assert!(resolver.handles().contains(&OutputKind::Command));
            assert!(!resolver.handles().contains(&OutputKind::Modifier));
            assert!(!resolver.handles().contains(&OutputKind::Event));
        }

        #[test]
        fn gravity_is_configurable() {
            assert!((PhysicsResolver::new(1.62).gravity() - 1.62).abs() < f32::EPSILON);
        }
    }

    mod command_tests {
        use super::*;

        #[test]
        fn set_look_writes_yaw_and_pitch() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, Vec3::ZERO, true);
            let resolver = PhysicsResolver::new(0.0).with_ground_detection(false);

            run(
                &resolver,
                &mut arena,
                vec![
                    Output::Command(Command::EngageLook { target: id }),
                    Output::Command(Command::SetLook {
                        target: id,
                        yaw: 90.0,
                        pitch: -30.0,
                    }),
                ],
                id,
            );

            let p = player(&arena, id);
            assert!(p.look.engaged);
            assert!((p.transform.yaw - 90.0).abs() < f32::EPSILON);
            assert!((p.look.pitch + 30.0).abs() < f32::EPSILON);
        }

        #[test]
        fn horizontal_velocity_last_write_wins() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, Vec3::ZERO, true);
            let resolver = PhysicsResolver::new(0.0).with_ground_detection(false);

            run(
                &resolver,
                &mut arena,
                vec![
                    Output::Command(Command::SetHorizontalVelocity {
                        target: id,
                        velocity: Vec2::new(5.0, 0.0),
                    }),
                    Output::Command(Command::SetHorizontalVelocity {
                        target: id,
                        velocity: Vec2::new(0.0, 5.0),
                    }),
                ],
                id,
            );

            let p = player(&arena, id);
            assert_eq!(p.body.horizontal_velocity, Vec2::new(0.0, 5.0));
            assert!((p.transform.position.z - 0.5).abs() < 1e-5);
        }

        #[test]
        fn horizontal_velocity_leaves_vertical_alone() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, Vec3::ZERO, false);
            if let Some(p) = PhysicsResolver::player_mut(&mut arena, id) {
                p.body.vertical_velocity = 3.0;
            }
            let resolver = PhysicsResolver::new(0.0).with_ground_detection(false);

            run(
                &resolver,
                &mut arena,
                vec![Output::Command(Command::SetHorizontalVelocity {
                    target: id,
                    velocity: Vec2::new(1.0, 1.0),
                })],
                id,
            );

            assert!((player(&arena, id).body.vertical_velocity - 3.0).abs() < f32::EPSILON);
        }

        #[test]
        fn unknown_target_is_ignored() {
            let mut arena = Arena::new();
            let resolver = PhysicsResolver::default();
            let ghost = EntityId::new(999);
            let events = run(
                &resolver,
                &mut arena,
                vec![Output::Command(Command::SetLook {
                    target: ghost,
                    yaw: 1.0,
                    pitch: 1.0,
                })],
                ghost,
            );
            assert!(events.is_empty());
        }
    }

    mod impulse_tests {
        use super::*;

        #[test]
        fn jump_impulse_leaves_ground() {
            let mut arena = Arena::new();
            spawn_floor(&mut arena);
            let id = spawn_player(&mut arena, Vec3::ZERO, true);
            let resolver = PhysicsResolver::new(9.81);

            let events = run(
                &resolver,
                &mut arena,
                vec![Output::Command(Command::ApplyImpulse {
                    target: id,
                    impulse: Vec3::Y * 5.0,
                    grounds_off: true,
                })],
                id,
            );

            let p = player(&arena, id);
            assert!(!p.body.grounded);
            assert!((p.body.vertical_velocity - (5.0 - 9.81 * DT)).abs() < 1e-5);
            assert!(p.transform.position.y > 0.0);
            assert!(events.is_empty(), "jumping is not a contact exit");
        }

        #[test]
        fn impulse_scales_with_mass() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, Vec3::ZERO, true);
            if let Some(p) = PhysicsResolver::player_mut(&mut arena, id) {
                p.body.mass = 2.0;
            }
            let resolver = PhysicsResolver::new(0.0).with_ground_detection(false);

            run(
                &resolver,
                &mut arena,
                vec![Output::Command(Command::ApplyImpulse {
                    target: id,
                    impulse: Vec3::new(4.0, 0.0, 0.0),
                    grounds_off: false,
                })],
                id,
            );

            // Knockback of 2 m/s for one frame, then consumed
            let p = player(&arena, id);
            assert!((p.transform.position.x - 0.2).abs() < 1e-5);
            assert_eq!(p.body.knockback_velocity, Vec2::ZERO);
            assert!(p.body.grounded);
        }
    }

    mod integration_tests {
        use super::*;

        #[test]
        fn grounded_player_does_not_fall() {
            let mut arena = Arena::new();
            spawn_floor(&mut arena);
            let id = spawn_player(&mut arena, Vec3::ZERO, true);
            let resolver = PhysicsResolver::default();

            for _ in 0..10 {
                assert!(run(&resolver, &mut arena, vec![], id).is_empty());
            }
            let p = player(&arena, id);
            assert!(p.body.grounded);
            assert!(p.transform.position.y.abs() < f32::EPSILON);
        }

        #[test]
        fn airborne_player_accelerates_down() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, Vec3::new(0.0, 10.0, 0.0), false);
            let resolver = PhysicsResolver::new(10.0).with_ground_detection(false);

            run(&resolver, &mut arena, vec![], id);
            let p = player(&arena, id);
            assert!((p.body.vertical_velocity + 1.0).abs() < 1e-5);
            assert!((p.transform.position.y - 9.9).abs() < 1e-5);
        }

        #[test]
        fn bounds_follow_integration() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, Vec3::ZERO, true);
            let resolver = PhysicsResolver::new(0.0).with_ground_detection(false);

            run(
                &resolver,
                &mut arena,
                vec![Output::Command(Command::SetHorizontalVelocity {
                    target: id,
                    velocity: Vec2::new(10.0, 0.0),
                })],
                id,
            );

            let bounds = arena.bounds().get(id).unwrap();
            assert!((bounds.min.x - 0.5).abs() < 1e-5);
            assert!((bounds.max.x - 1.5).abs() < 1e-5);
        }
    }

    mod ground_contact_tests {
        use super::*;

        #[test]
        fn falling_player_lands_on_floor() {
            let mut arena = Arena::new();
            spawn_floor(&mut arena);
            let id = spawn_player(&mut arena, Vec3::new(0.0, 0.3, 0.0), false);
            if let Some(p) = PhysicsResolver::player_mut(&mut arena, id) {
                p.body.vertical_velocity = -5.0;
            }
            let resolver = PhysicsResolver::default();

            let events = run(&resolver, &mut arena, vec![], id);

            assert_eq!(
                events,
                vec![Event::GroundContact {
                    entity: id,
                    phase: ContactPhase::Enter,
                }]
            );
            let p = player(&arena, id);
            assert!(p.body.grounded);
            assert!(p.transform.position.y.abs() < f32::EPSILON);
            assert!(p.body.vertical_velocity.abs() < f32::EPSILON);
        }

        #[test]
        fn walking_off_edge_drops_contact() {
            let mut arena = Arena::new();
            spawn_floor(&mut arena);
            let id = spawn_player(&mut arena, Vec3::new(100.0, 0.0, 0.0), true);
            let resolver = PhysicsResolver::default();

            let events = run(&resolver, &mut arena, vec![], id);

            assert_eq!(
                events,
                vec![Event::GroundContact {
                    entity: id,
                    phase: ContactPhase::Exit,
                }]
            );
            assert!(!player(&arena, id).body.grounded);
        }

        #[test]
        fn non_ground_scenery_is_not_landed_on() {
            let mut arena = Arena::new();
            arena.spawn(
                Classification::SOLID,
                EntityInner::Scenery(SceneryComponents::cuboid(
                    Vec3::new(0.0, -0.5, 0.0),
                    Vec3::new(50.0, 0.5, 50.0),
                )),
            );
            let id = spawn_player(&mut arena, Vec3::new(0.0, 0.1, 0.0), false);
            let resolver = PhysicsResolver::default();

            for _ in 0..5 {
                run(&resolver, &mut arena, vec![], id);
            }
            assert!(!player(&arena, id).body.grounded);
            assert!(player(&arena, id).transform.position.y < 0.0);
        }

        #[test]
        fn jump_lands_back_on_floor() {
            let mut arena = Arena::new();
            spawn_floor(&mut arena);
            let id = spawn_player(&mut arena, Vec3::ZERO, true);
            let resolver = PhysicsResolver::default();

            run(
                &resolver,
                &mut arena,
                vec![Output::Command(Command::ApplyImpulse {
                    target: id,
                    impulse: Vec3::Y * 5.0,
                    grounds_off: true,
                })],
                id,
            );

            let mut landed = false;
            for _ in 0..30 {
                let events = run(&resolver, &mut arena, vec![], id);
                if events.contains(&Event::GroundContact {
                    entity: id,
                    phase: ContactPhase::Enter,
                }) {
                    landed = true;
                    break;
                }
            }
            assert!(landed);
            assert!(player(&arena, id).transform.position.y.abs() < f32::EPSILON);
        }

        #[test]
        fn detection_disabled_keeps_host_contact() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, Vec3::new(0.0, 5.0, 0.0), true);
            let resolver = PhysicsResolver::default().with_ground_detection(false);

            assert!(run(&resolver, &mut arena, vec![], id).is_empty());
            assert!(player(&arena, id).body.grounded);
        }
    }
}
