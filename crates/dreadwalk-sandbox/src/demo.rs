//! Built-in scene used when no scene file is given.

use dreadwalk_core::config::{
    AmmoConfig, InputSegment, PlayerSpawn, PursuerSpawn, ScenerySpawn,
};
use dreadwalk_core::{Classification, InputFrame, PlayerConfig, PursuerConfig, SceneConfig};
use glam::Vec3;

/// A walled corridor: two pursuers ahead, a slower one behind, and a script
/// that turns, shoots, reloads and backs away.
pub fn scene() -> SceneConfig {
    let wall = Classification::SOLID;
    let floor = Classification::GROUND | Classification::SOLID;

    let mut input = vec![InputSegment {
        frames: 10,
        input: InputFrame::IDLE,
    }];
    // Eight shots down the corridor, one every quarter second
    for _ in 0..8 {
        input.push(InputSegment {
            frames: 1,
            input: InputFrame::IDLE.with_fire(),
        });
        input.push(InputSegment {
            frames: 14,
            input: InputFrame::walk(0.0, -0.5),
        });
    }
    input.extend([
        InputSegment {
            frames: 1,
            input: InputFrame::IDLE.with_reload(),
        },
        // Half a turn at 60 deg/s
        InputSegment {
            frames: 180,
            input: InputFrame::look(1.0, 0.0),
        },
        InputSegment {
            frames: 1,
            input: InputFrame::IDLE.with_jump(),
        },
    ]);
    for _ in 0..6 {
        input.push(InputSegment {
            frames: 1,
            input: InputFrame::IDLE.with_fire(),
        });
        input.push(InputSegment {
            frames: 9,
            input: InputFrame::IDLE,
        });
    }

    SceneConfig {
        player: PlayerSpawn {
            position: Vec3::ZERO,
            yaw: 0.0,
            config: PlayerConfig {
                ammo: Some(AmmoConfig {
                    loaded: 0,
                    capacity: 8,
                    spare: 24,
                }),
                ..PlayerConfig::default()
            },
        },
        pursuers: vec![
            PursuerSpawn {
                position: Vec3::new(0.0, 0.0, 14.0),
                config: PursuerConfig::default(),
            },
            PursuerSpawn {
                position: Vec3::new(1.0, 0.0, 22.0),
                config: PursuerConfig {
                    move_speed: 3.0,
                    max_health: 3.0,
                },
            },
            PursuerSpawn {
                position: Vec3::new(0.0, 0.0, -25.0),
                config: PursuerConfig {
                    move_speed: 1.5,
                    ..PursuerConfig::default()
                },
            },
        ],
        scenery: vec![
            ScenerySpawn {
                center: Vec3::new(0.0, -0.5, 0.0),
                half_extents: Vec3::new(4.0, 0.5, 60.0),
                classification: floor,
            },
            ScenerySpawn {
                center: Vec3::new(-4.5, 2.0, 0.0),
                half_extents: Vec3::new(0.5, 2.0, 60.0),
                classification: wall,
            },
            ScenerySpawn {
                center: Vec3::new(4.5, 2.0, 0.0),
                half_extents: Vec3::new(0.5, 2.0, 60.0),
                classification: wall,
            },
        ],
        input,
        ..SceneConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scene_is_valid() {
        assert!(scene().validate().is_ok());
    }

    #[test]
    fn demo_scene_survives_json() {
        let text = serde_json::to_string(&scene()).unwrap();
        assert_eq!(SceneConfig::from_json(&text).unwrap(), scene());
    }

    #[test]
    fn script_opens_idle_then_fires() {
        let scene = scene();
        assert_eq!(scene.input_at(0), InputFrame::IDLE);
        assert!(scene.input_at(10).fire_pressed);
        assert!(!scene.input_at(11).fire_pressed);
    }
}
