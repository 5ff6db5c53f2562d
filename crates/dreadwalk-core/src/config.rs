//! Tuning and scene configuration.
//!
//! Configuration is plain serde data. Every struct has a `validate` method
//! that rejects values the simulation cannot run with; spawn functions call it
//! so invalid tuning never reaches the arena.
//!
//! # Example
//!
//! ```
//! use dreadwalk_core::config::PlayerConfig;
//!
//! let config: PlayerConfig = serde_json::from_str(r#"{"move_speed": 7.5}"#).unwrap();
//! assert_eq!(config.move_speed, 7.5);
//! assert_eq!(config.jump_impulse, 5.0);
//! assert!(config.validate().is_ok());
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::Classification;
use crate::error::ConfigError;
use crate::input::InputFrame;

pub(crate) fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

pub(crate) fn finite_vec(field: &'static str, value: Vec3) -> Result<(), ConfigError> {
    for component in value.to_array() {
        finite(field, component)?;
    }
    Ok(())
}

// =============================================================================
// Actor tuning
// =============================================================================

/// Magazine setup for the player's firearm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoConfig {
    /// Rounds in the magazine before the spawn top-up.
    #[serde(default)]
    pub loaded: u32,
    /// Magazine size.
    pub capacity: u32,
    /// Spare rounds carried.
    #[serde(default)]
    pub spare: u32,
}

/// Per-player tuning values, fixed at spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Ground speed in metres per second.
    pub move_speed: f32,
    /// Upward impulse applied on jump.
    pub jump_impulse: f32,
    /// Degrees of rotation per unit of pointer motion per second.
    pub mouse_sensitivity: f32,
    /// Maximum camera pitch either side of level, in degrees.
    pub vertical_look_limit: f32,
    /// Starting and maximum health.
    pub max_health: f32,
    /// Hit-scan reach in metres.
    pub trace_range: f32,
    /// Damage dealt by one hit-scan hit.
    pub trace_damage: f32,
    /// Magnitude of the push received when taking damage.
    pub knockback: f32,
    /// Body mass used by impulses.
    pub mass: f32,
    /// Height of the camera and muzzle above the feet.
    pub eye_height: f32,
    /// Magazine, or `None` for unlimited fire.
    pub ammo: Option<AmmoConfig>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_impulse: 5.0,
            mouse_sensitivity: 60.0,
            vertical_look_limit: 80.0,
            max_health: 10.0,
            trace_range: 100.0,
            trace_damage: 1.0,
            knockback: 10.0,
            mass: 1.0,
            eye_height: 1.6,
            ammo: None,
        }
    }
}

impl PlayerConfig {
    /// Checks every tuning value.
    ///
    /// # Errors
    ///
    /// Returns the first field that is non-finite, or out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("move_speed", self.move_speed)?;
        non_negative("jump_impulse", self.jump_impulse)?;
        non_negative("mouse_sensitivity", self.mouse_sensitivity)?;
        non_negative("vertical_look_limit", self.vertical_look_limit)?;
        positive("max_health", self.max_health)?;
        positive("trace_range", self.trace_range)?;
        non_negative("trace_damage", self.trace_damage)?;
        non_negative("knockback", self.knockback)?;
        positive("mass", self.mass)?;
        non_negative("eye_height", self.eye_height)?;
        Ok(())
    }
}

/// Per-pursuer tuning values, fixed at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuerConfig {
    /// Travel speed along the path in metres per second.
    pub move_speed: f32,
    /// Starting and maximum health.
    pub max_health: f32,
}

impl Default for PursuerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            max_health: 5.0,
        }
    }
}

impl PursuerConfig {
    /// Checks every tuning value.
    ///
    /// # Errors
    ///
    /// Returns the first field that is non-finite, or out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("move_speed", self.move_speed)?;
        positive("max_health", self.max_health)?;
        Ok(())
    }
}

// =============================================================================
// Simulation settings
// =============================================================================

/// World-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Downward acceleration in metres per second squared.
    pub gravity: f32,
    /// Seed mixed into output trace ids.
    pub trace_seed: u64,
    /// Derive ground contacts from `GROUND` scenery. Disable when the host
    /// reports contacts itself.
    pub ground_detection: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            trace_seed: 0,
            ground_detection: true,
        }
    }
}

impl SimulationConfig {
    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if gravity is negative or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("gravity", self.gravity)
    }
}

// =============================================================================
// Scene description
// =============================================================================

/// Player placement and tuning in a scene file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpawn {
    /// Feet position.
    pub position: Vec3,
    /// Initial yaw in degrees.
    pub yaw: f32,
    /// Tuning.
    pub config: PlayerConfig,
}

/// Pursuer placement and tuning in a scene file. Pursuers chase the scene's player.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuerSpawn {
    /// Feet position.
    pub position: Vec3,
    /// Tuning.
    pub config: PursuerConfig,
}

/// A static box in a scene file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenerySpawn {
    /// Box center.
    pub center: Vec3,
    /// Half size along each axis.
    pub half_extents: Vec3,
    /// Classification, e.g. `GROUND` or `SOLID`.
    pub classification: Classification,
}

/// A run of frames that all use the same input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputSegment {
    /// Number of frames this input is held for.
    pub frames: u32,
    /// The input sample.
    #[serde(default)]
    pub input: InputFrame,
}

/// A complete scene: world settings, actors, geometry, and scripted input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// World settings.
    pub simulation: SimulationConfig,
    /// The player.
    pub player: PlayerSpawn,
    /// Enemies chasing the player.
    pub pursuers: Vec<PursuerSpawn>,
    /// Floors and walls.
    pub scenery: Vec<ScenerySpawn>,
    /// Input played back frame by frame; idle once exhausted.
    pub input: Vec<InputSegment>,
}

impl SceneConfig {
    /// Parses and validates a JSON scene.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON, or the first invalid
    /// tuning value.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let scene: Self = serde_json::from_str(text)?;
        scene.validate()?;
        Ok(scene)
    }

    /// Checks every nested configuration.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        finite_vec("player.position", self.player.position)?;
        finite("player.yaw", self.player.yaw)?;
        self.player.config.validate()?;
        for pursuer in &self.pursuers {
            finite_vec("pursuer.position", pursuer.position)?;
            pursuer.config.validate()?;
        }
        for scenery in &self.scenery {
            finite_vec("scenery.center", scenery.center)?;
            for extent in scenery.half_extents.to_array() {
                positive("scenery.half_extents", extent)?;
            }
        }
        Ok(())
    }

    /// Input for frame `index`, or idle input past the end of the script.
    #[must_use]
    pub fn input_at(&self, index: u64) -> InputFrame {
        let mut remaining = index;
        for segment in &self.input {
            let len = u64::from(segment.frames);
            if remaining < len {
                return segment.input;
            }
            remaining -= len;
        }
        InputFrame::IDLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod player_config_tests {
        use super::*;

        #[test]
        fn defaults_are_valid() {
            assert!(PlayerConfig::default().validate().is_ok());
            assert!(PursuerConfig::default().validate().is_ok());
            assert!(SimulationConfig::default().validate().is_ok());
        }

        #[test]
        fn rejects_non_positive_mass() {
            let config = PlayerConfig {
                mass: 0.0,
                ..PlayerConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::NonPositive { field: "mass", .. })
            ));
        }

        #[test]
        fn rejects_nan_speed() {
            let config = PlayerConfig {
                move_speed: f32::NAN,
                ..PlayerConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::NonFinite {
                    field: "move_speed",
                    ..
                })
            ));
        }

        #[test]
        fn rejects_negative_knockback() {
            let config = PlayerConfig {
                knockback: -1.0,
                ..PlayerConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Negative {
                    field: "knockback",
                    ..
                })
            ));
        }

        #[test]
        fn json_roundtrip_preserves_ammo() {
            let config = PlayerConfig {
                ammo: Some(AmmoConfig {
                    loaded: 3,
                    capacity: 12,
                    spare: 24,
                }),
                ..PlayerConfig::default()
            };
            let json = serde_json::to_string(&config).unwrap();
            let back: PlayerConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(config, back);
        }
    }

    mod scene_tests {
        use super::*;

        const SCENE: &str = r#"{
            "simulation": { "gravity": 9.81, "trace_seed": 7 },
            "player": { "position": [0.0, 0.0, 0.0], "yaw": 0.0 },
            "pursuers": [ { "position": [0.0, 0.0, 10.0] } ],
            "scenery": [
                { "center": [0.0, -0.5, 0.0], "half_extents": [50.0, 0.5, 50.0],
                  "classification": "GROUND | SOLID" }
            ],
            "input": [
                { "frames": 2, "input": { "vertical": 1.0 } },
                { "frames": 1, "input": { "fire_pressed": true } }
            ]
        }"#;

        #[test]
        fn parses_full_scene() {
            let scene = SceneConfig::from_json(SCENE).unwrap();
            assert_eq!(scene.simulation.trace_seed, 7);
            assert_eq!(scene.pursuers.len(), 1);
            assert_eq!(scene.pursuers[0].config, PursuerConfig::default());
            assert_eq!(
                scene.scenery[0].classification,
                Classification::GROUND | Classification::SOLID
            );
        }

        #[test]
        fn input_script_plays_back_then_idles() {
            let scene = SceneConfig::from_json(SCENE).unwrap();
            assert_eq!(scene.input_at(0).vertical, 1.0);
            assert_eq!(scene.input_at(1).vertical, 1.0);
            assert!(scene.input_at(2).fire_pressed);
            assert_eq!(scene.input_at(3), InputFrame::IDLE);
        }

        #[test]
        fn malformed_json_is_a_parse_error() {
            assert!(matches!(
                SceneConfig::from_json("{ not json"),
                Err(ConfigError::Parse(_))
            ));
        }

        #[test]
        fn invalid_nested_value_is_rejected() {
            let mut scene = SceneConfig::default();
            scene.pursuers.push(PursuerSpawn {
                position: Vec3::ZERO,
                config: PursuerConfig {
                    max_health: 0.0,
                    ..PursuerConfig::default()
                },
            });
            assert!(scene.validate().is_err());
        }
    }
}
