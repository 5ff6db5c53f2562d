//! Per-frame input sampling.
//!
//! The host exposes its device state through [`InputSource`]; the simulation
//! only ever sees the [`InputFrame`] sampled from it once at the start of a
//! frame, so every plugin in a frame reads the same values.

use serde::{Deserialize, Serialize};

/// Analog input axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Strafe axis, positive to the right. Expected in `[-1, 1]`.
    Horizontal,
    /// Walk axis, positive forward. Expected in `[-1, 1]`.
    Vertical,
    /// Pointer motion along x since the last frame.
    MouseX,
    /// Pointer motion along y since the last frame, positive up.
    MouseY,
}

/// Edge-triggered buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    /// Jump request.
    Jump,
    /// Fire request.
    Fire,
    /// Reload request.
    Reload,
}

/// Source of device state, implemented by the host.
///
/// `pressed` reports the press edge for this frame, not the held state.
pub trait InputSource {
    /// Current value of an analog axis.
    fn axis(&self, axis: Axis) -> f32;

    /// True if the button went down this frame.
    fn pressed(&self, button: Button) -> bool;
}

/// One frame of sampled input.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFrame {
    /// Strafe axis, positive right.
    pub horizontal: f32,
    /// Walk axis, positive forward.
    pub vertical: f32,
    /// Pointer delta x.
    pub mouse_dx: f32,
    /// Pointer delta y, positive up.
    pub mouse_dy: f32,
    /// Jump edge.
    pub jump_pressed: bool,
    /// Fire edge.
    pub fire_pressed: bool,
    /// Reload edge.
    pub reload_pressed: bool,
}

impl InputFrame {
    /// Input with every axis at rest and no buttons pressed.
    pub const IDLE: Self = Self {
        horizontal: 0.0,
        vertical: 0.0,
        mouse_dx: 0.0,
        mouse_dy: 0.0,
        jump_pressed: false,
        fire_pressed: false,
        reload_pressed: false,
    };

    /// Samples every axis and button from `source` once.
    ///
    /// Non-finite axis readings are treated as zero.
    #[must_use]
    pub fn sample(source: &impl InputSource) -> Self {
        let axis = |a| {
            let value = source.axis(a);
            if value.is_finite() {
                value
            } else {
                0.0
            }
        };
        Self {
            horizontal: axis(Axis::Horizontal),
            vertical: axis(Axis::Vertical),
            mouse_dx: axis(Axis::MouseX),
            mouse_dy: axis(Axis::MouseY),
            jump_pressed: source.pressed(Button::Jump),
            fire_pressed: source.pressed(Button::Fire),
            reload_pressed: source.pressed(Button::Reload),
        }
    }

    /// Walk input only.
    #[must_use]
    pub const fn walk(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
            ..Self::IDLE
        }
    }

    /// Pointer motion only.
    #[must_use]
    pub const fn look(mouse_dx: f32, mouse_dy: f32) -> Self {
        Self {
            mouse_dx,
            mouse_dy,
            ..Self::IDLE
        }
    }

    /// Returns a copy with the jump edge set.
    #[must_use]
    pub const fn with_jump(mut self) -> Self {
        self.jump_pressed = true;
        self
    }

    /// Returns a copy with the fire edge set.
    #[must_use]
    pub const fn with_fire(mut self) -> Self {
        self.fire_pressed = true;
        self
    }

    /// Returns a copy with the reload edge set.
    #[must_use]
    pub const fn with_reload(mut self) -> Self {
        self.reload_pressed = true;
        self
    }
}
