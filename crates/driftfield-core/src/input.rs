//! Abstract control input.
//!
//! The kernel never talks to devices. Keyboards, touch sticks, and scripted
//! drivers all implement [`InputSource`]; [`InputState`] is the plain-data
//! implementation used by tests and headless drivers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Direction vectors at or below this magnitude are treated as absent.
pub const DIRECT_INPUT_THRESHOLD: f32 = 0.01;

/// Control signals sampled once per tick.
pub trait InputSource {
    /// Thrust axis in `[-1, 1]`.
    fn forward_axis(&self) -> f32;

    /// Turn axis in `[-1, 1]`. Positive turns counter-clockwise.
    fn rotation_axis(&self) -> f32;

    /// Optional direct steering vector.
    fn direction(&self) -> Option<Vec2>;

    /// Continuous fire signal, true for as long as the trigger is held.
    fn fire_held(&self) -> bool;

    /// Edge-triggered fire signal, true only on the tick it was pressed.
    fn fire_pressed(&self) -> bool;

    /// The direct steering vector if it is strong enough to override the axes.
    fn steering(&self) -> Option<Vec2> {
        self.direction()
            .filter(|dir| dir.length() > DIRECT_INPUT_THRESHOLD)
    }
}

/// Input snapshot as plain data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    /// Thrust axis
    pub forward: f32,
    /// Turn axis
    pub rotation: f32,
    /// Direct steering vector
    pub direction: Option<Vec2>,
    /// Trigger held
    pub fire_held: bool,
    /// Trigger pressed this tick
    pub fire_pressed: bool,
}

impl InputState {
    /// No input at all.
    pub const IDLE: Self = Self {
        forward: 0.0,
        rotation: 0.0,
        direction: None,
        fire_held: false,
        fire_pressed: false,
    };
}

impl InputSource for InputState {
    fn forward_axis(&self) -> f32 {
        self.forward.clamp(-1.0, 1.0)
    }

    fn rotation_axis(&self) -> f32 {
        self.rotation.clamp(-1.0, 1.0)
    }

    fn direction(&self) -> Option<Vec2> {
        self.direction
    }

    fn fire_held(&self) -> bool {
        self.fire_held
    }

    fn fire_pressed(&self) -> bool {
        self.fire_pressed
    }
}
