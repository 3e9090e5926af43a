//! Per-tick vehicle readings supplied by the controller and physics engine

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Raw vehicle state sampled once per tick.
///
/// The move indicator follows the controller convention: `z < 0` is
/// throttle, `z > 0` is brake/reverse, `y > 0` is the brake key, `x` steers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Ground speed in m/s.
    pub speed: f32,
    /// World-space up vector of the car body.
    pub up: Vector3<f32>,
    /// Natural gravity vector at the car position.
    pub gravity: Vector3<f32>,
    /// World-space position, used for mirror proximity.
    pub position: Vector3<f32>,
    pub move_indicator: Vector3<f32>,
    pub handbrake: bool,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            speed: 0.0,
            up: Vector3::y(),
            gravity: Vector3::new(0.0, -9.81, 0.0),
            position: Vector3::zeros(),
            move_indicator: Vector3::zeros(),
            handbrake: false,
        }
    }
}

impl VehicleState {
    pub fn is_throttle(&self) -> bool {
        self.move_indicator.z < 0.0
    }

    /// Any braking input: brake axis, reverse throttle or handbrake.
    pub fn is_braking(&self) -> bool {
        self.move_indicator.z > 0.0 || self.move_indicator.y > 0.0 || self.handbrake
    }

    /// The car is upside down when its up vector points along gravity.
    pub fn is_inverted(&self) -> bool {
        self.gravity.dot(&self.up) > 0.0
    }
}
