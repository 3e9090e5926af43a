//! Wheel positions and per-wheel value containers

use serde::{Deserialize, Serialize};

/// Position of a wheel suspension on the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelPosition {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl WheelPosition {
    /// All four positions in a stable order.
    pub const ALL: [WheelPosition; 4] = [
        WheelPosition::FrontLeft,
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ];

    pub fn is_front(self) -> bool {
        matches!(self, WheelPosition::FrontLeft | WheelPosition::FrontRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, WheelPosition::FrontLeft | WheelPosition::RearLeft)
    }

    /// Short actuator label, e.g. `FL`.
    pub fn label(self) -> &'static str {
        match self {
            WheelPosition::FrontLeft => "FL",
            WheelPosition::FrontRight => "FR",
            WheelPosition::RearLeft => "RL",
            WheelPosition::RearRight => "RR",
        }
    }
}

/// One value per wheel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerWheel<T> {
    pub front_left: T,
    pub front_right: T,
    pub rear_left: T,
    pub rear_right: T,
}

impl<T: Copy> PerWheel<T> {
    /// Same value on every wheel.
    pub fn splat(value: T) -> Self {
        Self { front_left: value, front_right: value, rear_left: value, rear_right: value }
    }

    /// Separate values for the front and rear axle.
    pub fn per_axle(front: T, rear: T) -> Self {
        Self { front_left: front, front_right: front, rear_left: rear, rear_right: rear }
    }

    pub fn get(&self, position: WheelPosition) -> T {
        match position {
            WheelPosition::FrontLeft => self.front_left,
            WheelPosition::FrontRight => self.front_right,
            WheelPosition::RearLeft => self.rear_left,
            WheelPosition::RearRight => self.rear_right,
        }
    }

    pub fn set(&mut self, position: WheelPosition, value: T) {
        match position {
            WheelPosition::FrontLeft => self.front_left = value,
            WheelPosition::FrontRight => self.front_right = value,
            WheelPosition::RearLeft => self.rear_left = value,
            WheelPosition::RearRight => self.rear_right = value,
        }
    }

    /// Build a new set by applying `f` to each wheel with its position.
    pub fn map_with<U>(&self, mut f: impl FnMut(WheelPosition, T) -> U) -> PerWheel<U> {
        PerWheel {
            front_left: f(WheelPosition::FrontLeft, self.front_left),
            front_right: f(WheelPosition::FrontRight, self.front_right),
            rear_left: f(WheelPosition::RearLeft, self.rear_left),
            rear_right: f(WheelPosition::RearRight, self.rear_right),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (WheelPosition, T)> + '_ {
        WheelPosition::ALL.into_iter().map(move |pos| (pos, self.get(pos)))
    }
}
