//! Light colours and light actuator state

use serde::{Deserialize, Serialize};

/// 8-bit RGB colour.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Target state for a group of lights.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    pub color: Color,
    pub enabled: bool,
    /// Blink interval in seconds, 0 for steady.
    pub blink_interval: f32,
}

impl LightState {
    pub fn steady(color: Color) -> Self {
        Self { color, enabled: true, blink_interval: 0.0 }
    }

    pub fn blinking(color: Color, interval: f32) -> Self {
        Self { color, enabled: true, blink_interval: interval }
    }

    pub fn off() -> Self {
        Self { color: Color::BLACK, enabled: false, blink_interval: 0.0 }
    }

    pub fn is_blinking(&self) -> bool {
        self.blink_interval > 0.0
    }
}
