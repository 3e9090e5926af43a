//! Actuator targets produced by a tick
//!
//! The cockpit holds no actuator handles. Each tick it fills an
//! [`ActuatorTargets`] value and the wiring layer applies it to the blocks.

use serde::{Deserialize, Serialize};

use super::{LightState, PerWheel, WheelPosition};

/// km/h per m/s; suspension speed limits are set in km/h.
pub const KMH_PER_MS: f32 = 3.6;

/// Light group targets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightTargets {
    pub drs: LightState,
    pub ers: LightState,
    /// Brakelights and tyre indicator lights share the compound colour.
    pub brake: LightState,
}

/// Everything the car should be doing after this tick.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorTargets {
    /// Suspension strength per wheel, 0..=100.
    pub strength: PerWheel<f32>,
    /// Suspension power, 0..=100.
    pub power: f32,
    /// Suspension speed limit in m/s.
    pub speed_limit: f32,
    /// Suspension friction, 0..=100.
    pub friction: f32,
    /// Propulsion override per wheel. Left wheels carry `+v`, right wheels `-v`
    /// because mirrored suspensions spin the opposite way.
    pub propulsion_override: PerWheel<f32>,
    pub handbrake: bool,
    pub gyro_override: bool,
    /// One-shot: wheel to detach this tick after a tyre blow-out.
    pub detach_wheel: Option<WheelPosition>,
    /// One-shot: re-add all wheel tops after a compound change.
    pub reattach_wheels: bool,
    pub lights: LightTargets,
}

impl ActuatorTargets {
    /// Speed limit in the km/h unit the suspension consumes.
    pub fn speed_limit_kmh(&self) -> f32 {
        self.speed_limit * KMH_PER_MS
    }

    /// Apply the same propulsion override to every wheel with the left/right
    /// sign convention.
    pub fn set_propulsion(&mut self, value: f32) {
        self.propulsion_override =
            PerWheel::splat(value).map_with(|pos, v| if pos.is_left() { v } else { -v });
    }

    /// Clear the one-shot commands before a new tick.
    pub(crate) fn begin_tick(&mut self) {
        self.detach_wheel = None;
        self.reattach_wheels = false;
    }
}
