//! Driver assists: DRS, ERS, pit limiter, flag overrides and flip recovery
//!
//! The modes are independent flags rather than one state enum because they
//! combine freely. Each stage reads the vehicle and writes into the shared
//! [`ActuatorTargets`]; stages run in a fixed order so later ones override
//! earlier ones:
//!
//! ```text
//! DRS -> ERS -> flag -> pit limiter -> (drafting) -> resolve power/limit
//! ```
//!
//! Wheel power and speed limit are settled by a single priority function
//! once every mode is known for the tick:
//!
//! | mode              | power | speed limit |
//! |-------------------|-------|-------------|
//! | pit limiter       | 20    | 26          |
//! | yellow flag       |       | 45          |
//! | drafting          | 100   | 999         |
//! | ERS               | 100   | 97          |
//! | default           | 80    | 95          |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ErsConfig, SuspensionConfig};
use crate::{ActuatorTargets, Color, Flag, LightState, PerWheel, VehicleState};

/// Suspension strength change per second while DRS opens or closes.
pub const DRS_RAMP_RATE: f32 = 150.0;
/// Strength with DRS fully open.
pub const MAX_STRENGTH: f32 = 100.0;

/// ERS charge regained per second at reference speed.
pub const ERS_RECHARGE_RATE: f32 = 1.0 / 135.0;
/// ERS charge spent per second of boost.
pub const ERS_DISCHARGE_RATE: f32 = 1.0 / 45.0;
/// Speed (m/s) below which ERS neither charges nor discharges.
pub const ERS_MIN_SPEED: f32 = 1.0;
pub const ERS_LIGHT_BLINK: f32 = 0.5;

pub const PIT_POWER: f32 = 20.0;
pub const PIT_SPEED_LIMIT: f32 = 26.0;
/// The pit limiter holds the handbrake above this speed.
pub const PIT_HANDBRAKE_SPEED: f32 = 24.0;

pub const BOOST_POWER: f32 = 100.0;
pub const DRAFTING_SPEED_LIMIT: f32 = 999.0;
pub const ERS_SPEED_LIMIT: f32 = 97.0;

/// Speed cap applied by the yellow flag stage.
pub const YELLOW_FLAG_LIMIT: f32 = 50.0;
/// Speed cap once wheel limits are resolved under a yellow flag.
pub const YELLOW_SPEED_LIMIT: f32 = 45.0;
/// A yellow flag holds the handbrake above this speed.
pub const YELLOW_HANDBRAKE_SPEED: f32 = 50.0;

/// Wheel power for the current modes.
pub fn wheel_power(pit_limiter: bool, drafting: bool, ers: bool, default_power: f32) -> f32 {
    if pit_limiter {
        PIT_POWER
    } else if drafting || ers {
        BOOST_POWER
    } else {
        default_power
    }
}

/// Wheel speed limit (m/s) for the current modes.
pub fn wheel_speed_limit(
    pit_limiter: bool,
    flag: Flag,
    drafting: bool,
    ers: bool,
    default_limit: f32,
) -> f32 {
    if pit_limiter {
        PIT_SPEED_LIMIT
    } else if flag == Flag::Yellow {
        YELLOW_SPEED_LIMIT
    } else if drafting {
        DRAFTING_SPEED_LIMIT
    } else if ers {
        ERS_SPEED_LIMIT
    } else {
        default_limit
    }
}

/// Flip recovery progress.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipRecovery {
    #[default]
    Disarmed,
    /// Waiting for the car to be upside down.
    Armed,
    /// Gyros are overriding to roll the car back.
    Overriding,
}

/// Mode flags and per-mode state owned by the cockpit.
#[derive(Debug, Clone)]
pub struct AssistState {
    pub pit_limiter: bool,
    pub drs: bool,
    pub ers: bool,
    pub drafting: bool,
    ers_charge: f32,
    strength: PerWheel<f32>,
    flip: FlipRecovery,
    strength_floor: PerWheel<f32>,
    default_power: f32,
    default_speed_limit: f32,
    propulsion_override: f32,
}

impl AssistState {
    pub fn new(suspension: &SuspensionConfig, ers: &ErsConfig, ers_charge: f32) -> Self {
        let strength_floor =
            PerWheel::per_axle(suspension.default_strength_front, suspension.default_strength_rear);
        Self {
            pit_limiter: false,
            drs: false,
            ers: false,
            drafting: false,
            ers_charge: if ers_charge.is_finite() { ers_charge.clamp(0.0, 1.0) } else { 1.0 },
            strength: strength_floor,
            flip: FlipRecovery::Disarmed,
            strength_floor,
            default_power: suspension.default_power,
            default_speed_limit: suspension.default_speed_limit,
            propulsion_override: ers.propulsion_override,
        }
    }

    pub fn ers_charge(&self) -> f32 {
        self.ers_charge
    }

    pub fn strength(&self) -> PerWheel<f32> {
        self.strength
    }

    pub fn flip(&self) -> FlipRecovery {
        self.flip
    }

    pub fn default_speed_limit(&self) -> f32 {
        self.default_speed_limit
    }

    /// Arm flip recovery. An override already in progress keeps going.
    pub fn arm_flip(&mut self) {
        if self.flip == FlipRecovery::Disarmed {
            self.flip = FlipRecovery::Armed;
            debug!("Flip recovery armed");
        }
    }

    /// DRS closes on any braking input; strength ramps toward the target.
    pub fn update_drs(&mut self, vehicle: &VehicleState, delta: f32, targets: &mut ActuatorTargets) {
        if self.drs && (vehicle.is_braking() || targets.handbrake) {
            self.drs = false;
            debug!("DRS closed by braking");
        }

        let rate = (if self.drs { DRS_RAMP_RATE } else { -DRS_RAMP_RATE }) * delta;
        let floor = self.strength_floor;
        self.strength = self
            .strength
            .map_with(|pos, strength| (strength + rate).clamp(floor.get(pos), MAX_STRENGTH));

        targets.strength = self.strength;
        targets.lights.drs = self.drs_light();
    }

    /// Charge or spend ERS, then apply boost power and propulsion.
    pub fn update_ers(
        &mut self,
        vehicle: &VehicleState,
        flag: Flag,
        delta: f32,
        targets: &mut ActuatorTargets,
    ) {
        if self.pit_limiter && self.ers {
            self.ers = false;
            debug!("ERS disabled by pit limiter");
        }

        let throttle = vehicle.is_throttle();

        if vehicle.speed >= ERS_MIN_SPEED {
            if !self.ers || !throttle {
                let factor = (vehicle.speed / self.default_speed_limit).clamp(0.0, 1.0);
                self.ers_charge += ERS_RECHARGE_RATE * factor * delta;
            } else {
                self.ers_charge -= ERS_DISCHARGE_RATE * delta;
            }
        }

        self.ers_charge = self.ers_charge.clamp(0.0, 1.0);
        if self.ers && self.ers_charge <= 0.0 {
            self.ers = false;
            debug!("ERS depleted");
        }

        self.resolve_wheels(flag, targets);
        targets.set_propulsion(if self.ers && throttle { self.propulsion_override } else { 0.0 });
        targets.lights.ers = self.ers_light();
    }

    /// Race control overrides.
    pub fn apply_flag(&mut self, flag: Flag, vehicle: &VehicleState, targets: &mut ActuatorTargets) {
        match flag {
            Flag::Yellow => {
                self.force_drs_ers_off(targets);
                targets.handbrake = vehicle.speed > YELLOW_HANDBRAKE_SPEED;
                targets.speed_limit = YELLOW_FLAG_LIMIT;
            }
            Flag::Red => {
                self.force_drs_ers_off(targets);
                if self.pit_limiter {
                    self.pit_limiter = false;
                    debug!("Pit limiter released by red flag");
                }
                targets.handbrake = true;
            }
            Flag::Green | Flag::Blue => {
                if !self.pit_limiter {
                    targets.handbrake = false;
                    targets.speed_limit = self.default_speed_limit;
                }
            }
        }
    }

    /// Pit lane power and speed cap.
    pub fn update_pit_limiter(&mut self, vehicle: &VehicleState, targets: &mut ActuatorTargets) {
        if !self.pit_limiter {
            targets.power = self.default_power;
            targets.speed_limit = self.default_speed_limit;
            return;
        }

        targets.power = PIT_POWER;
        targets.speed_limit = PIT_SPEED_LIMIT;
        targets.handbrake = vehicle.speed > PIT_HANDBRAKE_SPEED;
    }

    /// Settle wheel power and speed limit from every mode.
    pub fn resolve_wheels(&self, flag: Flag, targets: &mut ActuatorTargets) {
        targets.power = wheel_power(self.pit_limiter, self.drafting, self.ers, self.default_power);
        targets.speed_limit = wheel_speed_limit(
            self.pit_limiter,
            flag,
            self.drafting,
            self.ers,
            self.default_speed_limit,
        );
    }

    /// Gyro override while armed and upside down.
    pub fn update_flip(&mut self, vehicle: &VehicleState, targets: &mut ActuatorTargets) {
        match self.flip {
            FlipRecovery::Disarmed => {}
            FlipRecovery::Armed | FlipRecovery::Overriding if vehicle.is_inverted() => {
                if self.flip == FlipRecovery::Armed {
                    debug!("Flip recovery engaged");
                }
                self.flip = FlipRecovery::Overriding;
                targets.gyro_override = true;
            }
            FlipRecovery::Overriding => {
                self.flip = FlipRecovery::Disarmed;
                targets.gyro_override = false;
                debug!("Flip recovery complete");
            }
            FlipRecovery::Armed => {}
        }
    }

    fn force_drs_ers_off(&mut self, targets: &mut ActuatorTargets) {
        if self.drs || self.ers {
            debug!(drs = self.drs, ers = self.ers, "DRS and ERS disabled by flag");
        }
        self.drs = false;
        self.ers = false;
        targets.set_propulsion(0.0);
        targets.lights.drs = self.drs_light();
        targets.lights.ers = self.ers_light();
    }

    fn drs_light(&self) -> LightState {
        if self.drs { LightState::steady(Color::BLUE) } else { LightState::off() }
    }

    fn ers_light(&self) -> LightState {
        LightState::blinking(if self.ers { Color::CYAN } else { Color::BLACK }, ERS_LIGHT_BLINK)
    }
}
