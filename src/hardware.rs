//! Startup hardware inventory
//!
//! The wiring layer enumerates the blocks on the car and reports what it found.
//! A cockpit refuses to boot without the parts every tick depends on.

use serde::{Deserialize, Serialize};

use crate::{CockpitError, Result};

/// Suspensions a car must have, one per corner.
pub const REQUIRED_SUSPENSIONS: usize = 4;

/// Blocks found on the car at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareInventory {
    pub controller: bool,
    pub suspensions: usize,
    pub brakelights: usize,
    pub gyros: usize,
    pub antenna: bool,
    pub drafting_sensor: bool,
    pub mirror_left: bool,
    pub mirror_right: bool,
    pub drs_lights: usize,
    pub ers_lights: usize,
}

impl HardwareInventory {
    /// A fully equipped car.
    pub fn complete() -> Self {
        Self {
            controller: true,
            suspensions: REQUIRED_SUSPENSIONS,
            brakelights: 2,
            gyros: 1,
            antenna: true,
            drafting_sensor: true,
            mirror_left: true,
            mirror_right: true,
            drs_lights: 1,
            ers_lights: 1,
        }
    }

    /// Check required parts. Sensors and light groups are optional.
    pub fn validate(&self) -> Result<()> {
        if !self.controller {
            return Err(CockpitError::missing_hardware("main cockpit controller"));
        }
        if self.suspensions != REQUIRED_SUSPENSIONS {
            return Err(CockpitError::missing_hardware(format!(
                "{REQUIRED_SUSPENSIONS} wheel suspensions (found {})",
                self.suspensions
            )));
        }
        if self.brakelights == 0 {
            return Err(CockpitError::missing_hardware("brakelight group"));
        }
        if self.gyros == 0 {
            return Err(CockpitError::missing_hardware("gyroscope"));
        }
        if !self.antenna {
            return Err(CockpitError::missing_hardware("antenna"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_car_validates() {
        assert!(HardwareInventory::complete().validate().is_ok());
    }

    #[test]
    fn optional_parts_may_be_missing() {
        let inventory = HardwareInventory {
            drafting_sensor: false,
            mirror_left: false,
            mirror_right: false,
            drs_lights: 0,
            ers_lights: 0,
            ..HardwareInventory::complete()
        };
        assert!(inventory.validate().is_ok());
    }

    #[test]
    fn missing_required_parts_are_fatal() {
        let broken = [
            HardwareInventory { controller: false, ..HardwareInventory::complete() },
            HardwareInventory { suspensions: 3, ..HardwareInventory::complete() },
            HardwareInventory { suspensions: 6, ..HardwareInventory::complete() },
            HardwareInventory { brakelights: 0, ..HardwareInventory::complete() },
            HardwareInventory { gyros: 0, ..HardwareInventory::complete() },
            HardwareInventory { antenna: false, ..HardwareInventory::complete() },
        ];
        for inventory in broken {
            let err = inventory.validate().unwrap_err();
            assert!(matches!(err, CockpitError::MissingHardware { .. }));
            assert!(err.is_fatal());
        }
    }
}
