//! Core value types shared by every cockpit component.
//!
//! - [`VehicleState`] is the raw per-tick reading from the controller
//! - [`ActuatorTargets`] is what a tick asks the car to do
//! - [`Flag`] and [`SectorStatus`] are the race control codes
//! - [`PerWheel`] and [`WheelPosition`] address the four suspensions
//! - [`UpdateRate`] controls how often subscribers see tick outputs

mod actuators;
mod color;
mod flag;
mod update_rate;
mod vehicle;
mod wheel;

pub use actuators::{ActuatorTargets, KMH_PER_MS, LightTargets};
pub use color::{Color, LightState};
pub use flag::{Flag, SectorStatus};
pub use update_rate::UpdateRate;
pub use vehicle::VehicleState;
pub use wheel::{PerWheel, WheelPosition};
