//! Onboard control core for a multiplayer race car.
//!
//! Every tick the cockpit turns controller readings into actuator targets:
//! suspension strength, power, speed limit and friction, propulsion override,
//! handbrake, gyro override and light states. Along the way it runs the
//! driver assists, wears the tyres, steps the weather and keeps in touch with
//! race control.
//!
//! # Features
//!
//! - **Assists**: DRS, ERS, pit limiter, race flag overrides, flip recovery
//! - **Tyres**: seven compounds, weather dependent wear and grip, blow-outs
//! - **Race control**: address discovery, standings, remote commands
//! - **Deterministic**: seedable randomness, injected clock and peripherals
//!
//! # Quick Start
//!
//! ```rust
//! use cockpit::race::{Message, MessageChannel, PeerAddress};
//! use cockpit::{Cockpit, CockpitConfig, HardwareInventory, MemoryStore, Peripherals, TickInput};
//! use std::time::Instant;
//!
//! struct Offline;
//!
//! impl MessageChannel for Offline {
//!     fn own_id(&self) -> i64 { 1 }
//!     fn poll_unicast(&mut self) -> Vec<Message> { Vec::new() }
//!     fn poll_broadcast(&mut self) -> Vec<Message> { Vec::new() }
//!     fn send_unicast(&mut self, _to: PeerAddress, _message: Message) {}
//! }
//!
//! let mut store = MemoryStore::default();
//! let mut cockpit = Cockpit::boot(CockpitConfig::default(), &HardwareInventory::complete(), &store);
//!
//! let mut channel = Offline;
//! let mut io = Peripherals::new(&mut channel, &mut store);
//! let output = cockpit.tick(Instant::now(), &TickInput::default(), &mut io).unwrap();
//!
//! assert_eq!(output.targets.power, 80.0);
//! assert_eq!(output.hud_text, "P0");
//! ```

// Core types and error handling
pub mod config;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Car components
pub mod assist;
pub mod command;
pub mod drafting;
pub mod hardware;
pub mod persist;
pub mod race;
pub mod tyre;
pub mod weather;

// Orchestration
pub mod clock;
pub mod cockpit;
pub mod driver;

// Core exports
pub use config::CockpitConfig;
pub use error::*;
pub use types::*;

// Main API exports
pub use cockpit::{Cockpit, Dashboard, Peripherals, TickInput, TickOutput};
pub use driver::{CarBus, Driver, DriverChannels};
pub use hardware::HardwareInventory;
pub use persist::{MemoryStore, StateStore};
pub use tyre::TyreCompound;
pub use weather::WeatherLevel;
