//! Cockpit configuration
//!
//! Every section has defaults matching a stock car, so an empty YAML document
//! is a valid config:
//!
//! ```rust
//! use cockpit::CockpitConfig;
//!
//! let config = CockpitConfig::from_yaml_str(
//!     r#"
//! driver:
//!   team_tag: wrt
//!   name: Max
//!   number: 7
//! weather:
//!   enabled: false
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.driver.grid_name().unwrap(), "WRT #07-Max");
//! assert_eq!(config.suspension.default_speed_limit, 95.0);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::weather::{DEFAULT_STEP_INTERVAL, WeatherLevel};
use crate::{CockpitError, Result};

/// Team tag used when none is configured.
pub const DEFAULT_TEAM_TAG: &str = "XXX";

/// Longest tick delta, in seconds, a config may accept as real.
pub const MAX_DELTA_LIMIT_SECS: f32 = 60.0;

/// Root configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CockpitConfig {
    pub driver: DriverConfig,
    pub suspension: SuspensionConfig,
    pub timing: TimingConfig,
    pub ers: ErsConfig,
    pub weather: WeatherConfig,
    /// Seed for tyre failure and weather rolls. Random when unset.
    pub seed: Option<u64>,
}

/// Driver identity shown to race control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub team_tag: String,
    pub name: String,
    pub number: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { team_tag: DEFAULT_TEAM_TAG.to_string(), name: "Guest".to_string(), number: 99 }
    }
}

impl DriverConfig {
    /// Normalised three letter team tag.
    pub fn team_tag(&self) -> Result<String> {
        let tag = self.team_tag.trim();
        if tag.is_empty() {
            return Ok(DEFAULT_TEAM_TAG.to_string());
        }

        let tag: String = tag.chars().take(3).collect::<String>().to_uppercase();
        if tag.chars().count() < 3 {
            return Err(CockpitError::config_error(
                "driver.team_tag",
                format!("'{}' is shorter than three characters", self.team_tag),
            ));
        }
        Ok(tag)
    }

    /// Grid name announced to race control, e.g. `WRT #07-Max`.
    pub fn grid_name(&self) -> Result<String> {
        Ok(format!("{} #{:02}-{}", self.team_tag()?, self.number, self.name.trim()))
    }

    /// Antenna text shown before the first race data arrives.
    pub fn boot_hud_text(&self, position: i32) -> String {
        format!("(P{}) {}-{}", position, self.name, self.number)
    }
}

/// Stock suspension settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspensionConfig {
    /// Front axle strength with DRS closed, also the ramp floor.
    pub default_strength_front: f32,
    /// Rear axle strength with DRS closed, also the ramp floor.
    pub default_strength_rear: f32,
    pub default_power: f32,
    /// Speed limit in m/s.
    pub default_speed_limit: f32,
}

impl Default for SuspensionConfig {
    fn default() -> Self {
        Self {
            default_strength_front: 20.0,
            default_strength_rear: 20.0,
            default_power: 80.0,
            default_speed_limit: 95.0,
        }
    }
}

/// Counters and clock guards, all in milliseconds except where noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub connection_timeout_ms: u32,
    pub save_cooldown_ms: u32,
    pub drafting_cooldown_ms: u32,
    /// Delta used when the clock misbehaves, in seconds.
    pub nominal_frame_secs: f32,
    /// Largest delta accepted as real, in seconds.
    pub max_delta_secs: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            connection_timeout_ms: 3000,
            save_cooldown_ms: 1000,
            drafting_cooldown_ms: 1000,
            nominal_frame_secs: 1.0 / 60.0,
            max_delta_secs: 1.0,
        }
    }
}

impl TimingConfig {
    pub fn nominal_frame(&self) -> Result<Duration> {
        secs_to_duration("timing.nominal_frame_secs", self.nominal_frame_secs)
    }

    pub fn max_delta(&self) -> Result<Duration> {
        secs_to_duration("timing.max_delta_secs", self.max_delta_secs)
    }
}

fn secs_to_duration(field: &str, secs: f32) -> Result<Duration> {
    Duration::try_from_secs_f32(secs)
        .map_err(|e| CockpitError::config_error(field, format!("{secs} seconds: {e}")))
}

/// Energy recovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErsConfig {
    pub propulsion_override: f32,
    pub initial_charge: f32,
}

impl Default for ErsConfig {
    fn default() -> Self {
        Self { propulsion_override: 1.7, initial_charge: 1.0 }
    }
}

/// Local weather process settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub enabled: bool,
    pub interval_secs: f32,
    pub initial_level: WeatherLevel,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_STEP_INTERVAL,
            initial_level: WeatherLevel::Clear,
        }
    }
}

impl CockpitConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: CockpitConfig = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|source| CockpitError::file_error(path.to_path_buf(), source))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check values a running cockpit depends on.
    pub fn validate(&self) -> Result<()> {
        if !(1..=99).contains(&self.driver.number) {
            return Err(CockpitError::config_error(
                "driver.number",
                format!("{} is not between 1 and 99", self.driver.number),
            ));
        }

        self.driver.team_tag()?;

        let s = &self.suspension;
        for (field, value) in [
            ("suspension.default_strength_front", s.default_strength_front),
            ("suspension.default_strength_rear", s.default_strength_rear),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(CockpitError::config_error(field, format!("{value} is not in 0..=100")));
            }
        }

        let t = &self.timing;
        if t.connection_timeout_ms == 0 || t.save_cooldown_ms == 0 || t.drafting_cooldown_ms == 0 {
            return Err(CockpitError::config_error("timing", "cooldowns must be positive"));
        }
        if !(t.nominal_frame_secs > 0.0 && t.max_delta_secs >= t.nominal_frame_secs) {
            return Err(CockpitError::config_error(
                "timing",
                "nominal frame must be positive and no larger than max delta",
            ));
        }
        if !(t.max_delta_secs <= MAX_DELTA_LIMIT_SECS) {
            return Err(CockpitError::config_error(
                "timing.max_delta_secs",
                format!("{} is above {MAX_DELTA_LIMIT_SECS}", t.max_delta_secs),
            ));
        }
        t.nominal_frame()?;
        t.max_delta()?;

        if !(self.weather.interval_secs > 0.0) {
            return Err(CockpitError::config_error(
                "weather.interval_secs",
                "interval must be positive",
            ));
        }

        if !(0.0..=1.0).contains(&self.ers.initial_charge) {
            return Err(CockpitError::config_error("ers.initial_charge", "must be in 0..=1"));
        }

        Ok(())
    }
}
