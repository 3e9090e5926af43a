//! Sampling rate for tick output subscribers

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often a subscriber wants to see tick outputs.
///
/// Displays rarely need every tick; `Max(hz)` samples the latest output at
/// most `hz` times per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every tick the driver produces.
    Native,

    /// At most this many outputs per second, latest wins.
    Max(u32),
}

impl UpdateRate {
    /// Collapse rates at or above the tick rate into `Native`.
    pub fn normalize(self, tick_hz: f64) -> Self {
        match self {
            UpdateRate::Max(hz) if hz == 0 || hz as f64 >= tick_hz => UpdateRate::Native,
            other => other,
        }
    }

    /// Sampling period, or `None` when every output is delivered.
    pub fn sample_interval(self, tick_hz: f64) -> Option<Duration> {
        match self.normalize(tick_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}
