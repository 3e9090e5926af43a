//! Stochastic weather process
//!
//! Weather moves along a seven step scale from `Clear` (-3) to `HeavyRain`
//! (+3). Every [`DEFAULT_STEP_INTERVAL`] seconds of simulated time the process
//! rolls a d10 against the current level's down/up chances and moves at most
//! one step.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Color;
use crate::config::WeatherConfig;

/// Seconds of simulated time between Markov steps.
pub const DEFAULT_STEP_INTERVAL: f32 = 60.0;

/// (down %, up %) per level, indexed by `code + 3`.
const TRANSITION_CHANCES: [(u8, u8); 7] = [
    (0, 60),
    (50, 30),
    (50, 20),
    (40, 40),
    (20, 50),
    (30, 50),
    (50, 0),
];

/// Discrete weather level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeatherLevel {
    #[default]
    Clear,
    LightClouds,
    Cloudy,
    Overcast,
    Drizzle,
    Rain,
    HeavyRain,
}

impl WeatherLevel {
    pub const ALL: [WeatherLevel; 7] = [
        WeatherLevel::Clear,
        WeatherLevel::LightClouds,
        WeatherLevel::Cloudy,
        WeatherLevel::Overcast,
        WeatherLevel::Drizzle,
        WeatherLevel::Rain,
        WeatherLevel::HeavyRain,
    ];

    /// Decode a wire code in -3..=3.
    pub fn from_code(code: i32) -> Option<Self> {
        let index = usize::try_from(code + 3).ok()?;
        Self::ALL.get(index).copied()
    }

    /// Clamp an arbitrary code onto the scale.
    pub fn saturating_from_code(code: i32) -> Self {
        Self::ALL[(code.clamp(-3, 3) + 3) as usize]
    }

    pub fn code(self) -> i32 {
        self as i32 - 3
    }

    /// Down/up transition chances in percent.
    pub fn transition_chances(self) -> (u8, u8) {
        TRANSITION_CHANCES[(self.code() + 3) as usize]
    }

    /// Short label used on the dashboard.
    pub fn description(self) -> &'static str {
        match self {
            WeatherLevel::Clear => "Clear",
            WeatherLevel::LightClouds => "L. Clouds",
            WeatherLevel::Cloudy => "Cloudy",
            WeatherLevel::Overcast => "Overcast",
            WeatherLevel::Drizzle => "Drizzle",
            WeatherLevel::Rain => "Rain",
            WeatherLevel::HeavyRain => "H. Rain",
        }
    }

    pub fn color(self) -> Color {
        match self {
            WeatherLevel::Clear => Color::rgb(255, 106, 0),
            WeatherLevel::LightClouds => Color::rgb(255, 233, 127),
            WeatherLevel::Cloudy => Color::rgb(255, 244, 191),
            WeatherLevel::Overcast => Color::WHITE,
            WeatherLevel::Drizzle => Color::rgb(127, 202, 255),
            WeatherLevel::Rain => Color::rgb(0, 148, 255),
            WeatherLevel::HeavyRain => Color::BLUE,
        }
    }

    /// Level after a d10 `roll` (1..=10).
    pub fn next_for_roll(self, roll: u8) -> Self {
        let (down_chance, up_chance) = self.transition_chances();
        let down_threshold = down_chance / 10;
        let up_threshold = 11 - up_chance / 10;

        let code = if roll <= down_threshold {
            self.code() - 1
        } else if roll >= up_threshold {
            self.code() + 1
        } else {
            self.code()
        };

        Self::saturating_from_code(code)
    }
}

/// Periodic Markov weather driver.
#[derive(Debug, Clone)]
pub struct WeatherProcess {
    level: WeatherLevel,
    enabled: bool,
    interval: f32,
    countdown: f32,
}

impl Default for WeatherProcess {
    fn default() -> Self {
        Self::new(WeatherLevel::Clear, true, DEFAULT_STEP_INTERVAL)
    }
}

impl WeatherProcess {
    pub fn new(initial: WeatherLevel, enabled: bool, interval: f32) -> Self {
        let level = if enabled { initial } else { WeatherLevel::Clear };
        Self { level, enabled, interval, countdown: interval }
    }

    pub fn from_config(config: &WeatherConfig) -> Self {
        Self::new(config.initial_level, config.enabled, config.interval_secs)
    }

    pub fn level(&self) -> WeatherLevel {
        self.level
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn the process on or off. Both directions restart from `Clear`.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        self.level = WeatherLevel::Clear;
        self.countdown = self.interval;
        debug!(enabled, "Weather process toggled");
    }

    /// Advance by `delta` seconds. Returns the new level when a step happened.
    pub fn tick<R: Rng>(&mut self, delta: f32, rng: &mut R) -> Option<WeatherLevel> {
        if !self.enabled {
            self.level = WeatherLevel::Clear;
            return None;
        }

        self.countdown -= delta.max(0.0);
        if self.countdown > 0.0 {
            return None;
        }

        // Overshoot carries into the next interval
        self.countdown += self.interval;

        let roll: u8 = rng.gen_range(1..=10);
        let previous = self.level;
        self.level = previous.next_for_roll(roll);

        debug!(
            roll,
            from = previous.description(),
            to = self.level.description(),
            "Weather step"
        );

        Some(self.level)
    }
}
