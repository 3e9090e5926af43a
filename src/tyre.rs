//! Tyre wear and friction model
//!
//! Each compound has a lifespan in minutes of flat-out running and a
//! friction band. Wear runs from 1 (fresh) down to 0; friction falls along a
//! sine curve so a tyre keeps most of its grip early and drops off late:
//!
//! ```text
//! friction = max - (max - min) * sin(90° - wear * 90°)
//! ```
//!
//! Weather scales both how fast a compound wears and how much of its
//! friction reaches the road. Both multipliers live in per-class tables.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::weather::WeatherLevel;
use crate::{Color, WheelPosition};

/// Below this speed (m/s) tyres do not wear.
pub const MIN_WEAR_SPEED: f32 = 1.0;

/// Speed (m/s) at which wear reaches its full rate.
pub const FULL_WEAR_SPEED: f32 = 90.0;

/// Wear fraction at or below which the driver is warned.
pub const WEAR_WARNING_THRESHOLD: f32 = 0.25;

/// Tyre compound selectable in the pit lane.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TyreCompound {
    Ultra,
    #[default]
    Soft,
    Medium,
    Hard,
    Extra,
    Intermediate,
    Wet,
}

/// Fixed properties of a compound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundSpec {
    pub lifespan_minutes: u32,
    pub max_friction: f32,
    pub min_friction: f32,
    pub symbol: char,
    pub color: Color,
    pub is_slick: bool,
}

/// Weather behaviour class of a compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundClass {
    Slick,
    Intermediate,
    Wet,
}

impl CompoundClass {
    fn index(self) -> usize {
        match self {
            CompoundClass::Slick => 0,
            CompoundClass::Intermediate => 1,
            CompoundClass::Wet => 2,
        }
    }
}

// Rows: Slick, Intermediate, Wet. Columns: Clear .. HeavyRain.
const WEARINESS: [[f32; 7]; 3] = [
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    [1.25, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    [2.0, 1.8, 1.6, 1.4, 1.2, 1.0, 1.0],
];

const EFFICIENCY: [[f32; 7]; 3] = [
    [1.0, 1.0, 1.0, 1.0, 0.75, 0.5, 0.25],
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.8],
    [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
];

impl TyreCompound {
    pub const ALL: [TyreCompound; 7] = [
        TyreCompound::Ultra,
        TyreCompound::Soft,
        TyreCompound::Medium,
        TyreCompound::Hard,
        TyreCompound::Extra,
        TyreCompound::Intermediate,
        TyreCompound::Wet,
    ];

    pub fn spec(self) -> CompoundSpec {
        let (lifespan_minutes, max_friction, min_friction, symbol, color, is_slick) = match self {
            TyreCompound::Ultra => (5, 100.0, 80.0, 'U', Color::rgb(192, 0, 255), true),
            TyreCompound::Soft => (8, 100.0, 45.0, 'S', Color::RED, true),
            TyreCompound::Medium => (13, 75.0, 45.0, 'M', Color::YELLOW, true),
            TyreCompound::Hard => (21, 60.0, 45.0, 'H', Color::WHITE, true),
            TyreCompound::Extra => (34, 55.0, 45.0, 'X', Color::rgb(255, 32, 0), true),
            TyreCompound::Intermediate => (8, 60.0, 40.0, 'I', Color::GREEN, false),
            TyreCompound::Wet => (13, 50.0, 40.0, 'W', Color::rgb(0, 16, 255), false),
        };
        CompoundSpec { lifespan_minutes, max_friction, min_friction, symbol, color, is_slick }
    }

    pub fn class(self) -> CompoundClass {
        match self {
            TyreCompound::Intermediate => CompoundClass::Intermediate,
            TyreCompound::Wet => CompoundClass::Wet,
            TyreCompound::Ultra
            | TyreCompound::Soft
            | TyreCompound::Medium
            | TyreCompound::Hard
            | TyreCompound::Extra => CompoundClass::Slick,
        }
    }

    pub fn symbol(self) -> char {
        self.spec().symbol
    }

    /// Look up a compound by its persisted symbol character.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|compound| compound.symbol() == symbol)
    }

    /// Wear rate multiplier in the given weather.
    pub fn weariness(self, weather: WeatherLevel) -> f32 {
        WEARINESS[self.class().index()][weather_index(weather)]
    }

    /// Fraction of friction that reaches the road in the given weather.
    pub fn efficiency(self, weather: WeatherLevel) -> f32 {
        EFFICIENCY[self.class().index()][weather_index(weather)]
    }
}

fn weather_index(weather: WeatherLevel) -> usize {
    (weather.code() + 3) as usize
}

/// Result of one tyre update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TyreUpdate {
    /// Suspension friction to apply, weather efficiency included.
    pub friction_target: f32,
    pub wear_warning: bool,
    /// Wheel that blew this tick, if any.
    pub blown: Option<WheelPosition>,
}

/// Mounted set of tyres.
#[derive(Debug, Clone, PartialEq)]
pub struct Tyre {
    compound: TyreCompound,
    wear: f32,
    blown: Option<WheelPosition>,
}

impl Default for Tyre {
    fn default() -> Self {
        Self::new(TyreCompound::default())
    }
}

impl Tyre {
    /// Fresh set of the given compound.
    pub fn new(compound: TyreCompound) -> Self {
        Self::with_wear(compound, 1.0)
    }

    /// Set restored from a persisted record.
    pub fn with_wear(compound: TyreCompound, wear: f32) -> Self {
        let wear = if wear.is_finite() { wear.clamp(0.0, 1.0) } else { 1.0 };
        Self { compound, wear, blown: None }
    }

    pub fn compound(&self) -> TyreCompound {
        self.compound
    }

    pub fn spec(&self) -> CompoundSpec {
        self.compound.spec()
    }

    /// Remaining tread, 1 = fresh, 0 = gone.
    pub fn wear(&self) -> f32 {
        self.wear
    }

    pub fn blown(&self) -> Option<WheelPosition> {
        self.blown
    }

    /// Friction before weather efficiency.
    pub fn current_friction(&self) -> f32 {
        let spec = self.spec();
        let angle = (90.0 - self.wear * 90.0).to_radians();
        spec.max_friction - (spec.max_friction - spec.min_friction) * angle.sin()
    }

    /// Friction after weather efficiency.
    pub fn effective_friction(&self, weather: WeatherLevel) -> f32 {
        self.current_friction() * self.compound.efficiency(weather)
    }

    pub fn wear_warning(&self) -> bool {
        self.wear <= WEAR_WARNING_THRESHOLD
    }

    /// Wear the tyres for `delta` seconds at `speed`.
    ///
    /// Once friction collapses to the compound minimum one wheel, picked
    /// uniformly at random, blows. That happens once per set.
    pub fn update<R: Rng>(
        &mut self,
        speed: f32,
        delta: f32,
        weather: WeatherLevel,
        rng: &mut R,
    ) -> TyreUpdate {
        let mut blown = None;

        if speed >= MIN_WEAR_SPEED && delta > 0.0 {
            let spec = self.spec();
            let wear_factor = 1.0 / (60.0 * spec.lifespan_minutes as f32);
            let speed_factor = speed.clamp(0.0, FULL_WEAR_SPEED) / FULL_WEAR_SPEED;
            let wear_rate = wear_factor * speed_factor * delta;

            let before = self.wear;
            self.wear =
                (self.wear - wear_rate * self.compound.weariness(weather)).clamp(0.0, 1.0);

            if before > WEAR_WARNING_THRESHOLD && self.wear_warning() {
                debug!(compound = ?self.compound, wear = self.wear, "Tyre wear warning");
            }

            if self.blown.is_none()
                && (self.wear <= 0.0 || self.current_friction() <= spec.min_friction)
            {
                let position = WheelPosition::ALL[rng.gen_range(0..WheelPosition::ALL.len())];
                self.blown = Some(position);
                blown = Some(position);
                info!(compound = ?self.compound, wheel = position.label(), "Tyre blow-out");
            }
        }

        TyreUpdate {
            friction_target: self.effective_friction(weather),
            wear_warning: self.wear_warning(),
            blown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn arb_compound() -> impl Strategy<Value = TyreCompound> {
        prop::sample::select(TyreCompound::ALL.to_vec())
    }

    fn arb_weather() -> impl Strategy<Value = WeatherLevel> {
        prop::sample::select(WeatherLevel::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn friction_never_rises_as_tyres_wear(
            compound in arb_compound(),
            a in 0.0f32..=1.0,
            b in 0.0f32..=1.0
        ) {
            let (fresher, older) = if a >= b { (a, b) } else { (b, a) };
            let fresh = Tyre::with_wear(compound, fresher).current_friction();
            let worn = Tyre::with_wear(compound, older).current_friction();
            prop_assert!(worn <= fresh + 1e-4);
        }

        #[test]
        fn stationary_tyres_do_not_wear(
            compound in arb_compound(),
            weather in arb_weather(),
            wear in 0.0f32..=1.0,
            speed in 0.0f32..1.0,
            delta in 0.0f32..1000.0
        ) {
            let mut rng = StdRng::seed_from_u64(0);
            let mut tyre = Tyre::with_wear(compound, wear);
            tyre.update(speed, delta, weather, &mut rng);
            prop_assert_eq!(tyre.wear(), wear);
        }

        #[test]
        fn wear_stays_clamped_and_never_grows(
            compound in arb_compound(),
            weather in arb_weather(),
            wear in 0.0f32..=1.0,
            speed in 0.0f32..500.0,
            delta in 0.0f32..10_000.0
        ) {
            let mut rng = StdRng::seed_from_u64(0);
            let mut tyre = Tyre::with_wear(compound, wear);
            tyre.update(speed, delta, weather, &mut rng);
            prop_assert!((0.0..=1.0).contains(&tyre.wear()));
            prop_assert!(tyre.wear() <= wear);
        }
    }

    #[test]
    fn friction_spans_the_compound_band() {
        for compound in TyreCompound::ALL {
            let spec = compound.spec();
            let fresh = Tyre::with_wear(compound, 1.0).current_friction();
            let gone = Tyre::with_wear(compound, 0.0).current_friction();
            assert!((fresh - spec.max_friction).abs() < 1e-4, "{compound:?} fresh {fresh}");
            assert!((gone - spec.min_friction).abs() < 1e-4, "{compound:?} gone {gone}");
        }
    }

    #[test]
    fn soft_wears_an_eighth_per_flat_out_minute() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut tyre = Tyre::new(TyreCompound::Soft);
        tyre.update(90.0, 60.0, WeatherLevel::Clear, &mut rng);
        assert!((tyre.wear() - 0.875).abs() < 1e-5, "wear {}", tyre.wear());
    }

    #[test]
    fn speed_above_full_rate_is_capped() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut fast = Tyre::new(TyreCompound::Medium);
        let mut flat_out = Tyre::new(TyreCompound::Medium);
        fast.update(300.0, 10.0, WeatherLevel::Clear, &mut rng);
        flat_out.update(90.0, 10.0, WeatherLevel::Clear, &mut rng);
        assert_eq!(fast.wear(), flat_out.wear());
    }

    #[test]
    fn wets_wear_faster_in_the_dry() {
        assert_eq!(TyreCompound::Wet.weariness(WeatherLevel::Clear), 2.0);
        assert_eq!(TyreCompound::Wet.weariness(WeatherLevel::Drizzle), 1.2);
        assert_eq!(TyreCompound::Wet.weariness(WeatherLevel::Rain), 1.0);
        assert_eq!(TyreCompound::Intermediate.weariness(WeatherLevel::Clear), 1.25);
        assert_eq!(TyreCompound::Soft.weariness(WeatherLevel::Clear), 1.0);
    }

    #[test]
    fn slicks_lose_grip_in_the_rain() {
        assert_eq!(TyreCompound::Hard.efficiency(WeatherLevel::Overcast), 1.0);
        assert_eq!(TyreCompound::Hard.efficiency(WeatherLevel::Drizzle), 0.75);
        assert_eq!(TyreCompound::Hard.efficiency(WeatherLevel::Rain), 0.5);
        assert_eq!(TyreCompound::Hard.efficiency(WeatherLevel::HeavyRain), 0.25);
        assert_eq!(TyreCompound::Intermediate.efficiency(WeatherLevel::HeavyRain), 0.8);
        assert_eq!(TyreCompound::Wet.efficiency(WeatherLevel::HeavyRain), 1.0);

        let tyre = Tyre::new(TyreCompound::Soft);
        assert!((tyre.effective_friction(WeatherLevel::Rain) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn warning_at_a_quarter_tread() {
        assert!(!Tyre::with_wear(TyreCompound::Soft, 0.26).wear_warning());
        assert!(Tyre::with_wear(TyreCompound::Soft, 0.25).wear_warning());
    }

    #[test]
    fn worn_out_tyre_blows_exactly_once() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut tyre = Tyre::with_wear(TyreCompound::Ultra, 0.001);

        let first = tyre.update(90.0, 60.0, WeatherLevel::Clear, &mut rng);
        assert_eq!(tyre.wear(), 0.0);
        assert!(first.blown.is_some());
        assert_eq!(tyre.blown(), first.blown);

        let second = tyre.update(90.0, 60.0, WeatherLevel::Clear, &mut rng);
        assert_eq!(second.blown, None);
        assert_eq!(tyre.blown(), first.blown);
    }

    #[test]
    fn symbols_round_trip() {
        for compound in TyreCompound::ALL {
            assert_eq!(TyreCompound::from_symbol(compound.symbol()), Some(compound));
        }
        assert_eq!(TyreCompound::from_symbol('Q'), None);
    }

    #[test]
    fn restored_wear_is_clamped() {
        assert_eq!(Tyre::with_wear(TyreCompound::Hard, 1.5).wear(), 1.0);
        assert_eq!(Tyre::with_wear(TyreCompound::Hard, -0.2).wear(), 0.0);
        assert_eq!(Tyre::with_wear(TyreCompound::Hard, f32::NAN).wear(), 1.0);
    }
}
