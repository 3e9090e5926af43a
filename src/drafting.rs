//! Slipstream detection and mirror proximity
//!
//! A rear-facing sensor reports nearby entities. When a fast car is in front
//! of the sensor and we are fast ourselves, a cooldown is armed; the car is
//! drafting for as long as that cooldown is positive. The cooldown keeps the
//! signal stable while the car ahead weaves in and out of the sensor cone.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum speed (m/s) of the car ahead for a slipstream.
pub const MIN_TARGET_SPEED: f32 = 70.0;

/// Minimum own speed (m/s) for a slipstream.
pub const MIN_OWN_SPEED: f32 = 50.0;

/// Default cooldown armed on each detection.
pub const DEFAULT_COOLDOWN_MS: u32 = 1000;

/// What a sensor saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    SmallGrid,
    LargeGrid,
    Character,
    Other,
}

/// One entity reported by a proximity sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEntity {
    pub name: String,
    pub kind: EntityKind,
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
}

impl DetectedEntity {
    /// Another race car, as opposed to a grid decoration or anything else.
    pub fn is_race_car(&self) -> bool {
        self.kind == EntityKind::SmallGrid && !self.name.contains("Grid")
    }

    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }
}

/// Capability to sample a proximity sensor.
pub trait ProximitySource {
    /// Entities currently inside the sensor volume.
    fn sample(&mut self) -> Vec<DetectedEntity>;
}

/// Cooldown based drafting detector.
#[derive(Debug, Clone)]
pub struct DraftingDetector {
    cooldown_ms: u32,
    duration_ms: u32,
    drafting: bool,
}

impl Default for DraftingDetector {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_MS)
    }
}

impl DraftingDetector {
    pub fn new(duration_ms: u32) -> Self {
        Self { cooldown_ms: 0, duration_ms, drafting: false }
    }

    pub fn is_drafting(&self) -> bool {
        self.drafting
    }

    pub fn cooldown_ms(&self) -> u32 {
        self.cooldown_ms
    }

    /// Feed one sensor sample. Returns whether the car is drafting this tick.
    pub fn update(
        &mut self,
        entities: &[DetectedEntity],
        own_speed: f32,
        pit_limiter_active: bool,
        delta: f32,
    ) -> bool {
        let car_ahead =
            entities.iter().any(|e| e.is_race_car() && e.speed() >= MIN_TARGET_SPEED);

        if car_ahead && own_speed >= MIN_OWN_SPEED {
            self.cooldown_ms = self.duration_ms;
        }

        if pit_limiter_active {
            self.cooldown_ms = 0;
        }

        self.set_drafting(self.cooldown_ms > 0);
        self.cooldown_ms = self.cooldown_ms.saturating_sub((delta * 1000.0) as u32);
        self.drafting
    }

    /// No sensor attached: never drafting.
    pub fn update_without_sensor(&mut self) -> bool {
        self.cooldown_ms = 0;
        self.set_drafting(false);
        false
    }

    fn set_drafting(&mut self, drafting: bool) {
        if drafting != self.drafting {
            debug!(drafting, "Drafting state changed");
        }
        self.drafting = drafting;
    }
}

/// How close the nearest car in a mirror is.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MirrorProximity {
    #[default]
    Clear,
    Far,
    Close,
    Alongside,
}

impl MirrorProximity {
    pub fn from_distance(distance: Option<f32>) -> Self {
        match distance {
            None => MirrorProximity::Clear,
            Some(d) if d < 15.0 => MirrorProximity::Alongside,
            Some(d) if d < 30.0 => MirrorProximity::Close,
            Some(_) => MirrorProximity::Far,
        }
    }

    /// Classify the nearest entity seen by a mirror sensor.
    pub fn from_entities(entities: &[DetectedEntity], own_position: &Vector3<f32>) -> Self {
        let nearest = entities
            .iter()
            .map(|e| (e.position - own_position).norm())
            .min_by(|a, b| a.total_cmp(b));
        Self::from_distance(nearest)
    }

    /// Number of arrows the dashboard draws.
    pub fn arrows(self) -> usize {
        match self {
            MirrorProximity::Clear => 0,
            MirrorProximity::Far => 1,
            MirrorProximity::Close => 2,
            MirrorProximity::Alongside => 3,
        }
    }
}
