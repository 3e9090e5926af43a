//! Scripted peripherals and vehicle builders for tests and benchmarks

#![cfg(any(test, feature = "benchmark"))]

use nalgebra::Vector3;
use std::collections::VecDeque;

use crate::VehicleState;
use crate::drafting::{DetectedEntity, EntityKind, ProximitySource};
use crate::race::{Message, MessageChannel, PeerAddress};

/// Message channel fed from in-memory queues.
#[derive(Debug, Default, Clone)]
pub struct ScriptedChannel {
    pub own_id: i64,
    pub unicast: VecDeque<Message>,
    pub broadcast: VecDeque<Message>,
    /// Every message sent, in order.
    pub sent: Vec<(PeerAddress, Message)>,
}

impl ScriptedChannel {
    pub fn new(own_id: i64) -> Self {
        Self { own_id, ..Self::default() }
    }

    pub fn push_unicast(&mut self, tag: &str, data: &str) {
        self.unicast.push_back(Message::new(tag, data));
    }

    pub fn push_broadcast(&mut self, tag: &str, data: &str) {
        self.broadcast.push_back(Message::new(tag, data));
    }
}

impl MessageChannel for ScriptedChannel {
    fn own_id(&self) -> i64 {
        self.own_id
    }

    fn poll_unicast(&mut self) -> Vec<Message> {
        self.unicast.drain(..).collect()
    }

    fn poll_broadcast(&mut self) -> Vec<Message> {
        self.broadcast.drain(..).collect()
    }

    fn send_unicast(&mut self, to: PeerAddress, message: Message) {
        self.sent.push((to, message));
    }
}

/// Proximity sensor replaying queued samples, then a fallback.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSensor {
    pub samples: VecDeque<Vec<DetectedEntity>>,
    pub fallback: Vec<DetectedEntity>,
}

impl ScriptedSensor {
    /// Sensor that sees the same entities every tick.
    pub fn repeating(entities: Vec<DetectedEntity>) -> Self {
        Self { samples: VecDeque::new(), fallback: entities }
    }

    /// Sensor that sees `samples` once each, then nothing.
    pub fn sequence(samples: impl IntoIterator<Item = Vec<DetectedEntity>>) -> Self {
        Self { samples: samples.into_iter().collect(), fallback: Vec::new() }
    }
}

impl ProximitySource for ScriptedSensor {
    fn sample(&mut self) -> Vec<DetectedEntity> {
        self.samples.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

/// Upright car at rest.
pub fn stationary() -> VehicleState {
    VehicleState::default()
}

/// Upright car at `speed` with the throttle held.
pub fn cruising(speed: f32) -> VehicleState {
    VehicleState { speed, move_indicator: Vector3::new(0.0, 0.0, -1.0), ..VehicleState::default() }
}

/// Car at `speed` on the brakes.
pub fn braking(speed: f32) -> VehicleState {
    VehicleState { speed, move_indicator: Vector3::new(0.0, 0.0, 1.0), ..VehicleState::default() }
}

/// Car lying on its roof.
pub fn upside_down() -> VehicleState {
    VehicleState { up: -Vector3::y(), ..VehicleState::default() }
}

/// Another race car 10m ahead moving at `speed`.
pub fn race_car(grid_name: &str, speed: f32) -> DetectedEntity {
    DetectedEntity {
        name: grid_name.to_string(),
        kind: EntityKind::SmallGrid,
        position: Vector3::new(0.0, 0.0, -10.0),
        velocity: Vector3::new(0.0, 0.0, -speed),
    }
}
