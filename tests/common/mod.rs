//! Fakes shared by the integration tests

#![allow(dead_code)]

use cockpit::race::{Message, MessageChannel, PeerAddress};
use cockpit::{
    Cockpit, CockpitConfig, HardwareInventory, MemoryStore, Peripherals, TickInput, TickOutput,
    VehicleState,
};
use nalgebra::Vector3;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Radio link with queued inbound traffic.
#[derive(Debug, Default)]
pub struct Radio {
    pub unicast: VecDeque<Message>,
    pub broadcast: VecDeque<Message>,
    pub sent: Vec<(PeerAddress, Message)>,
}

impl Radio {
    pub fn unicast(&mut self, tag: &str, data: &str) {
        self.unicast.push_back(Message::new(tag, data));
    }

    pub fn broadcast(&mut self, tag: &str, data: &str) {
        self.broadcast.push_back(Message::new(tag, data));
    }
}

impl MessageChannel for Radio {
    fn own_id(&self) -> i64 {
        9001
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

/// A cockpit on a simulated clock.
pub struct Car {
    pub cockpit: Cockpit,
    pub radio: Radio,
    pub store: MemoryStore,
    pub now: Instant,
    pub frame: Duration,
}

impl Car {
    pub fn new(config: CockpitConfig) -> Self {
        Self::with_store(config, MemoryStore::default())
    }

    pub fn with_store(config: CockpitConfig, store: MemoryStore) -> Self {
        let frame = config.timing.nominal_frame().expect("valid nominal frame");
        let cockpit = Cockpit::boot(config, &HardwareInventory::complete(), &store);
        Self { cockpit, radio: Radio::default(), store, now: Instant::now(), frame }
    }

    pub fn tick(&mut self, input: TickInput) -> Option<TickOutput> {
        self.now += self.frame;
        let mut io = Peripherals::new(&mut self.radio, &mut self.store);
        self.cockpit.tick(self.now, &input, &mut io)
    }

    pub fn drive(&mut self, vehicle: VehicleState) -> TickOutput {
        self.tick(TickInput::new(vehicle)).expect("cockpit halted")
    }

    pub fn command(&mut self, vehicle: VehicleState, token: &str) -> TickOutput {
        self.tick(TickInput::new(vehicle).with_argument(token)).expect("cockpit halted")
    }
}

pub fn config() -> CockpitConfig {
    let mut config = CockpitConfig::default();
    config.seed = Some(2024);
    config.driver.team_tag = "wrt".into();
    config.driver.name = "Max".into();
    config.driver.number = 7;
    config.weather.enabled = false;
    config
}

pub fn at(speed: f32) -> VehicleState {
    VehicleState { speed, ..VehicleState::default() }
}

pub fn flat_out(speed: f32) -> VehicleState {
    VehicleState { speed, move_indicator: Vector3::new(0.0, 0.0, -1.0), ..VehicleState::default() }
}

/// RaceData record with the given flag and weather codes.
pub fn race_data(position: i32, flag: i32, weather: i32) -> String {
    format!("4;{position};01:02.345;01:01.000;12;20;{flag};{weather};1. WRT #07-Max;2;1;0;01:03.210")
}
