//! Whole-car scenarios driven through the public API

mod common;

use anyhow::Result;
use cockpit::race::{Message, PeerAddress, TAG_ADDRESS, TAG_ARGUMENT, TAG_RACE_DATA};
use cockpit::{
    Cockpit, Flag, HardwareInventory, LightState, MemoryStore, Peripherals, TickInput,
    TyreCompound, VehicleState, WeatherLevel,
};
use common::{Car, at, config, flat_out, race_data};
use nalgebra::Vector3;
use std::time::Instant;

#[test]
fn red_flag_overrides_every_assist() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut car = Car::new(config());

    car.command(flat_out(80.0), "DRS_ON");
    car.command(flat_out(80.0), "ERS_ON");
    assert!(car.cockpit.assists().drs);
    assert!(car.cockpit.assists().ers);

    car.radio.unicast(TAG_ARGUMENT, "LMT_ON");
    car.radio.unicast(TAG_RACE_DATA, &race_data(2, Flag::Red.code(), -3));
    car.drive(flat_out(80.0));
    assert!(car.cockpit.assists().pit_limiter);
    assert_eq!(car.cockpit.race().flag(), Flag::Red);

    let output = car.drive(flat_out(80.0));
    let assists = car.cockpit.assists();
    assert!(!assists.drs);
    assert!(!assists.ers);
    assert!(!assists.pit_limiter);
    assert!(output.targets.handbrake);
    assert_eq!(output.targets.propulsion_override.front_left, 0.0);
    assert_eq!(output.targets.lights.drs, LightState::off());
}

#[test]
fn malformed_race_data_keeps_previous_standings() {
    let mut car = Car::new(config());

    car.radio.unicast(TAG_RACE_DATA, &race_data(3, 0, -1));
    car.drive(at(40.0));
    let before = car.cockpit.race().snapshot().clone();
    assert_eq!(before.position, 3);
    assert_eq!(before.best_lap_time, "01:01.000");

    car.radio.unicast(TAG_RACE_DATA, "4;5;garbage");
    car.drive(at(40.0));
    assert_eq!(car.cockpit.race().snapshot(), &before);

    car.radio.unicast(TAG_RACE_DATA, &race_data(1, 9, -1));
    let output = car.drive(at(40.0));
    assert_eq!(car.cockpit.race().snapshot(), &before);
    assert_eq!(output.hud_text, "P3");
}

#[test]
fn ultra_change_in_pit_box_forces_a_save() {
    let mut car = Car::with_store(config(), MemoryStore::with_record("S;0.5;0.5"));
    assert_eq!(car.cockpit.tyre().wear(), 0.5);

    car.drive(at(0.0));
    assert_eq!(car.store.writes, 1);

    car.command(at(0.0), "LMT_ON");
    assert_eq!(car.store.writes, 1);

    let output = car.command(at(0.0), "ULTRA");
    assert_eq!(car.cockpit.tyre().compound(), TyreCompound::Ultra);
    assert_eq!(car.cockpit.tyre().wear(), 1.0);
    assert_eq!(car.store.writes, 2);
    assert_eq!(car.store.record.as_deref(), Some("U;1;0.5"));
    assert_eq!(car.cockpit.assists().ers_charge(), 0.5);

    assert!(output.targets.reattach_wheels);
    assert_eq!(output.targets.friction, 100.0);
    assert_eq!(output.targets.lights.brake, LightState::steady(TyreCompound::Ultra.spec().color));
    assert_eq!(output.dashboard.tyre_symbol, 'U');
}

#[test]
fn missing_gyro_halts_the_cockpit() {
    let mut store = MemoryStore::default();
    let inventory = HardwareInventory { gyros: 0, ..HardwareInventory::complete() };
    let mut cockpit = Cockpit::boot(config(), &inventory, &store);
    assert!(cockpit.is_halted());

    let mut radio = common::Radio::default();
    radio.broadcast(TAG_ADDRESS, "500");
    for _ in 0..5 {
        let mut io = Peripherals::new(&mut radio, &mut store);
        let output = cockpit.tick(Instant::now(), &TickInput::new(at(50.0)).with_argument("DRS"), &mut io);
        assert!(output.is_none());
    }
    assert_eq!(store.writes, 0);
    assert!(radio.sent.is_empty());
    assert!(!cockpit.assists().drs);
}

#[test]
fn soft_tyres_lose_an_eighth_per_flat_out_minute() {
    let mut config = config();
    config.timing.nominal_frame_secs = 1.0;
    config.timing.max_delta_secs = 1.0;
    let mut car = Car::new(config);

    for _ in 0..60 {
        car.drive(VehicleState { speed: 90.0, ..VehicleState::default() });
    }

    let wear = car.cockpit.tyre().wear();
    assert!((wear - 0.875).abs() < 1e-4, "wear {wear}");
}

#[test]
fn race_control_handshake_and_flag_requests() -> Result<()> {
    let mut car = Car::new(config());

    car.command(at(0.0), "FLAG_Y");
    assert!(car.radio.sent.is_empty());

    car.radio.broadcast(TAG_ADDRESS, "500");
    let output = car.drive(at(0.0));
    assert!(!output.dashboard.connected);
    assert_eq!(
        car.radio.sent,
        vec![(PeerAddress(500), Message::new("Register", "WRT #07-Max;9001"))]
    );

    car.command(at(0.0), "flag_y");
    assert_eq!(car.radio.sent.last(), Some(&(PeerAddress(500), Message::new("Flag", "1"))));

    car.radio.unicast(TAG_RACE_DATA, &race_data(5, 0, -3));
    assert!(car.drive(at(0.0)).dashboard.connected);

    // Three seconds of silence
    for _ in 0..200 {
        car.drive(at(0.0));
    }
    anyhow::ensure!(!car.cockpit.race().is_connected(), "link should have timed out");
    Ok(())
}

#[test]
fn remote_weather_drives_tyre_grip() {
    let mut car = Car::new(config());
    assert_eq!(car.drive(at(0.0)).targets.friction, 100.0);

    car.radio.unicast(TAG_RACE_DATA, &race_data(1, 0, WeatherLevel::HeavyRain.code()));
    car.drive(at(0.0));

    let output = car.drive(at(0.0));
    assert_eq!(output.dashboard.weather, WeatherLevel::HeavyRain);
    assert_eq!(output.dashboard.weather_description, "H. Rain");
    assert!((output.targets.friction - 25.0).abs() < 1e-4);
}

#[test]
fn flip_recovery_needs_arming() {
    let mut car = Car::new(config());
    let inverted = VehicleState { up: -Vector3::y(), ..VehicleState::default() };

    assert!(!car.drive(inverted).targets.gyro_override);

    car.command(at(0.0), "FLIP");
    assert!(car.drive(inverted).targets.gyro_override);
    assert!(car.drive(inverted).targets.gyro_override);
    assert!(!car.drive(at(0.0)).targets.gyro_override);

    // Disarmed again
    assert!(!car.drive(inverted).targets.gyro_override);
}

#[test]
fn yellow_flag_caps_speed_over_ers() {
    let mut car = Car::new(config());
    car.command(flat_out(60.0), "ERS_ON");
    assert_eq!(car.drive(flat_out(60.0)).targets.speed_limit, 97.0);

    car.radio.unicast(TAG_RACE_DATA, &race_data(1, Flag::Yellow.code(), -3));
    car.drive(flat_out(60.0));

    let output = car.drive(flat_out(40.0));
    assert!(!car.cockpit.assists().ers);
    assert_eq!(output.targets.speed_limit, 45.0);
    assert_eq!(output.targets.speed_limit_kmh(), 45.0 * 3.6);
    assert!(!output.targets.handbrake);
}
