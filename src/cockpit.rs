//! Tick orchestrator
//!
//! [`Cockpit`] owns every piece of car state and runs the components in a
//! fixed order once per tick:
//!
//! 1. command from the cockpit argument
//! 2. DRS, ERS, flag override, pit limiter
//! 3. weather process, drafting detector, wheel power/limit resolution
//! 4. tyre wear and state save
//! 5. race control traffic, including remote commands
//! 6. antenna text and flip recovery
//!
//! Later stages override earlier ones, so the order is part of the contract.
//! A cockpit that failed to boot is halted and every tick returns `None`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, trace};

use crate::assist::AssistState;
use crate::clock::{TickClock, elapsed_ms};
use crate::command::Command;
use crate::drafting::{DraftingDetector, MirrorProximity, ProximitySource};
use crate::hardware::HardwareInventory;
use crate::persist::{PersistedState, SaveThrottle, StateStore};
use crate::race::{MessageChannel, RaceSnapshot, RaceSync};
use crate::tyre::{Tyre, TyreCompound};
use crate::weather::{WeatherLevel, WeatherProcess};
use crate::{ActuatorTargets, CockpitConfig, CockpitError, LightState, Result, VehicleState};

/// Brakelight blink interval while the wear warning holds.
pub const WEAR_WARNING_BLINK: f32 = 0.25;

/// Highest speed (m/s) at which the pit crew will change tyres.
pub const TYRE_CHANGE_MAX_SPEED: f32 = 1.0;

/// Readings for one tick.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickInput {
    pub vehicle: VehicleState,
    /// Command token passed to the programmable block, if any.
    pub argument: Option<String>,
}

impl TickInput {
    pub fn new(vehicle: VehicleState) -> Self {
        Self { vehicle, argument: None }
    }

    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = Some(argument.into());
        self
    }
}

/// Capabilities the cockpit polls during a tick.
pub struct Peripherals<'a> {
    pub channel: &'a mut dyn MessageChannel,
    pub store: &'a mut dyn StateStore,
    pub drafting_sensor: Option<&'a mut dyn ProximitySource>,
    pub mirror_left: Option<&'a mut dyn ProximitySource>,
    pub mirror_right: Option<&'a mut dyn ProximitySource>,
}

impl<'a> Peripherals<'a> {
    /// Channel and store only, no sensors.
    pub fn new(channel: &'a mut dyn MessageChannel, store: &'a mut dyn StateStore) -> Self {
        Self { channel, store, drafting_sensor: None, mirror_left: None, mirror_right: None }
    }

    pub fn with_drafting_sensor(mut self, sensor: &'a mut dyn ProximitySource) -> Self {
        self.drafting_sensor = Some(sensor);
        self
    }

    pub fn with_mirrors(
        mut self,
        left: &'a mut dyn ProximitySource,
        right: &'a mut dyn ProximitySource,
    ) -> Self {
        self.mirror_left = Some(left);
        self.mirror_right = Some(right);
        self
    }
}

/// What the driver display shows after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub speed: f32,
    pub pit_limiter: bool,
    pub drs: bool,
    pub ers: bool,
    pub drafting: bool,
    pub ers_charge: f32,
    pub compound: TyreCompound,
    pub tyre_symbol: char,
    pub tyre_wear: f32,
    pub wear_warning: bool,
    pub weather: WeatherLevel,
    pub weather_description: String,
    pub race: RaceSnapshot,
    pub connected: bool,
    pub mirror_left: MirrorProximity,
    pub mirror_right: MirrorProximity,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutput {
    pub targets: ActuatorTargets,
    /// Antenna HUD text.
    pub hud_text: String,
    pub dashboard: Dashboard,
}

/// The car's control core.
#[derive(Debug)]
pub struct Cockpit {
    config: CockpitConfig,
    grid_name: String,
    halted: Option<String>,
    clock: TickClock,
    assists: AssistState,
    tyre: Tyre,
    weather: WeatherProcess,
    drafting: DraftingDetector,
    sync: RaceSync,
    save: SaveThrottle,
    targets: ActuatorTargets,
    hud_text: String,
    rng: StdRng,
}

impl Cockpit {
    /// Boot, halting instead of failing when the car cannot run.
    pub fn boot(
        config: CockpitConfig,
        inventory: &HardwareInventory,
        store: &dyn StateStore,
    ) -> Self {
        match Self::try_boot(config.clone(), inventory, store) {
            Ok(cockpit) => cockpit,
            Err(e) => {
                error!("Cockpit failed to boot: {}", e);
                for suggestion in e.recovery_suggestions() {
                    info!("{}", suggestion);
                }
                // Never built from the rejected values
                let mut cockpit = Self::build(
                    CockpitConfig::default(),
                    String::new(),
                    PersistedState::default(),
                    TickClock::default(),
                );
                cockpit.config = config;
                cockpit.halt(e.to_string());
                cockpit
            }
        }
    }

    /// Boot, returning the first fatal startup error.
    pub fn try_boot(
        config: CockpitConfig,
        inventory: &HardwareInventory,
        store: &dyn StateStore,
    ) -> Result<Self> {
        config.validate()?;
        inventory.validate()?;
        let grid_name = config.driver.grid_name()?;

        let clock = TickClock::new(config.timing.nominal_frame()?, config.timing.max_delta()?);
        let persisted =
            PersistedState::load_or_default(store.load().as_deref(), config.ers.initial_charge);
        let cockpit = Self::build(config, grid_name, persisted, clock);

        info!(
            grid_name = %cockpit.grid_name,
            compound = ?cockpit.tyre.compound(),
            wear = cockpit.tyre.wear(),
            ers_charge = cockpit.assists.ers_charge(),
            drafting_sensor = inventory.drafting_sensor,
            "Cockpit booted"
        );
        Ok(cockpit)
    }

    fn build(
        config: CockpitConfig,
        grid_name: String,
        persisted: PersistedState,
        clock: TickClock,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let timing = &config.timing;

        Self {
            grid_name,
            halted: None,
            clock,
            assists: AssistState::new(&config.suspension, &config.ers, persisted.ers_charge),
            tyre: Tyre::with_wear(persisted.compound, persisted.wear),
            weather: WeatherProcess::from_config(&config.weather),
            drafting: DraftingDetector::new(timing.drafting_cooldown_ms),
            sync: RaceSync::new(timing.connection_timeout_ms),
            save: SaveThrottle::new(timing.save_cooldown_ms),
            targets: ActuatorTargets::default(),
            hud_text: config.driver.boot_hud_text(0),
            rng,
            config,
        }
    }

    /// Stop ticking for good.
    pub fn halt(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        error!(%reason, "Cockpit halted");
        self.halted = Some(reason);
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Error describing why the cockpit halted.
    pub fn halt_error(&self) -> Option<CockpitError> {
        self.halted.as_ref().map(|reason| CockpitError::Halted { reason: reason.clone() })
    }

    pub fn config(&self) -> &CockpitConfig {
        &self.config
    }

    pub fn grid_name(&self) -> &str {
        &self.grid_name
    }

    pub fn assists(&self) -> &AssistState {
        &self.assists
    }

    pub fn tyre(&self) -> &Tyre {
        &self.tyre
    }

    pub fn race(&self) -> &RaceSync {
        &self.sync
    }

    pub fn weather(&self) -> &WeatherProcess {
        &self.weather
    }

    pub fn hud_text(&self) -> &str {
        &self.hud_text
    }

    /// Weather the tyres see: race control's once known, the local process
    /// before that.
    pub fn effective_weather(&self) -> WeatherLevel {
        self.sync.remote_weather().unwrap_or(self.weather.level())
    }

    /// Switch the local weather process on or off. Either way the level
    /// restarts from `Clear`.
    pub fn set_weather_enabled(&mut self, enabled: bool) {
        self.weather.set_enabled(enabled);
    }

    /// Run one tick. Returns `None` once halted.
    pub fn tick(
        &mut self,
        now: Instant,
        input: &TickInput,
        io: &mut Peripherals<'_>,
    ) -> Option<TickOutput> {
        if self.is_halted() {
            trace!("Tick skipped, cockpit halted");
            return None;
        }

        let delta = self.clock.advance(now);
        let ms = elapsed_ms(delta);
        let vehicle = &input.vehicle;
        trace!(delta, speed = vehicle.speed, "Tick");

        self.targets.begin_tick();

        if let Some(argument) = input.argument.as_deref() {
            self.handle_argument(argument, vehicle, io);
        }

        let flag = self.sync.flag();
        self.assists.update_drs(vehicle, delta, &mut self.targets);
        self.assists.update_ers(vehicle, flag, delta, &mut self.targets);
        self.assists.apply_flag(flag, vehicle, &mut self.targets);
        self.assists.update_pit_limiter(vehicle, &mut self.targets);

        self.weather.tick(delta, &mut self.rng);

        self.assists.drafting = match io.drafting_sensor.as_deref_mut() {
            Some(sensor) => {
                let entities = sensor.sample();
                self.drafting.update(&entities, vehicle.speed, self.assists.pit_limiter, delta)
            }
            None => self.drafting.update_without_sensor(),
        };
        self.assists.resolve_wheels(flag, &mut self.targets);

        self.update_tyres(vehicle, delta);
        self.save_state(ms, false, io.store);

        let commands = self.sync.drain(ms, io.channel, &self.grid_name);
        for command in commands {
            self.handle_argument(&command, vehicle, io);
        }

        let dashboard = self.dashboard(vehicle, io);

        self.hud_text = format!("P{}", self.sync.snapshot().position);
        self.assists.update_flip(vehicle, &mut self.targets);

        Some(TickOutput {
            targets: self.targets.clone(),
            hud_text: self.hud_text.clone(),
            dashboard,
        })
    }

    fn handle_argument(&mut self, argument: &str, vehicle: &VehicleState, io: &mut Peripherals<'_>) {
        if argument.trim().is_empty() {
            return;
        }

        let command = match argument.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                debug!("Ignoring command: {}", e);
                return;
            }
        };

        let assists = &mut self.assists;
        match command {
            Command::PitLimiter(switch) => {
                assists.pit_limiter = switch.apply(assists.pit_limiter);
                debug!(active = assists.pit_limiter, "Pit limiter");
            }
            Command::Drs(switch) => {
                assists.drs = switch.apply(assists.drs);
                debug!(active = assists.drs, "DRS");
            }
            Command::Ers(switch) => {
                assists.ers = switch.apply(assists.ers);
                debug!(active = assists.ers, "ERS");
            }
            Command::ChangeTyres(compound) => self.change_tyres(compound, vehicle, io.store),
            Command::Flip => assists.arm_flip(),
            Command::RequestFlag(flag) => self.sync.request_flag(io.channel, flag),
        }
    }

    fn change_tyres(
        &mut self,
        compound: TyreCompound,
        vehicle: &VehicleState,
        store: &mut dyn StateStore,
    ) {
        if !self.assists.pit_limiter || vehicle.speed > TYRE_CHANGE_MAX_SPEED {
            debug!(?compound, speed = vehicle.speed, "Tyre change refused outside the pit box");
            return;
        }

        self.tyre = Tyre::new(compound);
        let spec = self.tyre.spec();
        self.targets.reattach_wheels = true;
        self.targets.friction = spec.max_friction;
        self.targets.lights.brake = LightState::steady(spec.color);
        info!(?compound, "Tyres changed");

        self.save_state(0, true, store);
    }

    fn update_tyres(&mut self, vehicle: &VehicleState, delta: f32) {
        let weather = self.effective_weather();
        let update = self.tyre.update(vehicle.speed, delta, weather, &mut self.rng);

        self.targets.friction = update.friction_target;
        if let Some(wheel) = update.blown {
            self.targets.detach_wheel = Some(wheel);
        }

        let color = self.tyre.spec().color;
        self.targets.lights.brake = if update.wear_warning {
            LightState::blinking(color, WEAR_WARNING_BLINK)
        } else {
            LightState::steady(color)
        };
    }

    fn save_state(&mut self, elapsed_ms: u32, force: bool, store: &mut dyn StateStore) {
        if !self.save.poll(elapsed_ms, force) {
            return;
        }

        let record = PersistedState {
            compound: self.tyre.compound(),
            wear: self.tyre.wear(),
            ers_charge: self.assists.ers_charge(),
        }
        .to_string();
        trace!(%record, force, "Saving state");
        store.store(&record);
    }

    fn dashboard(&self, vehicle: &VehicleState, io: &mut Peripherals<'_>) -> Dashboard {
        let mirror_left = mirror_proximity(io.mirror_left.as_deref_mut(), vehicle);
        let mirror_right = mirror_proximity(io.mirror_right.as_deref_mut(), vehicle);

        let weather = self.effective_weather();
        Dashboard {
            speed: vehicle.speed,
            pit_limiter: self.assists.pit_limiter,
            drs: self.assists.drs,
            ers: self.assists.ers,
            drafting: self.assists.drafting,
            ers_charge: self.assists.ers_charge(),
            compound: self.tyre.compound(),
            tyre_symbol: self.tyre.compound().symbol(),
            tyre_wear: self.tyre.wear(),
            wear_warning: self.tyre.wear_warning(),
            weather,
            weather_description: weather.description().to_string(),
            race: self.sync.snapshot().clone(),
            connected: self.sync.is_connected(),
            mirror_left,
            mirror_right,
        }
    }
}

fn mirror_proximity(
    sensor: Option<&mut (dyn ProximitySource + '_)>,
    vehicle: &VehicleState,
) -> MirrorProximity {
    sensor
        .map(|s| MirrorProximity::from_entities(&s.sample(), &vehicle.position))
        .unwrap_or_default()
}
