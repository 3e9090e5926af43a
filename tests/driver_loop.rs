//! Driver task lifecycle against a scripted car bus

mod common;

use anyhow::Result;
use async_trait::async_trait;
use cockpit::{
    CarBus, Cockpit, CockpitError, Driver, HardwareInventory, MemoryStore, Peripherals,
    TickInput, TickOutput, UpdateRate,
};
use common::{Radio, at, config, flat_out};
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const PERIOD: Duration = Duration::from_millis(10);

#[derive(Clone, Copy)]
enum Script {
    /// Replay the queued inputs, then end the session.
    Queue,
    /// Cruise forever.
    Endless,
    /// Every read fails.
    Broken,
}

struct FakeBus {
    script: Script,
    inputs: VecDeque<TickInput>,
    radio: Radio,
    store: MemoryStore,
    reads: Arc<AtomicUsize>,
    applied: Arc<AtomicUsize>,
}

impl FakeBus {
    fn new(script: Script, inputs: impl IntoIterator<Item = TickInput>) -> Self {
        Self {
            script,
            inputs: inputs.into_iter().collect(),
            radio: Radio::default(),
            store: MemoryStore::default(),
            reads: Arc::new(AtomicUsize::new(0)),
            applied: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl CarBus for FakeBus {
    async fn read(&mut self) -> cockpit::Result<Option<TickInput>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Queue => Ok(self.inputs.pop_front()),
            Script::Endless => Ok(Some(TickInput::new(flat_out(30.0)))),
            Script::Broken => Err(CockpitError::bus_error("controller not responding")),
        }
    }

    async fn apply(&mut self, _output: &TickOutput) -> cockpit::Result<()> {
        self.applied.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn peripherals(&mut self) -> Peripherals<'_> {
        Peripherals::new(&mut self.radio, &mut self.store)
    }
}

fn booted() -> Cockpit {
    Cockpit::boot(config(), &HardwareInventory::complete(), &MemoryStore::default())
}

#[tokio::test(start_paused = true)]
async fn session_end_returns_the_cockpit() -> Result<()> {
    let inputs = (0..4)
        .map(|_| TickInput::new(flat_out(50.0)))
        .chain([TickInput::new(flat_out(50.0)).with_argument("DRS_ON")]);
    let bus = FakeBus::new(Script::Queue, inputs);
    let applied = Arc::clone(&bus.applied);

    let channels = Driver::spawn(booted(), bus, PERIOD);
    let cockpit = channels.task.await?;

    assert_eq!(applied.load(Ordering::SeqCst), 5);
    assert!(cockpit.assists().drs);
    assert!(channels.outputs.borrow().is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_the_task() -> Result<()> {
    let bus = FakeBus::new(Script::Endless, []);
    let applied = Arc::clone(&bus.applied);

    let mut channels = Driver::spawn(booted(), bus, PERIOD);
    for _ in 0..3 {
        channels.outputs.changed().await?;
    }
    let latest = channels.latest().expect("output after a tick");
    assert_eq!(latest.dashboard.speed, 30.0);

    channels.cancel.cancel();
    let cockpit = channels.task.await?;

    assert!(applied.load(Ordering::SeqCst) >= 3);
    assert!(!cockpit.is_halted());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn repeated_bus_errors_stop_the_driver() -> Result<()> {
    let bus = FakeBus::new(Script::Broken, []);
    let reads = Arc::clone(&bus.reads);
    let applied = Arc::clone(&bus.applied);

    let channels = Driver::spawn(booted(), bus, PERIOD);
    channels.task.await?;

    assert_eq!(reads.load(Ordering::SeqCst), cockpit::driver::MAX_BUS_ERRORS as usize);
    assert_eq!(applied.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn halted_cockpit_never_applies() -> Result<()> {
    let inventory = HardwareInventory { suspensions: 3, ..HardwareInventory::complete() };
    let halted = Cockpit::boot(config(), &inventory, &MemoryStore::default());
    let bus = FakeBus::new(Script::Endless, []);
    let applied = Arc::clone(&bus.applied);

    let channels = Driver::spawn(halted, bus, PERIOD);
    let cockpit = channels.task.await?;

    assert!(cockpit.is_halted());
    assert_eq!(applied.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn sampled_subscription_sees_fewer_outputs() -> Result<()> {
    let ticks = 50;
    let bus = FakeBus::new(Script::Queue, (0..ticks).map(|_| TickInput::new(at(10.0))));

    let channels = Driver::spawn(booted(), bus, PERIOD);
    let sampled = channels.subscribe(UpdateRate::Max(10));
    let native = channels.subscribe(UpdateRate::Max(1000));

    let (sampled, native) = tokio::join!(
        sampled.collect::<Vec<_>>(),
        native.collect::<Vec<_>>()
    );
    channels.task.await?;

    assert!(!sampled.is_empty());
    assert!(sampled.len() < ticks);
    assert!(!native.is_empty());
    assert!(native.len() <= ticks);
    assert!(native.iter().all(|output| output.hud_text == "P0"));
    Ok(())
}
