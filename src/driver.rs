//! Driver runs a cockpit at a fixed rate on a tokio task

use futures::StreamExt;
use futures::future::ready;
use futures::stream::BoxStream;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_stream::wrappers::{IntervalStream, WatchStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::cockpit::{Cockpit, Peripherals, TickInput, TickOutput};
use crate::{Result, UpdateRate};

/// Consecutive bus errors tolerated before the driver gives up.
pub const MAX_BUS_ERRORS: u32 = 10;

/// Connection to the car blocks.
///
/// The bus reads controller state, exposes the sensors and message channel
/// polled during a tick, and applies the resulting actuator targets.
#[async_trait::async_trait]
pub trait CarBus: Send + 'static {
    /// Next reading. `Ok(None)` ends the session.
    async fn read(&mut self) -> Result<Option<TickInput>>;

    /// Apply one tick's output to the car.
    async fn apply(&mut self, output: &TickOutput) -> Result<()>;

    /// Capabilities polled synchronously inside the tick.
    fn peripherals(&mut self) -> Peripherals<'_>;
}

/// Handles returned by [`Driver::spawn`].
pub struct DriverChannels {
    /// Latest tick output, `None` before the first tick and after the end.
    pub outputs: watch::Receiver<Option<Arc<TickOutput>>>,
    /// Cancellation token for graceful shutdown.
    pub cancel: CancellationToken,
    /// Resolves to the cockpit once the driver stops.
    pub task: JoinHandle<Cockpit>,
    tick_hz: f64,
}

impl DriverChannels {
    /// Stream tick outputs at most at `rate`, latest wins.
    ///
    /// Leading `None`s are skipped while the first tick is pending; the
    /// stream ends when the driver stops.
    pub fn subscribe(&self, rate: UpdateRate) -> BoxStream<'static, Arc<TickOutput>> {
        match rate.sample_interval(self.tick_hz) {
            None => WatchStream::new(self.outputs.clone())
                .skip_while(|opt| ready(opt.is_none()))
                .take_while(|opt| ready(opt.is_some()))
                .filter_map(ready)
                .boxed(),
            Some(period) => {
                let mut outputs = self.outputs.clone();
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                IntervalStream::new(ticker)
                    .map(move |_| match outputs.has_changed() {
                        Ok(true) => Sample::Fresh(outputs.borrow_and_update().clone()),
                        Ok(false) => Sample::Stale,
                        Err(_) => Sample::Closed,
                    })
                    .take_while(|sample| ready(!matches!(sample, Sample::Closed | Sample::Fresh(None))))
                    .filter_map(|sample| {
                        ready(match sample {
                            Sample::Fresh(output) => output,
                            Sample::Stale | Sample::Closed => None,
                        })
                    })
                    .boxed()
            }
        }
    }

    /// Most recent output, if any.
    pub fn latest(&self) -> Option<Arc<TickOutput>> {
        self.outputs.borrow().clone()
    }
}

/// Pause after the `error_count`th consecutive bus error: 50ms, 100ms,
/// 200ms, ... capped at 1.6s.
fn bus_backoff(error_count: u32) -> Duration {
    Duration::from_millis(50 << error_count.saturating_sub(1).min(5))
}

enum Sample {
    Fresh(Option<Arc<TickOutput>>),
    Stale,
    Closed,
}

/// Spawns the tick loop.
pub struct Driver;

impl Driver {
    /// Run `cockpit` against `bus` once every `period`.
    pub fn spawn<B>(cockpit: Cockpit, bus: B, period: Duration) -> DriverChannels
    where
        B: CarBus,
    {
        let (output_tx, output_rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        let task = tokio::spawn(async move {
            Self::tick_task(cockpit, bus, period, output_tx, cancel_task).await
        });

        DriverChannels {
            outputs: output_rx,
            cancel,
            task,
            tick_hz: 1.0 / period.as_secs_f64(),
        }
    }

    async fn tick_task<B>(
        mut cockpit: Cockpit,
        mut bus: B,
        period: Duration,
        output_tx: watch::Sender<Option<Arc<TickOutput>>>,
        cancel: CancellationToken,
    ) -> Cockpit
    where
        B: CarBus,
    {
        info!(?period, grid_name = cockpit.grid_name(), "Tick task started");
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut tick_count = 0u64;
        let mut error_count = 0u32;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Tick task cancelled");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Tick task cancelled during read");
                    break;
                }
                result = bus.read() => result,
            };

            let applied = match result {
                Ok(Some(input)) => {
                    let now = Instant::now().into_std();
                    let Some(output) = cockpit.tick(now, &input, &mut bus.peripherals()) else {
                        warn!("Cockpit halted, stopping tick task");
                        break;
                    };
                    tick_count += 1;
                    trace!(tick_count, hud = %output.hud_text, "Tick complete");

                    let applied = bus.apply(&output).await;
                    if output_tx.send(Some(Arc::new(output))).is_err() {
                        debug!("Output receiver dropped, shutting down");
                        break;
                    }
                    applied
                }
                Ok(None) => {
                    info!("Car bus ended after {} ticks", tick_count);
                    break;
                }
                Err(e) => Err(e),
            };

            match applied {
                Ok(()) => error_count = 0,
                Err(e) => {
                    error_count += 1;
                    error!("Car bus error ({}/{}): {}", error_count, MAX_BUS_ERRORS, e);

                    if error_count >= MAX_BUS_ERRORS {
                        error!("Too many car bus errors, shutting down");
                        break;
                    }

                    let backoff = bus_backoff(error_count);
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }

        let _ = output_tx.send(None);
        info!("Tick task ended ({} ticks)", tick_count);
        cockpit
    }
}
