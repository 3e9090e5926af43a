//! Tick delta accounting

use std::time::{Duration, Instant};
use tracing::trace;

/// Turns tick timestamps into a guarded delta.
///
/// The first tick, a clock that did not move forward and a gap longer than
/// `max_delta` all count as one nominal frame.
#[derive(Debug, Clone)]
pub struct TickClock {
    last: Option<Instant>,
    nominal: Duration,
    max_delta: Duration,
}

impl Default for TickClock {
    /// 60 Hz frames, deltas up to one second.
    fn default() -> Self {
        Self::new(Duration::from_nanos(16_666_667), Duration::from_secs(1))
    }
}

impl TickClock {
    pub fn new(nominal: Duration, max_delta: Duration) -> Self {
        Self { last: None, nominal, max_delta }
    }

    /// Seconds since the previous tick.
    pub fn advance(&mut self, now: Instant) -> f32 {
        let raw = self.last.and_then(|last| now.checked_duration_since(last));
        self.last = Some(now);

        let delta = match raw {
            Some(delta) if !delta.is_zero() && delta <= self.max_delta => delta,
            _ => {
                trace!(?raw, "Irregular tick delta, using nominal frame");
                self.nominal
            }
        };
        delta.as_secs_f32()
    }
}

/// Whole milliseconds in `delta` seconds, the unit every countdown uses.
pub fn elapsed_ms(delta: f32) -> u32 {
    (delta.max(0.0) * 1000.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> TickClock {
        TickClock::new(Duration::from_millis(16), Duration::from_secs(1))
    }

    #[test]
    fn first_tick_is_one_frame() {
        let mut clock = clock();
        assert!((clock.advance(Instant::now()) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn regular_ticks_measure_real_time() {
        let mut clock = clock();
        let start = Instant::now();
        clock.advance(start);
        let delta = clock.advance(start + Duration::from_millis(250));
        assert!((delta - 0.25).abs() < 1e-6);
    }

    #[test]
    fn irregular_ticks_fall_back_to_nominal() {
        let mut clock = clock();
        let start = Instant::now() + Duration::from_secs(10);
        clock.advance(start);

        // Same timestamp
        assert!((clock.advance(start) - 0.016).abs() < 1e-6);
        // Clock went backwards
        assert!((clock.advance(start - Duration::from_secs(1)) - 0.016).abs() < 1e-6);
        // Huge gap
        let later = start + Duration::from_secs(30);
        assert!((clock.advance(later) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn elapsed_ms_truncates() {
        assert_eq!(elapsed_ms(0.0169), 16);
        assert_eq!(elapsed_ms(1.0), 1000);
        assert_eq!(elapsed_ms(-3.0), 0);
    }
}
