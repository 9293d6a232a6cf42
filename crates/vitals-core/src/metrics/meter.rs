//! Event meter: total count plus decayed 1/5/15-minute rates.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;

use super::ewma::Ewma;

const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Serializable view of a meter.
#[derive(Debug, Clone, Serialize)]
pub struct MeterSnapshot {
    pub count: u64,
    pub mean: f64,
    pub rate1: f64,
    pub rate5: f64,
    pub rate15: f64,
}

/// Measures the rate of occurrence of an event.
///
/// Each event is reported with [`mark`](Meter::mark); moving rates decay as
/// time passes, the count never does.
pub struct Meter {
    count: AtomicU64,
    start: Instant,
    rates: Mutex<Rates>,
}

struct Rates {
    ewma1: Ewma,
    ewma5: Ewma,
    ewma15: Ewma,
    last_tick: Instant,
}

impl Rates {
    /// Catch up on tick intervals that elapsed since the last update.
    fn tick_if_necessary(&mut self, now: Instant) {
        while now.duration_since(self.last_tick) > TICK_INTERVAL {
            self.last_tick += TICK_INTERVAL;
            self.ewma1.tick();
            self.ewma5.tick();
            self.ewma15.tick();
        }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

impl Meter {
    pub fn new() -> Self {
        let now = Instant::now();
        let interval = TICK_INTERVAL.as_secs_f64();
        Self {
            count: AtomicU64::new(0),
            start: now,
            rates: Mutex::new(Rates {
                ewma1: Ewma::new(1.0, interval),
                ewma5: Ewma::new(5.0, interval),
                ewma15: Ewma::new(15.0, interval),
                last_tick: now,
            }),
        }
    }

    fn rates(&self) -> MutexGuard<'_, Rates> {
        // A poisoned lock only means another thread panicked mid-update;
        // the rate state is still usable.
        self.rates.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Indicate an event has just occurred.
    pub fn mark(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
        let mut rates = self.rates();
        rates.tick_if_necessary(Instant::now());
        rates.ewma1.update(1);
        rates.ewma5.update(1);
        rates.ewma15.update(1);
    }

    /// Number of events reported since this meter was created.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Count divided by the meter's lifetime, events per second.
    ///
    /// Returns 0.0 until enough time has passed for the division to mean
    /// anything (100 ms).
    pub fn mean_rate(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        let elapsed = self.start.elapsed().as_secs_f64();
        if elapsed <= 0.1 {
            return 0.0;
        }
        count as f64 / elapsed
    }

    /// 1-minute moving average rate.
    pub fn rate1(&self) -> f64 {
        let mut rates = self.rates();
        rates.tick_if_necessary(Instant::now());
        rates.ewma1.rate()
    }

    /// 5-minute moving average rate.
    pub fn rate5(&self) -> f64 {
        let mut rates = self.rates();
        rates.tick_if_necessary(Instant::now());
        rates.ewma5.rate()
    }

    /// 15-minute moving average rate.
    pub fn rate15(&self) -> f64 {
        let mut rates = self.rates();
        rates.tick_if_necessary(Instant::now());
        rates.ewma15.rate()
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            count: self.count(),
            mean: self.mean_rate(),
            rate1: self.rate1(),
            rate5: self.rate5(),
            rate15: self.rate15(),
        }
    }
}
