//! Exponentially weighted moving average.

/// Moving average of an event rate, decayed at a fixed tick interval.
///
/// Events are accumulated with [`update`](Ewma::update) and folded into the
/// rate by [`tick`](Ewma::tick); the owner decides when ticks happen (see
/// [`Meter`](super::Meter)). The reported rate is in events per second.
pub struct Ewma {
    rate: f64,
    uncounted: u64,
    alpha: f64,
    interval_secs: f64,
    initialized: bool,
}

impl Ewma {
    /// Average over `minutes` with ticks every `interval_secs` seconds.
    pub fn new(minutes: f64, interval_secs: f64) -> Self {
        Self {
            rate: 0.0,
            uncounted: 0,
            alpha: 1.0 - (-interval_secs / 60.0 / minutes).exp(),
            interval_secs,
            initialized: false,
        }
    }

    /// Report `n` events since the last tick.
    pub fn update(&mut self, n: u64) {
        self.uncounted += n;
    }

    /// Mark the passage of one tick interval and decay the rate.
    pub fn tick(&mut self) {
        let instant_rate = self.uncounted as f64 / self.interval_secs;
        self.uncounted = 0;
        if self.initialized {
            self.rate += self.alpha * (instant_rate - self.rate);
        } else {
            self.rate = instant_rate;
            self.initialized = true;
        }
    }

    /// Current rate, events per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }
}
