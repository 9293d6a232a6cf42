//! Gauge: last written value plus running min/max.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

/// Serializable view of a gauge. `count` is the current value, after the
/// Dropwizard naming this family keeps.
#[derive(Debug, Clone, Serialize)]
pub struct GaugeSnapshot {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
struct GaugeState {
    value: f64,
    min: f64,
    max: f64,
    set: bool,
}

/// A simple registered value with statistics (min and max) over its history.
#[derive(Default)]
pub struct Gauge {
    state: Mutex<GaugeState>,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, GaugeState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Register a new value and update the statistics.
    pub fn mark(&self, value: f64) {
        let mut state = self.state();
        if state.set {
            state.value = value;
            state.min = state.min.min(value);
            state.max = state.max.max(value);
        } else {
            *state = GaugeState {
                value,
                min: value,
                max: value,
                set: true,
            };
        }
    }

    /// Current value, `None` until the first mark.
    pub fn value(&self) -> Option<f64> {
        let state = self.state();
        state.set.then_some(state.value)
    }

    /// Minimum value ever registered.
    pub fn min(&self) -> Option<f64> {
        let state = self.state();
        state.set.then_some(state.min)
    }

    /// Maximum value ever registered.
    pub fn max(&self) -> Option<f64> {
        let state = self.state();
        state.set.then_some(state.max)
    }

    pub fn snapshot(&self) -> GaugeSnapshot {
        let state = self.state();
        GaugeSnapshot {
            min: state.set.then_some(state.min),
            max: state.set.then_some(state.max),
            count: state.set.then_some(state.value),
        }
    }
}
