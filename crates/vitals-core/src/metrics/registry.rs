//! Get-or-create instrument registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use super::{Gauge, GaugeSnapshot, Histogram, HistogramSnapshot, Meter, MeterSnapshot};

/// Serializable view of every instrument in a registry, keyed by name.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub meters: BTreeMap<String, MeterSnapshot>,
    pub histograms: BTreeMap<String, HistogramSnapshot>,
    pub gauges: BTreeMap<String, GaugeSnapshot>,
}

/// Mapping from metric name to instrument.
///
/// Instruments are created lazily on first reference and the same `Arc` is
/// handed out thereafter, concurrently callable from any worker. The registry
/// has no global instance; the composition root owns it and passes it to
/// whoever records into it.
#[derive(Default)]
pub struct Registry {
    meters: DashMap<String, Arc<Meter>>,
    histograms: DashMap<String, Arc<Histogram>>,
    gauges: DashMap<String, Arc<Gauge>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Meter registered under `name`, created on first use.
    pub fn meter(&self, name: &str) -> Arc<Meter> {
        self.meters
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Meter::new()))
            .clone()
    }

    /// Histogram registered under `name`, created on first use.
    pub fn histogram(&self, name: &str) -> Arc<Histogram> {
        self.histograms
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Histogram::new()))
            .clone()
    }

    /// Gauge registered under `name`, created on first use.
    pub fn gauge(&self, name: &str) -> Arc<Gauge> {
        self.gauges
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Gauge::new()))
            .clone()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            meters: self
                .meters
                .iter()
                .map(|e| (e.key().clone(), e.value().snapshot()))
                .collect(),
            histograms: self
                .histograms
                .iter()
                .map(|e| (e.key().clone(), e.value().snapshot()))
                .collect(),
            gauges: self
                .gauges
                .iter()
                .map(|e| (e.key().clone(), e.value().snapshot()))
                .collect(),
        }
    }
}
