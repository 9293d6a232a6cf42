//! Metric instruments and the process registry.
//!
//! Modeled on the Dropwizard family: meters carry a total count plus
//! 1/5/15-minute moving rates, histograms sample into an exponentially
//! decaying reservoir, gauges track a last value with running min/max.
//! Instruments are created lazily by the [`Registry`] and shared as `Arc`s;
//! all of them tolerate concurrent updates.

mod ewma;
mod gauge;
mod histogram;
mod meter;
mod registry;

pub use ewma::Ewma;
pub use gauge::{Gauge, GaugeSnapshot};
pub use histogram::{Histogram, HistogramSnapshot, WeightedSnapshot};
pub use meter::{Meter, MeterSnapshot};
pub use registry::{Registry, RegistrySnapshot};
