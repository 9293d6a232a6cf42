//! Histogram over an exponentially decaying reservoir.
//!
//! Forward-decaying priority sampling: each sample gets weight
//! `exp(alpha * age)` and priority `weight / u` for uniform `u`, and the
//! reservoir keeps the highest-priority samples. Recent samples are thereby
//! exponentially more likely to survive, so snapshots reflect recent traffic
//! rather than the whole process lifetime.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;

use crate::error::{Result, VitalsError};

const RESERVOIR_SIZE: usize = 1028;
const ALPHA: f64 = 0.015;
const RESCALE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Total-order wrapper so f64 priorities can key the reservoir map.
#[derive(Debug, Clone, Copy)]
struct Priority(f64);

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct WeightedSample {
    value: f64,
    weight: f64,
}

struct Reservoir {
    values: BTreeMap<Priority, WeightedSample>,
    start: Instant,
    last_rescale: Instant,
    rescale_interval: Duration,
}

impl Reservoir {
    fn new() -> Self {
        Self::with_rescale_interval(RESCALE_INTERVAL)
    }

    fn with_rescale_interval(rescale_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            values: BTreeMap::new(),
            start: now,
            last_rescale: now,
            rescale_interval,
        }
    }

    fn update(&mut self, value: f64) {
        self.rescale_if_necessary();

        let age = self.start.elapsed().as_secs_f64();
        let weight = (ALPHA * age).exp();
        let u: f64 = rand::rng().random::<f64>().max(f64::MIN_POSITIVE);
        let priority = Priority(weight / u);
        let sample = WeightedSample { value, weight };

        if self.values.len() < RESERVOIR_SIZE {
            self.values.insert(priority, sample);
            return;
        }

        // At capacity: the new sample only enters by evicting the lowest
        // priority currently held.
        let Some(lowest) = self.values.keys().next().copied() else {
            return;
        };
        if lowest < priority && self.values.insert(priority, sample).is_none() {
            self.values.remove(&lowest);
        }
    }

    fn rescale_if_necessary(&mut self) {
        while self.last_rescale.elapsed() > self.rescale_interval {
            self.last_rescale += self.rescale_interval;
            self.rescale();
        }
    }

    /// Decay every held sample by one rescale period and advance the epoch,
    /// keeping priorities comparable across hours of uptime.
    fn rescale(&mut self) {
        let factor = (-ALPHA * self.rescale_interval.as_secs_f64()).exp();
        let old = std::mem::take(&mut self.values);
        let before = old.len();
        for (priority, sample) in old {
            let weight = sample.weight * factor;
            if weight == 0.0 {
                continue;
            }
            self.values.insert(
                Priority(priority.0 * factor),
                WeightedSample {
                    value: sample.value,
                    weight,
                },
            );
        }
        self.start += self.rescale_interval;
        tracing::debug!(before, after = self.values.len(), "reservoir rescaled");
    }

    fn snapshot(&mut self) -> WeightedSnapshot {
        self.rescale_if_necessary();
        WeightedSnapshot::new(self.values.values().map(|s| (s.value, s.weight)))
    }
}

/// A weighted copy of the reservoir contents, fixed at snapshot time.
///
/// Gives access to order statistics; the weights only matter for
/// [`mean`](WeightedSnapshot::mean), [`stddev`](WeightedSnapshot::stddev) and
/// [`quantile`](WeightedSnapshot::quantile).
pub struct WeightedSnapshot {
    values: Vec<f64>,
    norm_weights: Vec<f64>,
    quantiles: Vec<f64>,
}

impl WeightedSnapshot {
    fn new(samples: impl Iterator<Item = (f64, f64)>) -> Self {
        let mut copy: Vec<(f64, f64)> = samples.collect();
        copy.sort_by(|a, b| a.0.total_cmp(&b.0));

        let sum_weight: f64 = copy.iter().map(|(_, w)| w).sum();
        let values: Vec<f64> = copy.iter().map(|(v, _)| *v).collect();
        let norm_weights: Vec<f64> = copy
            .iter()
            .map(|(_, w)| if sum_weight != 0.0 { w / sum_weight } else { 0.0 })
            .collect();

        let mut quantiles = vec![0.0; values.len()];
        for i in 1..values.len() {
            quantiles[i] = quantiles[i - 1] + norm_weights[i - 1];
        }

        Self {
            values,
            norm_weights,
            quantiles,
        }
    }

    /// Number of values in this snapshot.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Minimum value, 0.0 when empty.
    pub fn min(&self) -> f64 {
        self.values.first().copied().unwrap_or(0.0)
    }

    /// Maximum value, 0.0 when empty.
    pub fn max(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }

    /// Weighted average of the values.
    pub fn mean(&self) -> f64 {
        self.values
            .iter()
            .zip(&self.norm_weights)
            .map(|(v, w)| v * w)
            .sum()
    }

    /// Weighted standard deviation, 0.0 for one value or fewer.
    pub fn stddev(&self) -> f64 {
        if self.values.len() <= 1 {
            return 0.0;
        }
        let mean = self.mean();
        let variance: f64 = self
            .values
            .iter()
            .zip(&self.norm_weights)
            .map(|(v, w)| {
                let diff = v - mean;
                w * diff * diff
            })
            .sum();
        variance.sqrt()
    }

    /// Value at quantile `q`, the boundary between the weight mass below and
    /// above it. `q` must be within `[0, 1]`; an empty snapshot reports 0.0.
    pub fn quantile(&self, q: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&q) {
            return Err(VitalsError::BadRequest(format!(
                "quantile {q} is not in [0..1]"
            )));
        }
        if self.values.is_empty() {
            return Ok(0.0);
        }

        let posx = self.quantiles.partition_point(|&x| x < q);
        if posx < 1 {
            return Ok(self.values[0]);
        }
        if posx >= self.values.len() {
            return Ok(self.values[self.values.len() - 1]);
        }
        Ok((self.values[posx] + self.values[posx - 1]) / 2.0)
    }

    /// Sample counts over `buckets` equal-width intervals spanning
    /// `[min, max]`. Weights are ignored here.
    pub fn distribution(&self, buckets: usize) -> Vec<usize> {
        let mut hist = Vec::new();
        if buckets == 0 {
            return hist;
        }
        let min = self.min();
        let max = self.max();
        let step = (max - min) / buckets as f64;
        let mut posy = 0;
        let mut x = min + step;
        while x < max {
            let nposy = self.values.partition_point(|&v| v < x);
            hist.push(nposy - posy);
            posy = nposy;
            x += step;
        }
        hist.push(self.values.len() - posy);
        hist
    }
}

/// Serializable summary of a histogram.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
}

/// Distribution of a set of recorded values.
///
/// `count` covers every value ever recorded; the statistics come from the
/// decaying reservoir and favor recent values.
pub struct Histogram {
    count: AtomicU64,
    reservoir: Mutex<Reservoir>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            reservoir: Mutex::new(Reservoir::new()),
        }
    }

    fn reservoir(&self) -> MutexGuard<'_, Reservoir> {
        self.reservoir.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Register a new value.
    pub fn update(&self, value: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.reservoir().update(value);
    }

    /// Number of values recorded since this histogram was created.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Weighted snapshot of the current reservoir contents.
    pub fn weighted_snapshot(&self) -> WeightedSnapshot {
        self.reservoir().snapshot()
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let snapshot = self.weighted_snapshot();
        HistogramSnapshot {
            count: self.count(),
            min: snapshot.min(),
            max: snapshot.max(),
            mean: snapshot.mean(),
            stddev: snapshot.stddev(),
        }
    }
}
