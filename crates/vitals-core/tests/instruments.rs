#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use vitals_core::metrics::{Ewma, Gauge, Histogram, Meter};

#[test]
fn ewma_first_tick_sets_rate_directly() {
    // 1-minute average, 5-second ticks: two events in one interval.
    let mut e = Ewma::new(1.0, 5.0);
    e.update(2);
    e.tick();
    assert!((e.rate() - 0.4).abs() < 1e-9);
}

#[test]
fn ewma_decays_on_empty_ticks() {
    let mut e = Ewma::new(1.0, 5.0);
    e.update(2);
    e.tick();
    e.tick();
    // alpha = 1 - exp(-5/60) for the 1-minute average
    assert!((e.rate() - 0.368017).abs() < 1e-4);
}

#[test]
fn meter_counts_marks() {
    let m = Meter::new();
    assert_eq!(m.count(), 0);
    assert_eq!(m.mean_rate(), 0.0);

    for _ in 0..7 {
        m.mark();
    }
    assert_eq!(m.count(), 7);

    // No 5s tick boundary has passed, so moving rates are still warming up.
    assert_eq!(m.rate1(), 0.0);
    assert_eq!(m.rate5(), 0.0);
    assert_eq!(m.rate15(), 0.0);
}

#[test]
fn meter_concurrent_marks_do_not_lose_counts() {
    use std::sync::Arc;
    use std::thread;

    let m = Arc::new(Meter::new());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let m = Arc::clone(&m);
        handles.push(thread::spawn(move || {
            for _ in 0..1000 {
                m.mark();
            }
        }));
    }
    for h in handles {
        h.join().expect("mark thread panicked");
    }
    assert_eq!(m.count(), 8000);
}

#[test]
fn histogram_sequential_values() {
    let h = Histogram::new();
    for i in 1..=100 {
        h.update(i as f64);
    }

    assert_eq!(h.count(), 100);
    let s = h.weighted_snapshot();
    assert_eq!(s.size(), 100);
    assert_eq!(s.min(), 1.0);
    assert_eq!(s.max(), 100.0);
    // All samples were recorded within milliseconds, so the decay weights are
    // effectively equal and the stats match the plain versions.
    assert!((s.mean() - 50.5).abs() < 0.5);
    assert!((s.stddev() - 28.9).abs() < 0.5);
    assert!((s.quantile(0.5).unwrap() - 50.5).abs() < 1.5);
    assert!((s.quantile(0.25).unwrap() - 26.5).abs() < 1.5);
}

#[test]
fn histogram_distribution_is_even_for_uniform_values() {
    let h = Histogram::new();
    for i in 1..=100 {
        h.update(i as f64);
    }
    let s = h.weighted_snapshot();
    assert_eq!(s.distribution(10), vec![10; 10]);
    assert_eq!(s.distribution(20), vec![5; 20]);
}

#[test]
fn histogram_quantile_rejects_out_of_range() {
    let h = Histogram::new();
    h.update(1.0);
    let s = h.weighted_snapshot();
    assert!(s.quantile(-0.1).is_err());
    assert!(s.quantile(1.5).is_err());
    assert!(s.quantile(f64::NAN).is_err());
}

#[test]
fn histogram_empty_snapshot_reports_zeros() {
    let h = Histogram::new();
    let s = h.weighted_snapshot();
    assert_eq!(s.size(), 0);
    assert_eq!(s.min(), 0.0);
    assert_eq!(s.max(), 0.0);
    assert_eq!(s.mean(), 0.0);
    assert_eq!(s.stddev(), 0.0);
    assert_eq!(s.quantile(0.5).unwrap(), 0.0);
}

#[test]
fn histogram_reservoir_caps_retained_samples() {
    let h = Histogram::new();
    for i in 0..3000 {
        h.update(i as f64);
    }
    assert_eq!(h.count(), 3000);
    assert_eq!(h.weighted_snapshot().size(), 1028);
}

#[test]
fn gauge_tracks_min_and_max() {
    let g = Gauge::new();
    assert_eq!(g.value(), None);

    g.mark(10.0);
    g.mark(15.0);
    g.mark(20.0);
    g.mark(12.0);

    assert_eq!(g.value(), Some(12.0));
    assert_eq!(g.min(), Some(10.0));
    assert_eq!(g.max(), Some(20.0));
}
