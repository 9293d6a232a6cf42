//! vitals core library.
//!
//! Metric instruments in the Dropwizard family (meter, histogram, gauge)
//! behind a get-or-create registry, plus the error type shared with the
//! server crate. Instruments are internally synchronized and meant to be
//! updated concurrently from request workers.

pub mod error;
pub mod metrics;
