//! vitals server library entry.
//!
//! This crate wires config, the metrics registry, the record-handler seam and
//! the HTTP route table into a runnable service. It is intended to be
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod handlers;
pub mod ops;
pub mod router;
