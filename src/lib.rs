//! River-level telemetry node library.
//!
//! Exposes the decision core and its host-capable adapters for integration
//! testing and the driver binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod cadence;
pub mod config;
pub mod decision;
pub mod error;
pub mod power;

pub mod adapters;
pub mod drivers;
pub mod sensors;

pub mod pins;

/// River depth in millimetres.
pub type Measurement = i32;

pub use app::service::TelemetryController;
pub use error::{ErrorKind, Result};
