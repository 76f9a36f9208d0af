//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the decision rules for the river-level node:
//! calibration, send decision, cadence switching and configuration.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
