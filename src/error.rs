//! Unified error types for the river-level node.
//!
//! A single `ErrorKind` enum that every subsystem converts into, keeping the
//! driver loop's error handling uniform. All variants are `Copy` so they can
//! be carried in cycle reports and events without allocation.

use core::fmt;

use crate::app::ports::ConfigError;

/// Every fallible operation in the core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The transport reported a failed uplink. The cycle ends without any
    /// state update; the next cycle tries again.
    TransmissionFailed,
    /// No operator baseline arrived before the calibration timeout.
    /// Fatal to startup.
    CalibrationTimeout,
    /// A configuration value or mutator input is out of range.
    InvalidConfig(&'static str),
    /// The depth offset was already established for this boot.
    AlreadyCalibrated,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransmissionFailed => write!(f, "transmission failed"),
            Self::CalibrationTimeout => write!(f, "calibration timed out waiting for operator baseline"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::AlreadyCalibrated => write!(f, "depth offset already calibrated"),
        }
    }
}

impl core::error::Error for ErrorKind {}

impl From<ConfigError> for ErrorKind {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::InvalidConfig(msg),
            ConfigError::NotFound => Self::InvalidConfig("stored config not found"),
            ConfigError::Corrupted => Self::InvalidConfig("stored config corrupted"),
            ConfigError::IoError => Self::InvalidConfig("config storage I/O error"),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, ErrorKind>;
