//! Node configuration parameters
//!
//! All tunable parameters for the river-level node.
//! Values can be overridden via NVS or an operator-supplied JSON file.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::decision::HeartbeatPolicy;
use crate::error::ErrorKind;
use crate::Measurement;

/// Longest cadence accepted: one day between samples.
const MAX_CADENCE_MS: i64 = 86_400_000;

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Cadence ---
    /// Normal delay between measurement cycles (milliseconds)
    pub cadence_ms: u32,
    /// Delay while accelerated mode is active (milliseconds)
    pub accelerated_cadence_ms: u32,

    // --- Thresholds (millimetres of river depth) ---
    /// Depth at or above which accelerated mode engages.
    /// Default 20 m is out of sensor range, i.e. never.
    pub acceleration_threshold_mm: Measurement,
    /// Readings below this depth are never transmitted
    pub ignore_threshold_mm: Measurement,

    // --- Heartbeat ---
    pub heartbeat: HeartbeatPolicy,

    // --- Calibration ---
    /// Millimetres per raw sensor count
    pub calibration_factor: i32,
    /// How long boot waits for the operator baseline (seconds)
    pub calibration_timeout_secs: u32,

    // --- Sensor ---
    /// Minimum change from the last sent depth worth transmitting (mm)
    pub min_change_mm: Measurement,

    // --- Battery ---
    /// Raw ADC samples averaged per voltage read
    pub battery_samples: u8,
    /// Delay between battery samples (milliseconds)
    pub battery_sample_interval_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Cadence
            cadence_ms: 5000,
            accelerated_cadence_ms: 1000,

            // Thresholds
            acceleration_threshold_mm: 20_000,
            ignore_threshold_mm: 0,

            // Heartbeat
            heartbeat: HeartbeatPolicy::EveryIdleCycle,

            // Calibration
            calibration_factor: 5,
            calibration_timeout_secs: 600,

            // Sensor
            min_change_mm: 10,

            // Battery
            battery_samples: 5,
            battery_sample_interval_ms: 1000,
        }
    }
}

impl NodeConfig {
    /// Range-check every field. Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cadence_ms == 0 || i64::from(self.cadence_ms) > MAX_CADENCE_MS {
            return Err(ConfigError::ValidationFailed("cadence_ms must be 1–86400000"));
        }
        if self.accelerated_cadence_ms == 0 || i64::from(self.accelerated_cadence_ms) > MAX_CADENCE_MS {
            return Err(ConfigError::ValidationFailed(
                "accelerated_cadence_ms must be 1–86400000",
            ));
        }
        if self.acceleration_threshold_mm < 0 {
            return Err(ConfigError::ValidationFailed(
                "acceleration_threshold_mm must be >= 0",
            ));
        }
        if self.ignore_threshold_mm < 0 {
            return Err(ConfigError::ValidationFailed("ignore_threshold_mm must be >= 0"));
        }
        if self.calibration_factor <= 0 {
            return Err(ConfigError::ValidationFailed("calibration_factor must be > 0"));
        }
        if self.calibration_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "calibration_timeout_secs must be > 0",
            ));
        }
        if self.min_change_mm < 0 {
            return Err(ConfigError::ValidationFailed("min_change_mm must be >= 0"));
        }
        if !(1..=16).contains(&self.battery_samples) {
            return Err(ConfigError::ValidationFailed("battery_samples must be 1–16"));
        }
        Ok(())
    }

    pub fn cadence(&self) -> Duration {
        Duration::from_millis(u64::from(self.cadence_ms))
    }

    pub fn accelerated_cadence(&self) -> Duration {
        Duration::from_millis(u64::from(self.accelerated_cadence_ms))
    }

    pub fn calibration_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.calibration_timeout_secs))
    }
}

/// Validate a runtime cadence change. Accepts signed input so a bad
/// value from the field is reported instead of silently wrapping.
pub fn checked_cadence_ms(ms: i64) -> Result<Duration, ErrorKind> {
    if ms <= 0 {
        return Err(ErrorKind::InvalidConfig("cadence must be positive"));
    }
    if ms > MAX_CADENCE_MS {
        return Err(ErrorKind::InvalidConfig("cadence must not exceed one day"));
    }
    Ok(Duration::from_millis(ms as u64))
}

/// Validate a runtime depth threshold change.
pub fn checked_threshold_mm(mm: Measurement) -> Result<Measurement, ErrorKind> {
    if mm < 0 {
        return Err(ErrorKind::InvalidConfig("threshold must be non-negative"));
    }
    Ok(mm)
}
