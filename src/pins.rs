//! Peripheral assignments for the river-level node board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding channel numbers.

// ---------------------------------------------------------------------------
// Sensors: analog (ADC1)
// ---------------------------------------------------------------------------

/// Ultrasonic range finder analog output (5 mm per 10-bit count).
/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const DEPTH_ADC_CHANNEL: u32 = 4;

/// Battery sense through a 1:2 resistive divider.
/// ADC1 channel 7 (GPIO 8 on ESP32-S3).
pub const VBAT_ADC_CHANNEL: u32 = 7;

/// Number of ADC1 channels the simulation backend tracks.
pub const ADC1_CHANNELS: usize = 10;
