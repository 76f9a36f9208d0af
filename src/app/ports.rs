//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TelemetryController (domain)
//! ```
//!
//! Driven adapters (depth sensor, LoRaWAN radio, SD log, serial console,
//! NVS) implement these traits. The
//! [`TelemetryController`](super::service::TelemetryController) consumes
//! them via generics, so the decision core never touches hardware directly.
//!
//! All calls are blocking and bounded in time; the controller performs at
//! most one transport attempt per cycle and never retries on its own.

use core::time::Duration;

use crate::config::NodeConfig;
use crate::Measurement;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// River depth sensor.
///
/// The sensor owns the "worth sending" delta policy and tracks the last
/// transmitted value itself; the controller only tells it when a send
/// was confirmed.
pub trait SensorPort {
    /// Current river depth in millimetres, relative to the calibrated offset.
    fn current_measurement(&mut self) -> Measurement;

    /// One raw, unconverted sensor count (used once for calibration).
    fn raw_sample(&mut self) -> i32;

    /// Does `candidate` differ enough from the last sent value to transmit?
    fn is_worth_sending(&self, candidate: Measurement) -> bool;

    /// Record a confirmed transmission.
    fn set_last_sent(&mut self, value: Measurement);

    /// Install the zero reference established at calibration.
    fn set_depth_offset(&mut self, offset: Measurement);
}

// ───────────────────────────────────────────────────────────────
// Battery port
// ───────────────────────────────────────────────────────────────

/// Smoothed battery voltage source.
pub trait BatteryPort {
    /// Battery voltage in volts, already averaged and divider-scaled.
    fn read_battery_voltage(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → radio)
// ───────────────────────────────────────────────────────────────

/// Outcome of a transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    SendFailed,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

/// LoRaWAN (or any) uplink.
pub trait TransportPort {
    /// Join the network. Called once at boot.
    fn join(&mut self) -> Status;

    /// Uplink a depth reading plus the battery power byte.
    fn send_reading(&mut self, value: Measurement, power: u8) -> Status;

    /// Uplink a liveness beacon carrying only the power byte.
    fn send_heartbeat(&mut self, power: u8) -> Status;
}

// ───────────────────────────────────────────────────────────────
// Persistent log port
// ───────────────────────────────────────────────────────────────

/// Append-only local record (SD card in production).
///
/// Best-effort: implementations swallow and log their own failures so the
/// decision logic never sees them.
pub trait ReadingLog {
    /// Record a value that was successfully transmitted.
    fn append_reading(&mut self, value: Measurement);

    /// Record a measurement that was observed but not transmitted.
    fn record_measurement(&mut self, value: Measurement);
}

// ───────────────────────────────────────────────────────────────
// Operator input port
// ───────────────────────────────────────────────────────────────

/// The operator supplies the starting river depth over the serial console.
pub trait OperatorInput {
    /// Block until an integer baseline arrives or `timeout` passes.
    fn read_baseline(&mut self, timeout: Duration) -> Option<i32>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists node configuration.
///
/// Implementations MUST validate before persisting and reject invalid
/// ranges with [`ConfigError::ValidationFailed`], not clamp them.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`NodeConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<NodeConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &NodeConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}
