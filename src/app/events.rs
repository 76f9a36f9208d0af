//! Outbound application events.
//!
//! The [`TelemetryController`](super::service::TelemetryController) emits
//! these through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them, e.g. log to serial, mirror to a
//! status LED, etc.

use core::time::Duration;

use crate::cadence::CadenceMode;
use crate::Measurement;

/// Which uplink a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UplinkKind {
    Reading,
    Heartbeat,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Calibration finished; carries the established depth offset.
    Calibrated { offset: Measurement },

    /// A depth reading was transmitted and confirmed.
    ReadingSent { value: Measurement, power: u8 },

    /// A heartbeat was transmitted and confirmed.
    HeartbeatSent { power: u8 },

    /// The cycle produced no uplink; the measurement was only logged.
    Suppressed { value: Measurement, idle_cycles: u16 },

    /// The transport rejected an uplink. Nothing was committed.
    TransmissionFailed { kind: UplinkKind },

    /// The sampling cadence switched mode.
    CadenceChanged {
        from: CadenceMode,
        to: CadenceMode,
        cadence: Duration,
    },

    /// Periodic battery snapshot.
    Battery { voltage: f32, power: u8, percent: u8 },
}
