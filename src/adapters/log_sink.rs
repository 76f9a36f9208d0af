//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the node, stderr on host). Each event is
//! one line with a fixed tag so field logs can be grepped.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Calibrated { offset } => {
                info!("START | calibrated, bed offset={}mm", offset);
            }
            AppEvent::ReadingSent { value, power } => {
                info!("SEND  | depth={}mm power={}", value, power);
            }
            AppEvent::HeartbeatSent { power } => {
                info!("BEAT  | power={}", power);
            }
            AppEvent::Suppressed { value, idle_cycles } => {
                debug!("IDLE  | depth={}mm idle_cycles={}", value, idle_cycles);
            }
            AppEvent::TransmissionFailed { kind } => {
                warn!("FAIL  | {:?} uplink rejected", kind);
            }
            AppEvent::CadenceChanged { from, to, cadence } => {
                info!(
                    "MODE  | {:?} -> {:?}, cadence={}ms",
                    from,
                    to,
                    cadence.as_millis()
                );
            }
            AppEvent::Battery {
                voltage,
                power,
                percent,
            } => {
                debug!("BATT  | {:.2}V power={} {}%", voltage, power, percent);
            }
        }
    }
}
