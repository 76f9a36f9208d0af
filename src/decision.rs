//! Per-cycle send decision.
//!
//! Given a measurement, the sensor's change-worthiness verdict and the
//! current idle streak, pick exactly one [`Action`]. The functions here are
//! pure: counters and `last_sent` only move when the controller commits the
//! outcome of a cycle, so deciding twice on the same input is idempotent.

use serde::{Deserialize, Serialize};

use crate::Measurement;

/// Idle-cycle count used by the historical batched heartbeat variant.
pub const BATCHED_HEARTBEAT_IDLE_CYCLES: u16 = 24;

/// What the node does with one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Transmit the measurement together with the battery power byte.
    SendReading { value: Measurement, power: u8 },
    /// Transmit a liveness beacon carrying only the power byte.
    SendHeartbeat { power: u8 },
    /// Transmit nothing; the measurement is only written to the local log.
    Suppress,
}

/// When an idle cycle (no reading sent) produces a heartbeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeartbeatPolicy {
    /// A heartbeat on every idle cycle.
    #[default]
    EveryIdleCycle,
    /// Stay silent until `n` consecutive idle cycles have passed, then
    /// send one heartbeat.
    AfterIdleCycles(u16),
}

impl HeartbeatPolicy {
    /// Whether an idle cycle with `idle_cycles` already counted is due.
    pub fn heartbeat_due(self, idle_cycles: u16) -> bool {
        match self {
            Self::EveryIdleCycle => true,
            Self::AfterIdleCycles(n) => idle_cycles >= n,
        }
    }
}

/// Inputs to one decision, gathered by the controller.
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput {
    pub measurement: Measurement,
    /// Sensor verdict: differs meaningfully from the last sent value.
    pub worth_sending: bool,
    pub ignore_threshold: Measurement,
    pub heartbeat: HeartbeatPolicy,
    pub idle_cycles: u16,
    pub power: u8,
}

/// A reading is eligible when it is worth sending and not below the
/// ignore floor. The floor is inclusive.
pub fn reading_eligible(measurement: Measurement, worth_sending: bool, ignore_threshold: Measurement) -> bool {
    worth_sending && measurement >= ignore_threshold
}

/// Choose the action for one cycle.
pub fn decide(input: &DecisionInput) -> Action {
    if reading_eligible(input.measurement, input.worth_sending, input.ignore_threshold) {
        Action::SendReading {
            value: input.measurement,
            power: input.power,
        }
    } else if input.heartbeat.heartbeat_due(input.idle_cycles) {
        Action::SendHeartbeat { power: input.power }
    } else {
        Action::Suppress
    }
}
