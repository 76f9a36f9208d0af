//! Inbound commands to the telemetry controller.
//!
//! These represent configuration changes requested by the outside world
//! (serial console, downlink, boot-time config file) that the
//! [`TelemetryController`](super::service::TelemetryController) validates
//! and applies.

use crate::config::NodeConfig;
use crate::decision::HeartbeatPolicy;
use crate::Measurement;

/// Commands that external adapters can send into the application core.
///
/// Inputs are signed on purpose: a negative value from the field must be
/// rejected, not wrapped into a huge unsigned one.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Change the normal-mode delay between cycles (milliseconds).
    SetCadence(i64),

    /// Change the accelerated-mode delay between cycles (milliseconds).
    SetAcceleratedCadence(i64),

    /// Change the depth that engages accelerated mode (mm).
    SetAccelerationThreshold(Measurement),

    /// Change the depth below which readings are never sent (mm).
    SetIgnoreThreshold(Measurement),

    /// Switch between per-cycle and batched heartbeats.
    SetHeartbeatPolicy(HeartbeatPolicy),

    /// Replace the whole runtime configuration (validated first).
    UpdateConfig(NodeConfig),

    /// Persist the current configuration through the config port.
    SaveConfig,
}
