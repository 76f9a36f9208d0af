//! Telemetry controller, the hexagonal core.
//!
//! [`TelemetryController`] owns the cadence policy, the send-decision
//! bookkeeping and the calibration offset. It exposes a clean,
//! hardware-agnostic API. All I/O flows through port traits passed into
//! each call, so the whole controller is testable with mock adapters.
//!
//! ```text
//!  SensorPort  ──▶ ┌──────────────────────────────┐ ──▶ TransportPort
//!  BatteryPort ──▶ │     TelemetryController      │ ──▶ ReadingLog
//!                  │ Decision · Cadence · Power   │ ──▶ EventSink
//!                  └──────────────────────────────┘
//! ```
//!
//! One call to [`run_cycle`](TelemetryController::run_cycle) is one
//! measurement cycle: measure, decide, attempt at most one uplink, commit
//! on success, evaluate the cadence threshold. The driver then sleeps for
//! [`current_cadence`](TelemetryController::current_cadence).

use core::time::Duration;

use log::{debug, info, warn};

use crate::cadence::{CadenceChange, CadencePolicy};
use crate::config::{checked_cadence_ms, checked_threshold_mm, NodeConfig};
use crate::decision::{self, Action, DecisionInput, HeartbeatPolicy};
use crate::error::{ErrorKind, Result};
use crate::power::{estimate_percentage, estimate_power_byte};
use crate::Measurement;

use super::commands::AppCommand;
use super::events::{AppEvent, UplinkKind};
use super::ports::{
    BatteryPort, ConfigPort, EventSink, OperatorInput, ReadingLog, SensorPort, Status,
    TransportPort,
};

// ───────────────────────────────────────────────────────────────
// State
// ───────────────────────────────────────────────────────────────

/// Mutable controller state. Single owner, lives for the device uptime.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub cadence: CadencePolicy,
    pub acceleration_threshold: Measurement,
    pub ignore_threshold: Measurement,
    /// Last value whose transmission was confirmed.
    pub last_sent_measurement: Option<Measurement>,
    /// Zero reference from calibration. Written exactly once.
    pub initial_depth_offset: Option<Measurement>,
}

impl ControllerState {
    fn from_config(config: &NodeConfig) -> Self {
        Self {
            cadence: CadencePolicy::new(config.cadence(), config.accelerated_cadence()),
            acceleration_threshold: config.acceleration_threshold_mm,
            ignore_threshold: config.ignore_threshold_mm,
            last_sent_measurement: None,
            initial_depth_offset: None,
        }
    }
}

/// What happened during one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub measurement: Measurement,
    pub action: Action,
    /// `Err(TransmissionFailed)` when the uplink was rejected. The driver
    /// keeps going either way.
    pub outcome: Result<()>,
    pub cadence_change: Option<CadenceChange>,
    /// How long the driver should sleep before the next cycle.
    pub next_delay: Duration,
}

// ───────────────────────────────────────────────────────────────
// TelemetryController
// ───────────────────────────────────────────────────────────────

/// The decision core of the node.
pub struct TelemetryController {
    config: NodeConfig,
    state: ControllerState,
    /// Consecutive cycles that produced neither a reading nor a heartbeat.
    idle_cycles: u16,
    cycle_count: u64,
    config_dirty: bool,
}

impl TelemetryController {
    /// Construct the controller from a validated configuration.
    ///
    /// Does **not** calibrate; call [`calibrate`](Self::calibrate) or
    /// [`initialize`](Self::initialize) before the first cycle.
    pub fn new(config: NodeConfig) -> Self {
        let state = ControllerState::from_config(&config);
        Self {
            config,
            state,
            idle_cycles: 0,
            cycle_count: 0,
            config_dirty: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Join the network. A failed join is logged but never aborts boot;
    /// uplinks will simply fail until the transport recovers.
    pub fn start(&mut self, transport: &mut impl TransportPort) -> Status {
        let status = transport.join();
        if status.is_ok() {
            info!("Network joined");
        } else {
            warn!("Network join failed, continuing unjoined");
        }
        status
    }

    /// Establish the depth offset from the operator baseline and one raw
    /// sensor sample: `baseline + raw * calibration_factor`.
    ///
    /// The offset is set once per boot; a second call fails with
    /// [`ErrorKind::AlreadyCalibrated`].
    pub fn initialize(&mut self, operator_baseline: i32, raw_sensor_sample: i32) -> Result<Measurement> {
        if self.state.initial_depth_offset.is_some() {
            return Err(ErrorKind::AlreadyCalibrated);
        }
        let offset = raw_sensor_sample
            .checked_mul(self.config.calibration_factor)
            .and_then(|distance| operator_baseline.checked_add(distance))
            .ok_or(ErrorKind::InvalidConfig("calibration offset out of range"))?;
        self.state.initial_depth_offset = Some(offset);
        info!(
            "Calibrated: baseline={}mm raw={} factor={} -> offset={}mm",
            operator_baseline, raw_sensor_sample, self.config.calibration_factor, offset
        );
        Ok(offset)
    }

    /// Blocking calibration boundary: wait for the operator baseline (up to
    /// the configured timeout), sample the sensor once, and hand the
    /// resulting offset to the sensor as its zero reference.
    pub fn calibrate(
        &mut self,
        input: &mut impl OperatorInput,
        sensor: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) -> Result<Measurement> {
        let timeout = self.config.calibration_timeout();
        info!("Waiting up to {}s for operator baseline depth", timeout.as_secs());
        let Some(baseline) = input.read_baseline(timeout) else {
            warn!("No operator baseline within {}s", timeout.as_secs());
            return Err(ErrorKind::CalibrationTimeout);
        };
        let raw = sensor.raw_sample();
        let offset = self.initialize(baseline, raw)?;
        sensor.set_depth_offset(offset);
        sink.emit(&AppEvent::Calibrated { offset });
        Ok(offset)
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Choose the action for `measurement`. Pure: nothing is committed,
    /// so repeated calls agree until a send succeeds.
    pub fn decide(&self, measurement: Measurement, sensor: &impl SensorPort, power: u8) -> Action {
        decision::decide(&DecisionInput {
            measurement,
            worth_sending: sensor.is_worth_sending(measurement),
            ignore_threshold: self.state.ignore_threshold,
            heartbeat: self.config.heartbeat,
            idle_cycles: self.idle_cycles,
            power,
        })
    }

    /// Evaluate the accelerated-mode threshold for `measurement`.
    pub fn update_cadence_mode(&mut self, measurement: Measurement) -> Option<CadenceChange> {
        let change = self
            .state
            .cadence
            .update(measurement, self.state.acceleration_threshold)?;
        info!(
            "Cadence {:?} -> {:?} at {}mm (threshold {}mm), now {}ms",
            change.from,
            change.to,
            measurement,
            self.state.acceleration_threshold,
            change.cadence.as_millis()
        );
        Some(change)
    }

    /// Run one full measurement cycle: measure → decide → uplink → commit
    /// → cadence.
    ///
    /// Before [`initialize`](Self::initialize) has fixed the depth offset
    /// the cycle only measures: nothing is uplinked, logged or committed and
    /// the cadence is left alone.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`BatteryPort`], which avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn run_cycle(
        &mut self,
        hw: &mut (impl SensorPort + BatteryPort),
        transport: &mut impl TransportPort,
        log: &mut impl ReadingLog,
        sink: &mut impl EventSink,
    ) -> CycleReport {
        self.cycle_count += 1;

        // 1. Measure
        let measurement = hw.current_measurement();
        let voltage = hw.read_battery_voltage();
        let power = estimate_power_byte(voltage);
        sink.emit(&AppEvent::Battery {
            voltage,
            power,
            percent: estimate_percentage(voltage),
        });

        if self.state.initial_depth_offset.is_none() {
            warn!(
                "Cycle {}: depth offset not calibrated, holding uplink ({}mm)",
                self.cycle_count, measurement
            );
            return CycleReport {
                measurement,
                action: Action::Suppress,
                outcome: Ok(()),
                cadence_change: None,
                next_delay: self.current_cadence(),
            };
        }

        // 2. Decide
        let action = self.decide(measurement, &*hw, power);
        debug!(
            "Cycle {}: depth={}mm power={} -> {:?}",
            self.cycle_count, measurement, power, action
        );

        // 3. Act and commit
        let outcome = match action {
            Action::SendReading { value, power } => {
                if transport.send_reading(value, power).is_ok() {
                    self.commit_reading(value, hw, log);
                    sink.emit(&AppEvent::ReadingSent { value, power });
                    Ok(())
                } else {
                    self.report_failure(UplinkKind::Reading, sink)
                }
            }
            Action::SendHeartbeat { power } => {
                if transport.send_heartbeat(power).is_ok() {
                    self.idle_cycles = 0;
                    sink.emit(&AppEvent::HeartbeatSent { power });
                    Ok(())
                } else {
                    self.report_failure(UplinkKind::Heartbeat, sink)
                }
            }
            Action::Suppress => {
                self.idle_cycles = self.idle_cycles.saturating_add(1);
                log.record_measurement(measurement);
                sink.emit(&AppEvent::Suppressed {
                    value: measurement,
                    idle_cycles: self.idle_cycles,
                });
                Ok(())
            }
        };

        // 4. Cadence, independent of what was sent
        let cadence_change = self.update_cadence_mode(measurement);
        if let Some(change) = cadence_change {
            sink.emit(&AppEvent::CadenceChanged {
                from: change.from,
                to: change.to,
                cadence: change.cadence,
            });
        }

        CycleReport {
            measurement,
            action,
            outcome,
            cadence_change,
            next_delay: self.current_cadence(),
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external configuration command.
    pub fn handle_command(&mut self, cmd: AppCommand, store: &impl ConfigPort) -> Result<()> {
        match cmd {
            AppCommand::SetCadence(ms) => self.set_cadence(ms),
            AppCommand::SetAcceleratedCadence(ms) => self.set_accelerated_cadence(ms),
            AppCommand::SetAccelerationThreshold(mm) => self.set_acceleration_threshold(mm),
            AppCommand::SetIgnoreThreshold(mm) => self.set_ignore_threshold(mm),
            AppCommand::SetHeartbeatPolicy(policy) => {
                self.set_heartbeat_policy(policy);
                Ok(())
            }
            AppCommand::UpdateConfig(new_config) => self.apply_config(new_config),
            AppCommand::SaveConfig => {
                store.save(&self.config)?;
                self.config_dirty = false;
                info!("Config saved");
                Ok(())
            }
        }
    }

    /// Change the normal-mode cadence. Takes effect immediately if normal
    /// mode is active.
    pub fn set_cadence(&mut self, ms: i64) -> Result<()> {
        let cadence = checked_cadence_ms(ms)?;
        self.state.cadence.set_normal(cadence);
        self.config.cadence_ms = cadence.as_millis() as u32;
        self.mark_config_dirty();
        info!("Normal cadence set to {}ms", ms);
        Ok(())
    }

    /// Change the accelerated-mode cadence.
    pub fn set_accelerated_cadence(&mut self, ms: i64) -> Result<()> {
        let cadence = checked_cadence_ms(ms)?;
        self.state.cadence.set_accelerated(cadence);
        self.config.accelerated_cadence_ms = cadence.as_millis() as u32;
        self.mark_config_dirty();
        info!("Accelerated cadence set to {}ms", ms);
        Ok(())
    }

    /// Change the accelerated-mode threshold. The mode itself is only
    /// re-evaluated on the next measurement.
    pub fn set_acceleration_threshold(&mut self, mm: Measurement) -> Result<()> {
        let mm = checked_threshold_mm(mm)?;
        self.state.acceleration_threshold = mm;
        self.config.acceleration_threshold_mm = mm;
        self.mark_config_dirty();
        info!("Acceleration threshold set to {}mm", mm);
        Ok(())
    }

    pub fn set_ignore_threshold(&mut self, mm: Measurement) -> Result<()> {
        let mm = checked_threshold_mm(mm)?;
        self.state.ignore_threshold = mm;
        self.config.ignore_threshold_mm = mm;
        self.mark_config_dirty();
        info!("Ignore threshold set to {}mm", mm);
        Ok(())
    }

    pub fn set_heartbeat_policy(&mut self, policy: HeartbeatPolicy) {
        self.config.heartbeat = policy;
        self.mark_config_dirty();
        info!("Heartbeat policy set to {:?}", policy);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Delay the driver sleeps before the next cycle.
    pub fn current_cadence(&self) -> Duration {
        self.state.cadence.current()
    }

    /// `(current, standby)` cadence pair; trades places on each toggle.
    pub fn cadence_pair(&self) -> (Duration, Duration) {
        self.state.cadence.pair()
    }

    pub fn accelerated_mode_active(&self) -> bool {
        self.state.cadence.mode().is_accelerated()
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn last_sent_measurement(&self) -> Option<Measurement> {
        self.state.last_sent_measurement
    }

    pub fn initial_depth_offset(&self) -> Option<Measurement> {
        self.state.initial_depth_offset
    }

    pub fn idle_cycles(&self) -> u16 {
        self.idle_cycles
    }

    /// Total cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Clone of the live configuration (for read-back or persistence).
    pub fn current_config(&self) -> NodeConfig {
        self.config.clone()
    }

    /// Whether runtime changes have not yet been persisted.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }

    // ── Internal ──────────────────────────────────────────────

    fn commit_reading(&mut self, value: Measurement, sensor: &mut impl SensorPort, log: &mut impl ReadingLog) {
        self.state.last_sent_measurement = Some(value);
        sensor.set_last_sent(value);
        log.append_reading(value);
        self.idle_cycles = 0;
    }

    fn report_failure(&mut self, kind: UplinkKind, sink: &mut impl EventSink) -> Result<()> {
        warn!("{:?} uplink failed, retrying next cycle", kind);
        sink.emit(&AppEvent::TransmissionFailed { kind });
        Err(ErrorKind::TransmissionFailed)
    }

    fn apply_config(&mut self, new_config: NodeConfig) -> Result<()> {
        new_config.validate()?;
        self.state.cadence.set_normal(new_config.cadence());
        self.state.cadence.set_accelerated(new_config.accelerated_cadence());
        self.state.acceleration_threshold = new_config.acceleration_threshold_mm;
        self.state.ignore_threshold = new_config.ignore_threshold_mm;
        self.config = new_config;
        self.mark_config_dirty();
        info!("Configuration updated at runtime");
        Ok(())
    }

    fn mark_config_dirty(&mut self) {
        self.config_dirty = true;
    }
}
