//! Integration tests for the TelemetryController cycle pipeline.
//!
//! Measure → decide → uplink → commit → cadence, driven entirely through
//! the mock ports in `mock_hw`.

use std::time::Duration;

use riverlevel::app::commands::AppCommand;
use riverlevel::app::events::{AppEvent, UplinkKind};
use riverlevel::cadence::CadenceMode;
use riverlevel::config::NodeConfig;
use riverlevel::decision::{Action, HeartbeatPolicy};
use riverlevel::{ErrorKind, TelemetryController};

use crate::mock_hw::{MockHardware, MockInput, MockLog, MockNvs, MockRadio, RecordingSink, UplinkCall};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn calibrated(config: NodeConfig) -> TelemetryController {
    let mut c = TelemetryController::new(config);
    c.initialize(1500, 300).unwrap();
    c
}

// ── Cadence ───────────────────────────────────────────────────

#[test]
fn cadence_follows_threshold_crossings() {
    let mut c = calibrated(NodeConfig::default());
    let mut hw = MockHardware::with_script(&[5000, 21000, 19000]);
    let (mut radio, mut log, mut sink) = (MockRadio::new(), MockLog::default(), RecordingSink::new());

    let r1 = c.run_cycle(&mut hw, &mut radio, &mut log, &mut sink);
    assert_eq!(c.cadence_pair(), (ms(5000), ms(1000)));
    assert!(!c.accelerated_mode_active());
    assert_eq!(r1.cadence_change, None);
    assert_eq!(r1.next_delay, ms(5000));

    let r2 = c.run_cycle(&mut hw, &mut radio, &mut log, &mut sink);
    assert_eq!(c.cadence_pair(), (ms(1000), ms(5000)));
    assert!(c.accelerated_mode_active());
    assert_eq!(r2.next_delay, ms(1000));

    let r3 = c.run_cycle(&mut hw, &mut radio, &mut log, &mut sink);
    assert_eq!(c.cadence_pair(), (ms(5000), ms(1000)));
    assert!(!c.accelerated_mode_active());
    assert_eq!(r3.next_delay, ms(5000));

    let modes: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CadenceChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(modes, vec![CadenceMode::Accelerated, CadenceMode::Normal]);
}

#[test]
fn cadence_updates_even_when_uplink_fails() {
    let mut c = calibrated(NodeConfig::default());
    let mut hw = MockHardware::with_script(&[25_000]);
    let mut radio = MockRadio::new();
    radio.always_fail = true;
    let report = c.run_cycle(&mut hw, &mut radio, &mut MockLog::default(), &mut RecordingSink::new());
    assert_eq!(report.outcome, Err(ErrorKind::TransmissionFailed));
    assert!(c.accelerated_mode_active());
}

#[test]
fn steady_high_water_does_not_toggle() {
    let mut c = calibrated(NodeConfig::default());
    let mut hw = MockHardware::with_script(&[20_000, 20_500, 20_000]);
    let mut sink = RecordingSink::new();
    for _ in 0..3 {
        c.run_cycle(&mut hw, &mut MockRadio::new(), &mut MockLog::default(), &mut sink);
    }
    assert_eq!(sink.count(|e| matches!(e, AppEvent::CadenceChanged { .. })), 1);
    assert!(c.accelerated_mode_active());
}

// ── Send decision ─────────────────────────────────────────────

#[test]
fn reading_below_ignore_floor_becomes_heartbeat() {
    let mut config = NodeConfig::default();
    config.ignore_threshold_mm = 100;
    let mut c = calibrated(config);
    let mut hw = MockHardware::with_script(&[50]);
    hw.force_worth = Some(true);
    let mut radio = MockRadio::new();

    let report = c.run_cycle(&mut hw, &mut radio, &mut MockLog::default(), &mut RecordingSink::new());

    assert_eq!(report.action, Action::SendHeartbeat { power: 50 });
    assert_eq!(radio.calls, vec![UplinkCall::Heartbeat { power: 50 }]);
    assert_eq!(c.last_sent_measurement(), None);
}

#[test]
fn reading_at_ignore_floor_is_sent() {
    let mut config = NodeConfig::default();
    config.ignore_threshold_mm = 100;
    let mut c = calibrated(config);
    let mut hw = MockHardware::with_script(&[100]);
    let mut radio = MockRadio::new();
    let mut log = MockLog::default();

    c.run_cycle(&mut hw, &mut radio, &mut log, &mut RecordingSink::new());

    assert_eq!(radio.readings(), vec![100]);
    assert_eq!(log.sent, vec![100]);
    assert_eq!(hw.last_sent, Some(100));
    assert_eq!(c.last_sent_measurement(), Some(100));
}

#[test]
fn decide_is_idempotent_until_a_send_succeeds() {
    let c = calibrated(NodeConfig::default());
    let hw = MockHardware::new();
    let first = c.decide(1234, &hw, 50);
    let second = c.decide(1234, &hw, 50);
    assert_eq!(first, second);
    assert_eq!(first, Action::SendReading { value: 1234, power: 50 });
}

#[test]
fn unchanged_depth_sends_heartbeats() {
    let mut c = calibrated(NodeConfig::default());
    let mut hw = MockHardware::with_script(&[1200, 1200, 1200]);
    hw.min_change = 10;
    let mut radio = MockRadio::new();
    for _ in 0..3 {
        c.run_cycle(&mut hw, &mut radio, &mut MockLog::default(), &mut RecordingSink::new());
    }
    assert_eq!(radio.readings(), vec![1200]);
    assert_eq!(radio.heartbeats(), 2);
    assert_eq!(c.idle_cycles(), 0);
}

#[test]
fn power_byte_reflects_battery_voltage() {
    let mut c = calibrated(NodeConfig::default());
    let mut hw = MockHardware::with_script(&[900]);
    hw.voltage = 3.95;
    let mut radio = MockRadio::new();
    let mut sink = RecordingSink::new();
    c.run_cycle(&mut hw, &mut radio, &mut MockLog::default(), &mut sink);

    let Some(UplinkCall::Reading { power, .. }) = radio.calls.first() else {
        panic!("expected a reading, got {:?}", radio.calls);
    };
    assert!((74..=75).contains(power), "power byte {}", power);
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::Battery { .. })));
}

// ── Transmission failures ─────────────────────────────────────

#[test]
fn failed_reading_commits_nothing_and_retries() {
    let mut c = calibrated(NodeConfig::default());
    let mut hw = MockHardware::with_script(&[1500, 1500]);
    hw.min_change = 10;
    let mut radio = MockRadio::new();
    radio.fail_next(1);
    let mut log = MockLog::default();
    let mut sink = RecordingSink::new();

    let r1 = c.run_cycle(&mut hw, &mut radio, &mut log, &mut sink);
    assert_eq!(r1.outcome, Err(ErrorKind::TransmissionFailed));
    assert_eq!(c.last_sent_measurement(), None);
    assert_eq!(hw.last_sent, None);
    assert!(log.sent.is_empty());
    assert!(sink.events.contains(&AppEvent::TransmissionFailed {
        kind: UplinkKind::Reading
    }));

    // Same value is still worth sending on the next cycle.
    let r2 = c.run_cycle(&mut hw, &mut radio, &mut log, &mut sink);
    assert_eq!(r2.outcome, Ok(()));
    assert_eq!(radio.readings(), vec![1500, 1500]);
    assert_eq!(c.last_sent_measurement(), Some(1500));
    assert_eq!(log.sent, vec![1500]);
}

#[test]
fn failed_heartbeat_keeps_idle_count() {
    let mut config = NodeConfig::default();
    config.heartbeat = HeartbeatPolicy::AfterIdleCycles(2);
    let mut c = calibrated(config);
    let mut hw = MockHardware::new();
    hw.force_worth = Some(false);
    let mut radio = MockRadio::new();
    let mut sink = RecordingSink::new();

    for _ in 0..2 {
        c.run_cycle(&mut hw, &mut radio, &mut MockLog::default(), &mut sink);
    }
    assert_eq!(c.idle_cycles(), 2);
    radio.fail_next(1);
    let r = c.run_cycle(&mut hw, &mut radio, &mut MockLog::default(), &mut sink);
    assert_eq!(r.action, Action::SendHeartbeat { power: 50 });
    assert_eq!(r.outcome, Err(ErrorKind::TransmissionFailed));
    assert_eq!(c.idle_cycles(), 2);

    let r = c.run_cycle(&mut hw, &mut radio, &mut MockLog::default(), &mut sink);
    assert_eq!(r.outcome, Ok(()));
    assert_eq!(c.idle_cycles(), 0);
}

// ── Heartbeat policy ──────────────────────────────────────────

#[test]
fn batched_heartbeat_after_24_idle_cycles() {
    let mut config = NodeConfig::default();
    config.heartbeat = HeartbeatPolicy::AfterIdleCycles(24);
    let mut c = calibrated(config);
    let mut hw = MockHardware::new();
    hw.force_worth = Some(false);
    let mut radio = MockRadio::new();
    let mut log = MockLog::default();
    let mut sink = RecordingSink::new();

    for cycle in 1..=24 {
        let r = c.run_cycle(&mut hw, &mut radio, &mut log, &mut sink);
        assert_eq!(r.action, Action::Suppress, "cycle {}", cycle);
    }
    assert!(radio.calls.is_empty());
    assert_eq!(c.idle_cycles(), 24);
    assert_eq!(log.seen.len(), 24);

    let r = c.run_cycle(&mut hw, &mut radio, &mut log, &mut sink);
    assert_eq!(r.action, Action::SendHeartbeat { power: 50 });
    assert_eq!(radio.heartbeats(), 1);
    assert_eq!(c.idle_cycles(), 0);
}

#[test]
fn reading_resets_idle_count() {
    let mut config = NodeConfig::default();
    config.heartbeat = HeartbeatPolicy::AfterIdleCycles(24);
    let mut c = calibrated(config);
    let mut hw = MockHardware::with_script(&[1000, 1000, 1000, 1100]);
    hw.min_change = 50;
    let mut radio = MockRadio::new();
    for _ in 0..3 {
        c.run_cycle(&mut hw, &mut radio, &mut MockLog::default(), &mut RecordingSink::new());
    }
    assert_eq!(c.idle_cycles(), 2);
    c.run_cycle(&mut hw, &mut radio, &mut MockLog::default(), &mut RecordingSink::new());
    assert_eq!(radio.readings(), vec![1000, 1100]);
    assert_eq!(c.idle_cycles(), 0);
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn failed_join_does_not_block_startup() {
    let mut c = TelemetryController::new(NodeConfig::default());
    let mut radio = MockRadio::new();
    radio.fail_next(1);
    assert!(!c.start(&mut radio).is_ok());
    assert_eq!(radio.calls, vec![UplinkCall::Join]);
}

#[test]
fn calibration_hands_offset_to_sensor() {
    let mut c = TelemetryController::new(NodeConfig::default());
    let mut hw = MockHardware::new();
    hw.raw = 300;
    let mut input = MockInput::typed(1500);
    let mut sink = RecordingSink::new();

    assert_eq!(c.calibrate(&mut input, &mut hw, &mut sink), Ok(3000));
    assert_eq!(hw.offset, Some(3000));
    assert_eq!(input.requested_timeout, Some(Duration::from_secs(600)));
    assert_eq!(sink.events, vec![AppEvent::Calibrated { offset: 3000 }]);
}

#[test]
fn cycles_before_calibration_hold_every_uplink() {
    let mut c = TelemetryController::new(NodeConfig::default());
    // Offset 0 turns any range into a negative depth; 25000 would also
    // cross the acceleration threshold if the cadence were evaluated.
    let mut hw = MockHardware::with_script(&[-1500, 25_000]);
    let mut radio = MockRadio::new();
    let mut log = MockLog::default();
    let mut sink = RecordingSink::new();

    for expected in [-1500, 25_000] {
        let r = c.run_cycle(&mut hw, &mut radio, &mut log, &mut sink);
        assert_eq!(r.measurement, expected);
        assert_eq!(r.action, Action::Suppress);
        assert_eq!(r.outcome, Ok(()));
        assert_eq!(r.cadence_change, None);
        assert_eq!(r.next_delay, ms(5000));
    }
    assert!(radio.calls.is_empty());
    assert!(log.sent.is_empty() && log.seen.is_empty());
    assert_eq!(hw.last_sent, None);
    assert_eq!(c.idle_cycles(), 0);
    assert!(!c.accelerated_mode_active());

    c.initialize(1500, 300).unwrap();
    let r = c.run_cycle(&mut hw, &mut radio, &mut log, &mut sink);
    assert!(matches!(r.action, Action::SendReading { value: 25_000, .. }));
    assert_eq!(radio.readings(), vec![25_000]);
}

#[test]
fn calibration_times_out_without_operator() {
    let mut config = NodeConfig::default();
    config.calibration_timeout_secs = 5;
    let mut c = TelemetryController::new(config);
    let mut hw = MockHardware::new();
    let mut input = MockInput::silent();

    assert_eq!(
        c.calibrate(&mut input, &mut hw, &mut RecordingSink::new()),
        Err(ErrorKind::CalibrationTimeout)
    );
    assert_eq!(input.requested_timeout, Some(Duration::from_secs(5)));
    assert_eq!(c.initial_depth_offset(), None);
    assert_eq!(hw.offset, None);
}

#[test]
fn second_calibration_is_rejected() {
    let mut c = calibrated(NodeConfig::default());
    let mut hw = MockHardware::new();
    assert_eq!(
        c.calibrate(&mut MockInput::typed(10), &mut hw, &mut RecordingSink::new()),
        Err(ErrorKind::AlreadyCalibrated)
    );
    assert_eq!(c.initial_depth_offset(), Some(3000));
    assert_eq!(hw.offset, None);
}

// ── Configuration mutators ────────────────────────────────────

#[test]
fn cadence_setters_target_their_role() {
    let mut c = calibrated(NodeConfig::default());
    let mut hw = MockHardware::with_script(&[21_000]);
    c.run_cycle(&mut hw, &mut MockRadio::new(), &mut MockLog::default(), &mut RecordingSink::new());
    assert!(c.accelerated_mode_active());

    c.set_cadence(60_000).unwrap();
    assert_eq!(c.current_cadence(), ms(1000));
    c.set_accelerated_cadence(500).unwrap();
    assert_eq!(c.current_cadence(), ms(500));
    assert_eq!(c.cadence_pair(), (ms(500), ms(60_000)));
}

#[test]
fn invalid_mutator_input_is_rejected() {
    let store = MockNvs::new();
    let mut c = calibrated(NodeConfig::default());
    for cmd in [
        AppCommand::SetCadence(0),
        AppCommand::SetCadence(-1000),
        AppCommand::SetAcceleratedCadence(i64::MAX),
        AppCommand::SetAccelerationThreshold(-1),
        AppCommand::SetIgnoreThreshold(-50),
    ] {
        let result = c.handle_command(cmd.clone(), &store);
        assert!(
            matches!(result, Err(ErrorKind::InvalidConfig(_))),
            "{:?} gave {:?}",
            cmd,
            result
        );
    }
    assert_eq!(c.current_config(), NodeConfig::default());
    assert!(!c.is_config_dirty());
}

#[test]
fn threshold_change_applies_on_next_measurement() {
    let mut c = calibrated(NodeConfig::default());
    let store = MockNvs::new();
    c.handle_command(AppCommand::SetAccelerationThreshold(1000), &store).unwrap();
    assert!(!c.accelerated_mode_active());

    let mut hw = MockHardware::with_script(&[1000]);
    c.run_cycle(&mut hw, &mut MockRadio::new(), &mut MockLog::default(), &mut RecordingSink::new());
    assert!(c.accelerated_mode_active());
}

#[test]
fn config_survives_save_and_load() {
    let store = MockNvs::new();
    let mut c = calibrated(NodeConfig::default());
    c.handle_command(AppCommand::SetIgnoreThreshold(250), &store).unwrap();
    c.handle_command(
        AppCommand::SetHeartbeatPolicy(HeartbeatPolicy::AfterIdleCycles(24)),
        &store,
    )
    .unwrap();
    assert!(c.is_config_dirty());
    c.handle_command(AppCommand::SaveConfig, &store).unwrap();
    assert!(!c.is_config_dirty());

    let reloaded = riverlevel::app::ports::ConfigPort::load(&store).unwrap();
    assert_eq!(reloaded.ignore_threshold_mm, 250);
    assert_eq!(reloaded.heartbeat, HeartbeatPolicy::AfterIdleCycles(24));

    let restarted = TelemetryController::new(reloaded);
    assert_eq!(restarted.state().ignore_threshold, 250);
}

#[test]
fn failed_save_keeps_config_dirty() {
    let mut store = MockNvs::new();
    store.fail_writes = true;
    let mut c = calibrated(NodeConfig::default());
    c.set_cadence(3000).unwrap();
    assert!(c.handle_command(AppCommand::SaveConfig, &store).is_err());
    assert!(c.is_config_dirty());
    assert_eq!(store.stored(), None);
}

#[test]
fn invalid_update_config_is_rejected_whole() {
    let store = MockNvs::new();
    let mut c = calibrated(NodeConfig::default());
    let mut bad = NodeConfig::default();
    bad.ignore_threshold_mm = 500;
    bad.calibration_factor = 0;
    assert!(matches!(
        c.handle_command(AppCommand::UpdateConfig(bad), &store),
        Err(ErrorKind::InvalidConfig(_))
    ));
    assert_eq!(c.state().ignore_threshold, 0);
}
