//! River-level node firmware: main entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │                                                               │
//! │  HardwareAdapter    LoggingRadio     FileReadingLog           │
//! │  (Sensor+Battery)   (Transport)      (ReadingLog)             │
//! │  ConsoleInput       LogEventSink     NvsAdapter               │
//! │  (OperatorInput)    (EventSink)      (ConfigPort)             │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ───────────────────     │
//! │                                                               │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │          TelemetryController (pure decisions)           │  │
//! │  │  Send decision · Cadence policy · Power estimate        │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Environment (host runs and bench nodes):
//!
//! - `RIVERLEVEL_CONFIG`: path to a JSON [`NodeConfig`]; validated and
//!   persisted, overriding what is stored in NVS.
//! - `RIVERLEVEL_LOG_PATH`: reading log location.
//! - `RIVERLEVEL_MAX_CYCLES`: stop after this many cycles.
#![deny(unused_must_use)]

use std::fs;

use anyhow::{Context, Result};
use log::{info, warn};

use riverlevel::adapters::console::ConsoleInput;
use riverlevel::adapters::hardware::HardwareAdapter;
use riverlevel::adapters::log_sink::LogEventSink;
use riverlevel::adapters::nvs::NvsAdapter;
use riverlevel::adapters::radio::LoggingRadio;
use riverlevel::adapters::sd_log::FileReadingLog;
use riverlevel::app::ports::ConfigPort;
use riverlevel::config::NodeConfig;
use riverlevel::drivers::{adc, delay::StdDelay};
use riverlevel::sensors::{BatteryMonitor, DepthSensor};
use riverlevel::TelemetryController;

#[cfg(target_os = "espidf")]
const DEFAULT_LOG_PATH: &str = "/sdcard/river.csv";
#[cfg(not(target_os = "espidf"))]
const DEFAULT_LOG_PATH: &str = "river.csv";

fn init_logging() -> Result<()> {
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Ok(())
}

/// Resolve the boot configuration: operator file first, then NVS, then
/// defaults. An operator file that fails validation aborts boot.
fn load_config(nvs: Option<&NvsAdapter>) -> Result<NodeConfig> {
    if let Ok(path) = std::env::var("RIVERLEVEL_CONFIG") {
        let text = fs::read_to_string(&path).with_context(|| format!("reading config file {}", path))?;
        let config: NodeConfig =
            serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path))?;
        config.validate().context("validating operator config")?;
        info!("Config loaded from {}", path);
        if let Some(nvs) = nvs {
            if let Err(e) = nvs.save(&config) {
                warn!("Could not persist operator config ({}), using it for this session", e);
            }
        }
        return Ok(config);
    }

    match nvs.map(|store| store.load()) {
        Some(Ok(config)) => Ok(config),
        Some(Err(e)) => {
            warn!("NVS config load failed ({}), using defaults", e);
            Ok(NodeConfig::default())
        }
        None => Ok(NodeConfig::default()),
    }
}

fn max_cycles() -> Result<Option<u64>> {
    match std::env::var("RIVERLEVEL_MAX_CYCLES") {
        Ok(v) => Ok(Some(v.parse().context("RIVERLEVEL_MAX_CYCLES must be an integer")?)),
        Err(_) => Ok(None),
    }
}

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    init_logging()?;
    info!("riverlevel v{}", env!("CARGO_PKG_VERSION"));

    adc::init().context("ADC init")?;

    // ── 2. Configuration ──────────────────────────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running without persistence", e);
            None
        }
    };
    let config = load_config(nvs.as_ref())?;
    info!(
        "Cadence {}ms / {}ms above {}mm, ignore below {}mm, heartbeat {:?}",
        config.cadence_ms,
        config.accelerated_cadence_ms,
        config.acceleration_threshold_mm,
        config.ignore_threshold_mm,
        config.heartbeat
    );

    // ── 3. Adapters ───────────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        DepthSensor::new(config.calibration_factor, config.min_change_mm),
        BatteryMonitor::new(
            StdDelay::new(),
            config.battery_samples,
            config.battery_sample_interval_ms,
        ),
    );
    let mut radio = LoggingRadio::new();
    let log_path = std::env::var("RIVERLEVEL_LOG_PATH").unwrap_or_else(|_| DEFAULT_LOG_PATH.into());
    let mut reading_log = FileReadingLog::new(log_path);
    let mut console = ConsoleInput::stdin().context("starting console reader")?;
    let mut sink = LogEventSink::new();
    let mut delay = StdDelay::new();

    // ── 4. Join + calibrate ───────────────────────────────────
    let mut controller = TelemetryController::new(config);
    controller.start(&mut radio);
    controller
        .calibrate(&mut console, &mut hw, &mut sink)
        .context("calibration")?;

    // ── 5. Measurement loop ───────────────────────────────────
    let limit = max_cycles()?;
    info!("Entering measurement loop");
    loop {
        while let Some(cmd) = console.poll_command() {
            let applied = match nvs.as_ref() {
                Some(store) => controller.handle_command(cmd, store),
                None => controller.handle_command(cmd, &NoStore),
            };
            if let Err(e) = applied {
                warn!("Console command rejected: {}", e);
            }
        }

        let report = controller.run_cycle(&mut hw, &mut radio, &mut reading_log, &mut sink);
        if limit.is_some_and(|n| controller.cycle_count() >= n) {
            info!("Stopping after {} cycles", controller.cycle_count());
            return Ok(());
        }
        delay.sleep(report.next_delay);
    }
}

/// Stand-in [`ConfigPort`] when NVS is unavailable: loads defaults, and
/// every save fails.
struct NoStore;

impl ConfigPort for NoStore {
    fn load(&self) -> Result<NodeConfig, riverlevel::app::ports::ConfigError> {
        Ok(NodeConfig::default())
    }

    fn save(&self, _config: &NodeConfig) -> Result<(), riverlevel::app::ports::ConfigError> {
        Err(riverlevel::app::ports::ConfigError::IoError)
    }
}
