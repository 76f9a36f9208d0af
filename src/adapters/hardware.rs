//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`DepthSensor`] and the [`BatteryMonitor`], exposing them
//! through [`SensorPort`] and [`BatteryPort`]. This is the only module in
//! the system that touches actual hardware. On non-espidf targets, the
//! underlying ADC driver uses cfg-gated simulation cells.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{BatteryPort, SensorPort};
use crate::sensors::depth::{AdcChannel, RawSource};
use crate::sensors::{BatteryMonitor, DepthSensor};
use crate::Measurement;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D: DelayNs, S: RawSource = AdcChannel> {
    depth: DepthSensor<S>,
    battery: BatteryMonitor<D>,
}

impl<D: DelayNs, S: RawSource> HardwareAdapter<D, S> {
    pub fn new(depth: DepthSensor<S>, battery: BatteryMonitor<D>) -> Self {
        Self { depth, battery }
    }

    pub fn depth(&self) -> &DepthSensor<S> {
        &self.depth
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<D: DelayNs, S: RawSource> SensorPort for HardwareAdapter<D, S> {
    fn current_measurement(&mut self) -> Measurement {
        self.depth.measure()
    }

    fn raw_sample(&mut self) -> i32 {
        self.depth.raw()
    }

    fn is_worth_sending(&self, candidate: Measurement) -> bool {
        self.depth.is_worth_sending(candidate)
    }

    fn set_last_sent(&mut self, value: Measurement) {
        self.depth.set_last_sent(value);
    }

    fn set_depth_offset(&mut self, offset: Measurement) {
        self.depth.set_offset(offset);
    }
}

// ── BatteryPort implementation ────────────────────────────────

impl<D: DelayNs, S: RawSource> BatteryPort for HardwareAdapter<D, S> {
    fn read_battery_voltage(&mut self) -> f32 {
        self.battery.read_voltage()
    }
}
