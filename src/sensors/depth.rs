//! Ultrasonic range-finder depth sensor.
//!
//! The range-finder reports the distance from the mounting point down to
//! the water surface as an analog voltage, 5 mm per 10-bit count. Depth is
//! derived from the calibrated distance to the river bed:
//!
//! ```text
//! depth = offset - raw * calibration_factor
//! ```
//!
//! The sensor also owns the "worth sending" delta policy and remembers the
//! last confirmed transmission.
//!
//! ## Dual-target design
//!
//! Raw counts come from [`drivers::adc`](crate::drivers::adc), which reads
//! the oneshot driver on ESP-IDF and injectable atomics on host.

use crate::drivers::adc;
use crate::pins;
use crate::Measurement;

/// Source of raw range-finder counts. Lets the sensor logic run against a
/// scripted sequence in tests.
pub trait RawSource {
    fn read_raw(&mut self) -> u16;
}

/// Reads the depth channel of ADC1.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdcChannel {
    channel: u32,
}

impl AdcChannel {
    pub fn depth() -> Self {
        Self {
            channel: pins::DEPTH_ADC_CHANNEL,
        }
    }
}

impl RawSource for AdcChannel {
    fn read_raw(&mut self) -> u16 {
        adc::read(self.channel)
    }
}

pub struct DepthSensor<S: RawSource = AdcChannel> {
    source: S,
    calibration_factor: i32,
    min_change_mm: Measurement,
    /// Distance from the sensor to the river bed, set at calibration.
    offset: Measurement,
    last_sent: Option<Measurement>,
}

impl DepthSensor<AdcChannel> {
    pub fn new(calibration_factor: i32, min_change_mm: Measurement) -> Self {
        Self::with_source(AdcChannel::depth(), calibration_factor, min_change_mm)
    }
}

impl<S: RawSource> DepthSensor<S> {
    pub fn with_source(source: S, calibration_factor: i32, min_change_mm: Measurement) -> Self {
        Self {
            source,
            calibration_factor,
            min_change_mm,
            offset: 0,
            last_sent: None,
        }
    }

    pub fn raw(&mut self) -> i32 {
        i32::from(self.source.read_raw())
    }

    /// Current depth in millimetres. Saturates instead of wrapping.
    pub fn measure(&mut self) -> Measurement {
        let distance = self.raw().saturating_mul(self.calibration_factor);
        self.offset.saturating_sub(distance)
    }

    /// Nothing sent yet, or the change since the last send is at least
    /// `min_change_mm`.
    pub fn is_worth_sending(&self, candidate: Measurement) -> bool {
        match self.last_sent {
            None => true,
            Some(last) => candidate.abs_diff(last) >= self.min_change_mm.unsigned_abs(),
        }
    }

    pub fn set_last_sent(&mut self, value: Measurement) {
        self.last_sent = Some(value);
    }

    pub fn last_sent(&self) -> Option<Measurement> {
        self.last_sent
    }

    pub fn set_offset(&mut self, offset: Measurement) {
        self.offset = offset;
    }

    pub fn offset(&self) -> Measurement {
        self.offset
    }
}
