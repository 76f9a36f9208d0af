//! LiPo battery voltage monitor.
//!
//! VBAT reaches the ADC through a 1:2 divider against a 3.3 V reference,
//! so a 10-bit count converts as `raw * 2 * 3.3 / 1024`. Several samples
//! spaced by a blocking delay are averaged since the radio and the
//! range-finder pull the rail around.

use embedded_hal::delay::DelayNs;

use crate::drivers::adc::{self, ADC_FULL_SCALE};
use crate::pins;

const DIVIDER_RATIO: f32 = 2.0;
const REFERENCE_VOLTAGE: f32 = 3.3;

/// Convert one 10-bit VBAT count to volts.
pub fn counts_to_volts(raw: u16) -> f32 {
    scale(f32::from(raw))
}

fn scale(counts: f32) -> f32 {
    counts * DIVIDER_RATIO * REFERENCE_VOLTAGE / f32::from(ADC_FULL_SCALE)
}

pub struct BatteryMonitor<D: DelayNs> {
    delay: D,
    samples: u8,
    interval_ms: u32,
    channel: u32,
}

impl<D: DelayNs> BatteryMonitor<D> {
    pub fn new(delay: D, samples: u8, interval_ms: u32) -> Self {
        Self {
            delay,
            samples: samples.max(1),
            interval_ms,
            channel: pins::VBAT_ADC_CHANNEL,
        }
    }

    /// Averaged battery voltage. Blocks for `(samples - 1) * interval_ms`.
    pub fn read_voltage(&mut self) -> f32 {
        let mut sum: u32 = 0;
        for i in 0..self.samples {
            if i > 0 {
                self.delay.delay_ms(self.interval_ms);
            }
            sum += u32::from(adc::read(self.channel));
        }
        scale(sum as f32 / f32::from(self.samples))
    }
}
