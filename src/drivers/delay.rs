//! Blocking delay backed by `std::thread::sleep`.
//!
//! ESP-IDF ships a std-capable runtime where `thread::sleep` yields to
//! FreeRTOS, so the same implementation serves target and host.

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// [`DelayNs`] implementation that parks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl StdDelay {
    pub fn new() -> Self {
        Self
    }

    /// Sleep for a [`Duration`], e.g. the cadence returned by a cycle.
    pub fn sleep(&mut self, period: Duration) {
        thread::sleep(period);
    }
}

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
