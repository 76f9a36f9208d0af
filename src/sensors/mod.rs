//! Sensor subsystem: the river depth range-finder and the battery monitor.
//!
//! Both read ADC1 through [`drivers::adc`](crate::drivers::adc) and are
//! combined behind the port traits by
//! [`HardwareAdapter`](crate::adapters::hardware::HardwareAdapter).

pub mod battery;
pub mod depth;

pub use battery::BatteryMonitor;
pub use depth::DepthSensor;
