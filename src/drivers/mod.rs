//! Low-level peripheral drivers.
//!
//! Each driver is dual-target: real ESP-IDF calls on `target_os = "espidf"`,
//! injectable simulation state on the host.

pub mod adc;
pub mod delay;
