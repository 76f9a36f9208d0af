//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                   |
//! |------------|---------------------|-------------------------------|
//! | `console`  | OperatorInput       | Serial console line reader    |
//! | `hardware` | SensorPort          | Range-finder on ESP32 ADC1    |
//! |            | BatteryPort         | VBAT divider on ESP32 ADC1    |
//! | `log_sink` | EventSink           | Serial log output             |
//! | `nvs`      | ConfigPort          | NVS / in-memory store         |
//! | `radio`    | TransportPort       | Framed uplinks to the log     |
//! | `sd_log`   | ReadingLog          | CSV file on the SD card       |

pub mod console;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod radio;
pub mod sd_log;
