//! One-shot ADC1 access.
//!
//! Readings are normalised to 10 bits (0–1023) because the range-finder
//! scale (5 mm/count) and the battery divider constants are calibrated
//! against a 10-bit converter.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: oneshot driver on ADC1, 12-bit samples shifted down to 10.
//! On host/test: per-channel `AtomicU16` cells for injection.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::pins;

/// Full-scale count of a normalised reading.
pub const ADC_FULL_SCALE: u16 = 1024;

/// Errors during one-shot ADC initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcInitError {
    UnitInitFailed(i32),
    ChannelConfigFailed(i32),
}

impl core::fmt::Display for AdcInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnitInitFailed(rc) => write!(f, "ADC1 unit init failed (rc={})", rc),
            Self::ChannelConfigFailed(rc) => write!(f, "ADC1 channel config failed (rc={})", rc),
        }
    }
}

impl core::error::Error for AdcInitError {}

// ── Simulation backend ────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU16, Ordering};

    use crate::pins::ADC1_CHANNELS;

    #[allow(clippy::declare_interior_mutable_const)]
    const ZERO: AtomicU16 = AtomicU16::new(0);
    static SIM_ADC1: [AtomicU16; ADC1_CHANNELS] = [ZERO; ADC1_CHANNELS];

    pub fn set(channel: u32, raw: u16) {
        if let Some(cell) = SIM_ADC1.get(channel as usize) {
            cell.store(raw, Ordering::Relaxed);
        }
    }

    pub fn get(channel: u32) -> u16 {
        SIM_ADC1
            .get(channel as usize)
            .map_or(0, |cell| cell.load(Ordering::Relaxed))
    }
}

/// Inject a 10-bit reading for `channel` (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(channel: u32, raw: u16) {
    sim::set(channel, raw.min(ADC_FULL_SCALE - 1));
}

// ── ESP-IDF backend ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop read path. `init()` completes before the first cycle.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

/// Configure ADC1 and the depth/battery channels. Call once at boot.
#[cfg(target_os = "espidf")]
pub fn init() -> Result<(), AdcInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(AdcInitError::UnitInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    for channel in [pins::DEPTH_ADC_CHANNEL, pins::VBAT_ADC_CHANNEL] {
        // SAFETY: handle initialised above; single-threaded boot path.
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(AdcInitError::ChannelConfigFailed(ret));
        }
    }

    log::info!(
        "adc: ADC1 configured (CH{}=depth, CH{}=vbat)",
        pins::DEPTH_ADC_CHANNEL,
        pins::VBAT_ADC_CHANNEL
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init() -> Result<(), AdcInitError> {
    log::info!(
        "adc(sim): CH{}=depth, CH{}=vbat",
        pins::DEPTH_ADC_CHANNEL,
        pins::VBAT_ADC_CHANNEL
    );
    Ok(())
}

/// Read `channel`, normalised to 10 bits. A failed conversion reads 0.
#[cfg(target_os = "espidf")]
pub fn read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        log::warn!("adc: CH{} read failed (rc={})", channel, ret);
        return 0;
    }
    (raw.clamp(0, 4095) >> 2) as u16
}

/// Read `channel`, normalised to 10 bits.
#[cfg(not(target_os = "espidf"))]
pub fn read(channel: u32) -> u16 {
    sim::get(channel)
}
