//! Battery power estimation.
//!
//! The node reports battery health as a single byte in every uplink so
//! the server can chart discharge without a separate message type.
//!
//! The pack is a 0.7 Ah LiPo: 4.2 V fully charged, 3.2 V cutoff.

/// Cutoff voltage: encodes as power byte 0.
pub const CUTOFF_VOLTAGE: f32 = 3.2;
/// Nominal fully-charged voltage.
pub const MAX_VOLTAGE: f32 = 4.2;
/// Pack capacity (Ah) used by the percentage model.
pub const CAPACITY_AH: f32 = 0.7;

/// Power byte for transmission: hundredths of a volt above cutoff.
///
/// `floor((voltage - 3.2) * 100)`, clamped to `0..=255`. Below cutoff
/// reads 0 and anything above ~5.75 V saturates at 255 instead of
/// wrapping. Non-finite input encodes as 0.
pub fn estimate_power_byte(voltage: f32) -> u8 {
    let scaled = ((voltage - CUTOFF_VOLTAGE) * 100.0).floor();
    if !scaled.is_finite() {
        return 0;
    }
    scaled.clamp(0.0, 255.0) as u8
}

/// Remaining charge estimate in percent, clamped to `0..=100`.
///
/// `floor((((voltage * 0.7) - 2.24) / 0.7) * 100)`, a linear model of
/// the usable window between cutoff and nominal max.
pub fn estimate_percentage(voltage: f32) -> u8 {
    let cutoff_ah = CUTOFF_VOLTAGE * CAPACITY_AH;
    let pct = ((((voltage * CAPACITY_AH) - cutoff_ah) / CAPACITY_AH) * 100.0).floor();
    if !pct.is_finite() {
        return 0;
    }
    pct.clamp(0.0, 100.0) as u8
}
