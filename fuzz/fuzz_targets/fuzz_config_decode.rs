//! Fuzz target: stored configuration decode
//!
//! Feeds arbitrary bytes to the NVS blob decoder and verifies:
//! - No panics on truncated or malformed postcard input
//! - Anything that decodes also passes range validation
//! - A decoded config re-encodes to bytes that decode to the same value
//! - A controller built from it starts with a usable cadence
//!
//! cargo fuzz run fuzz_config_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use riverlevel::TelemetryController;
use riverlevel::adapters::nvs::decode_config;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = decode_config(data) else {
        return;
    };
    assert!(cfg.validate().is_ok(), "decoder let through {:?}", cfg);

    let bytes = postcard::to_allocvec(&cfg).expect("valid config must encode");
    assert_eq!(decode_config(&bytes).ok().as_ref(), Some(&cfg));

    let controller = TelemetryController::new(cfg);
    assert!(!controller.current_cadence().is_zero());
});
