//! Fuzz the persisted device-mode blob decoder
//!
//! Arbitrary bytes must either decode into a mode that re-encodes to an
//! equivalent blob, or be rejected cleanly; the decoder must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use windisplay::devmode::DeviceMode;

fuzz_target!(|data: &[u8]| {
    if let Ok(mode) = DeviceMode::from_tail(data) {
        // Decoded modes survive a round trip
        let blob = mode.to_tail();
        let again = DeviceMode::from_tail(&blob).expect("re-decode of encoded mode");
        assert_eq!(mode, again);
    }
});
