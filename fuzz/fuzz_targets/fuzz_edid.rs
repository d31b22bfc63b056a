//! Fuzz the EDID parser
//!
//! Arbitrary bytes must parse into (possibly empty) metadata without ever
//! panicking or producing non-UTF-8 strings.

#![no_main]

use libfuzzer_sys::fuzz_target;
use windisplay::topology::parse_edid;

fuzz_target!(|data: &[u8]| {
    let info = parse_edid(data);
    if let Some(manufacturer) = &info.manufacturer {
        assert_eq!(manufacturer.len(), 3);
    }
    if let Some(name) = &info.name {
        assert!(!name.is_empty());
    }
});
