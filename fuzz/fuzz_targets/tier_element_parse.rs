//! Fuzz target for single `<TIER>` element parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run tier_element_parse

#![no_main]

use eafkit::eaf::io_eaf::fuzz_parse_tier;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };
    let _ = fuzz_parse_tier(xml);
});
