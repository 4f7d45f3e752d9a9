//! Fuzz target for JSON document snapshots.
//!
//! Run with:
//!   cargo +nightly fuzz run document_json_parse

#![no_main]

use eafkit::eaf::io_json::from_json_str;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(doc) = from_json_str(text) {
        // Snapshots are not checked for consistency on load; every query
        // must still fail cleanly instead of panicking.
        for name in doc.tier_names() {
            let _ = doc.annotations_of(name);
        }
        let _ = doc.full_time_interval();
    }
});
