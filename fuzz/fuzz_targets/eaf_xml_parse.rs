//! Fuzz target for EAF XML parsing.
//!
//! Feeds arbitrary bytes to the EAF reader; a parsed document is written
//! back out and validated so that the writer and the checks also see the
//! odd-but-loadable documents the reader accepts.
//!
//! Run with:
//!   cargo +nightly fuzz run eaf_xml_parse

#![no_main]

use eafkit::eaf::io_eaf::{from_eaf_slice, to_eaf_string};
use eafkit::validation::{validate_document, ValidateOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid OOM on very large inputs.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(doc) = from_eaf_slice(data) {
        let _ = to_eaf_string(&doc);
        let _ = validate_document(&doc, &ValidateOptions::default());
    }
});
