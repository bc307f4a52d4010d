//! Fuzz target for COCO annotation files.
//!
//! Feeds arbitrary bytes to the COCO partition parser and forces the lazy
//! class, image and annotation collections, looking for panics.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use odconvert::dataset::io_coco::fuzz_parse_partition;

fuzz_target!(|data: &[u8]| {
    // 10MB is generous for a single annotation file.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = fuzz_parse_partition(data);
});
