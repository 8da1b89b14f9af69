//! Fuzz test for the durable record codec
//!
//! This fuzz target feeds arbitrary byte sequences to `decode` to find:
//! - Panics or crashes
//! - Inputs that decode but fail to round-trip
//!
//! Run with: cargo +nightly fuzz run codec_fuzz -- -max_total_time=60

#![no_main]

use feedcache_store::codec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding must never panic; malformed bytes come back as CorruptData.
    if let Ok(snapshot) = codec::decode(data) {
        // Anything that decodes must round-trip exactly.
        let encoded = codec::encode(&snapshot).expect("decoded snapshot should re-encode");
        let again = codec::decode(&encoded).expect("re-encoded snapshot should decode");
        assert_eq!(again, snapshot, "round trip should be lossless");
    }
});
