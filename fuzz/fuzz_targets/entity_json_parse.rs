//! Fuzz target for entity JSON parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the entity parser,
//! checking for panics, crashes, or hangs. Parsed entities must serialize
//! to JSON that parses again.

#![no_main]

use datapub::Entity;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(entity) = Entity::from_json_str(text) {
        let json = entity.to_json().expect("entity serializes");
        let _ = Entity::from_json_str(&json).expect("serialized entity parses");
    }
});
