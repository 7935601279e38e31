#![no_main]

use libfuzzer_sys::fuzz_target;
use ferrous_locator::config::{parse_properties, MapSource, PropertySource};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must fail cleanly, never panic
    if let Ok(source) = parse_properties(text) {
        for key in source.keys() {
            assert!(!key.is_empty());
            assert!(source.get(&key).is_some());
        }
    }
    let _ = MapSource::from_json_str(text);
});
