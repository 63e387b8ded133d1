#![no_main]
use libfuzzer_sys::fuzz_target;
use xmljson::{xml_to_json, ConversionOptions};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        for preserve in [true, false] {
            let options = ConversionOptions::default().with_preserve_namespaces(preserve);
            if let Ok(value) = xml_to_json(s, &options) {
                let _ = value.to_json_string();
            }
        }
    }
});
