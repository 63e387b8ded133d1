#![no_main]
use libfuzzer_sys::fuzz_target;
use xmljson::decode::{base64_url, encode_base64_url, uri_component};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(bytes) = base64_url(s) {
            assert_eq!(base64_url(&encode_base64_url(&bytes)).ok(), Some(bytes));
        }
        let _ = uri_component(s, "UTF-8");
    }
});
