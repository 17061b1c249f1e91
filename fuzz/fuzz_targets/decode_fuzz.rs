#![no_main]
use libfuzzer_sys::fuzz_target;
use metastring::meta::{self, Encoding};

fuzz_target!(|data: &[u8]| {
    // The decoder must never panic — only return errors.
    if data.len() < 3 {
        return;
    }
    let Ok(encoding) = Encoding::from_tag(data[0] % 5) else {
        return;
    };
    let _ = meta::decode(encoding, data[1], data[2], &data[3..]);
});
