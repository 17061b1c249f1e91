#![no_main]
use libfuzzer_sys::fuzz_target;
use metastring::meta::{Encoding, MetaStringEncoder};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let encoder = MetaStringEncoder::default();
    let Ok(ms) = encoder.encode(input) else {
        return;
    };
    let decoded = ms.decode().unwrap();
    if ms.encoding() == Encoding::AllToLowerSpecial {
        assert_eq!(decoded, input.to_ascii_lowercase());
    } else {
        assert_eq!(decoded, input);
    }

    // Lossless selection must reproduce the input exactly.
    let ms = encoder.lossless().encode(input).unwrap();
    assert_eq!(ms.decode().unwrap(), input);
});
