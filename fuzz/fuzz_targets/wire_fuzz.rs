#![no_main]
use libfuzzer_sys::fuzz_target;
use metastring::meta::wire;

fuzz_target!(|data: &[u8]| {
    // Every record that parses must re-frame to the bytes it came from.
    let mut pos = 0;
    while pos < data.len() {
        let Ok((ms, used)) = wire::read_meta_string(&data[pos..]) else {
            return;
        };
        let framed = wire::to_bytes(&ms);
        if framed.len() == used {
            assert_eq!(framed, &data[pos..pos + used]);
        }
        pos += used;
    }
});
