use metastring::meta::{
    self, Encoding, EncodingSet, MetaString, MetaStringDecoder, MetaStringEncoder,
    MetaStringError, read_meta_string, wire,
};

fn roundtrip_with(encoder: &MetaStringEncoder, input: &str) -> (MetaString, String) {
    let ms = encoder.encode(input).unwrap();
    let text = meta::decode(
        ms.encoding(),
        ms.special_char1(),
        ms.special_char2(),
        ms.encoded_bytes(),
    )
    .unwrap();
    (ms, text)
}

#[test]
fn empty_string() {
    let ms = meta::encode("", '.', '_').unwrap();
    assert_eq!(ms.encoding(), Encoding::LowerSpecial);
    assert!(ms.encoded_bytes().is_empty());
    assert!(!ms.strip_last_char());
    assert_eq!(ms.decode().unwrap(), "");
}

#[test]
fn strip_flag_boundaries() {
    let ab = meta::encode("ab", '.', '_').unwrap();
    assert_eq!(ab.encoded_bytes().len(), 2);
    assert!(ab.strip_last_char());

    let abc = meta::encode("abc", '.', '_').unwrap();
    assert_eq!(abc.encoded_bytes().len(), 2);
    assert!(!abc.strip_last_char());

    // Same byte length as "ab", one more code.
    assert_eq!(ab.decode().unwrap(), "ab");
    assert_eq!(abc.decode().unwrap(), "abc");
}

#[test]
fn first_upper_roundtrips() {
    let encoder = MetaStringEncoder::default();
    for input in ["Person", "A", "Zoo_keeper", "Org.apache"] {
        let (ms, text) = roundtrip_with(&encoder, input);
        assert_eq!(ms.encoding(), Encoding::FirstToLowerSpecial, "{input}");
        assert_eq!(text, input);
    }
}

#[test]
fn mixed_case_folds_to_lower() {
    let encoder = MetaStringEncoder::default();
    let (ms, text) = roundtrip_with(&encoder, "createdAt");
    assert_eq!(ms.encoding(), Encoding::AllToLowerSpecial);
    assert_eq!(text, "createdat");
    assert_eq!(ms.input_string(), Some("createdAt"));

    let (ms, text) = roundtrip_with(&encoder.lossless(), "createdAt");
    assert_eq!(ms.encoding(), Encoding::LowerUpperDigitSpecial);
    assert_eq!(text, "createdAt");
}

#[test]
fn utf8_fallback_is_exact() {
    let encoder = MetaStringEncoder::default();
    for input in ["a b", "crème", "x-y", "名前", "tab\there", "🦀"] {
        let (ms, text) = roundtrip_with(&encoder, input);
        assert_eq!(ms.encoding(), Encoding::Utf8, "{input}");
        assert_eq!(ms.encoded_bytes(), input.as_bytes());
        assert!(!ms.strip_last_char());
        assert_eq!(text, input);
    }
}

#[test]
fn packed_is_smaller_than_utf8() {
    let encoder = MetaStringEncoder::default();
    for input in ["org.apache.fury.serializer", "SomeTypeName", "value_42"] {
        let ms = encoder.encode(input).unwrap();
        assert!(
            ms.encoded_bytes().len() < input.len(),
            "{input}: {} >= {}",
            ms.encoded_bytes().len(),
            input.len()
        );
    }
}

#[test]
fn custom_specials() {
    let encoder = MetaStringEncoder::new('$', '|').unwrap();
    let (ms, text) = roundtrip_with(&encoder, "outer$inner|x");
    assert_eq!(ms.encoding(), Encoding::LowerSpecial);
    assert_eq!(ms.special_char1(), b'$');
    assert_eq!(ms.special_char2(), b'|');
    assert_eq!(text, "outer$inner|x");

    // '.' is not special for this encoder.
    assert_eq!(encoder.encode("a.b").unwrap().encoding(), Encoding::Utf8);
}

#[test]
fn invalid_special_characters() {
    for (a, b) in [('a', '_'), ('.', 'Z'), ('.', '5'), ('ü', '_'), ('_', '_')] {
        assert!(
            matches!(
                MetaStringEncoder::new(a, b),
                Err(MetaStringError::InvalidSpecialCharacter { .. })
            ),
            "{a:?} {b:?}"
        );
        assert!(MetaStringDecoder::new(a, b).is_err());
    }
}

#[test]
fn forced_encodings() {
    let encoder = MetaStringEncoder::default();
    let ms = encoder
        .encode_with_encoding("abc", Encoding::LowerUpperDigitSpecial)
        .unwrap();
    assert_eq!(ms.encoding(), Encoding::LowerUpperDigitSpecial);
    assert_eq!(ms.decode().unwrap(), "abc");

    let err = encoder
        .encode_with_encoding("a-b", Encoding::LowerUpperDigitSpecial)
        .unwrap_err();
    assert_eq!(
        err,
        MetaStringError::UnsupportedCharacter {
            ch: '-',
            encoding: Encoding::LowerUpperDigitSpecial
        }
    );
}

#[test]
fn restricted_encoding_set() {
    let encoder = MetaStringEncoder::default()
        .allowed_encodings(EncodingSet::LOWER_UPPER_DIGIT_SPECIAL);
    assert_eq!(
        encoder.encode("lower").unwrap().encoding(),
        Encoding::LowerUpperDigitSpecial
    );
    assert_eq!(encoder.encode("a b").unwrap().encoding(), Encoding::Utf8);
}

#[test]
fn malformed_payloads() {
    let decoder = MetaStringDecoder::default();
    for (encoding, bytes) in [
        (Encoding::LowerSpecial, vec![0x80]),
        (Encoding::LowerSpecial, vec![0x7E]),
        (Encoding::LowerSpecial, vec![0x80, 0x00, 0x00]),
        (Encoding::LowerUpperDigitSpecial, vec![0x80]),
        (Encoding::Utf8, vec![0xC3]),
    ] {
        assert!(
            matches!(
                decoder.decode(encoding, &bytes),
                Err(MetaStringError::MalformedEncoding(_))
            ),
            "{encoding} {bytes:02x?}"
        );
    }
}

#[test]
fn framed_records() {
    let encoder = MetaStringEncoder::default();
    let names = ["org.example", "Person", "field1", "naïve"];
    let mut buf = Vec::new();
    for name in names {
        wire::write_meta_string(&mut buf, &encoder.encode(name).unwrap()).unwrap();
    }
    let mut pos = 0;
    for name in names {
        let (ms, used) = read_meta_string(&buf[pos..]).unwrap();
        assert_eq!(ms.input_string(), Some(name));
        pos += used;
    }
    assert_eq!(pos, buf.len());
}

#[test]
fn concurrent_use() {
    let encoder = MetaStringEncoder::default();
    let names: Vec<String> = (0..64).map(|i| format!("field_{i}")).collect();
    std::thread::scope(|s| {
        for chunk in names.chunks(8) {
            let encoder = &encoder;
            s.spawn(move || {
                for name in chunk {
                    let ms = encoder.encode(name).unwrap();
                    assert_eq!(ms.decode().unwrap(), *name);
                }
            });
        }
    });
}
