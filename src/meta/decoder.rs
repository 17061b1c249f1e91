// Meta string decoder.
//
// bit unpacking -> per-code table lookup -> case restoration

use super::alphabet::{self, SpecialChars};
use super::bits::BitUnpacker;
use super::encoding::Encoding;
use super::error::{MetaStringError, Result};

/// Decodes payloads written with a fixed pair of special characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetaStringDecoder {
    specials: SpecialChars,
}

impl MetaStringDecoder {
    pub fn new(special_char1: char, special_char2: char) -> Result<Self> {
        Ok(Self::with_specials(SpecialChars::new(
            special_char1,
            special_char2,
        )?))
    }

    pub fn with_specials(specials: SpecialChars) -> Self {
        Self { specials }
    }

    /// Decode `bytes` written with `encoding`.
    pub fn decode(&self, encoding: Encoding, bytes: &[u8]) -> Result<String> {
        let Some(width) = encoding.bits_per_char() else {
            return String::from_utf8(bytes.to_vec()).map_err(|e| {
                log::debug!("rejecting UTF-8 meta string: {e}");
                MetaStringError::malformed(format!("invalid UTF-8: {e}"))
            });
        };

        let codes = BitUnpacker::new(bytes, width).inspect_err(|e| {
            log::debug!("rejecting {} byte {encoding} payload: {e}", bytes.len());
        })?;
        let mut out = String::with_capacity(codes.len());
        for code in codes {
            out.push(alphabet::code_to_char(encoding, self.specials, code)?);
        }

        if encoding == Encoding::FirstToLowerSpecial {
            // The payload is ASCII, so the first byte is a whole character.
            if let Some(first) = out.get_mut(..1) {
                first.make_ascii_uppercase();
            }
        }
        Ok(out)
    }
}

/// Decode a payload from its encoding tag and raw special-character bytes.
///
/// The special characters are only validated for packed encodings.
pub fn decode(
    encoding: Encoding,
    special_char1: u8,
    special_char2: u8,
    bytes: &[u8],
) -> Result<String> {
    let specials = match encoding {
        Encoding::Utf8 => SpecialChars::default(),
        _ => SpecialChars::from_bytes(special_char1, special_char2)?,
    };
    MetaStringDecoder::with_specials(specials).decode(encoding, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::encoder::MetaStringEncoder;

    fn roundtrip(input: &str) -> String {
        let ms = MetaStringEncoder::default().encode(input).unwrap();
        decode(
            ms.encoding(),
            ms.special_char1(),
            ms.special_char2(),
            ms.encoded_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn lossless_encodings_roundtrip() {
        for input in [
            "",
            "a",
            "ab",
            "abc",
            "abcdefgh",
            "org.apache.fury",
            "snake_case_name",
            "Person",
            "X",
            "field1",
            "Field_2.x9",
            "name-with-dash",
            "日本語",
        ] {
            assert_eq!(roundtrip(input), input);
        }
    }

    #[test]
    fn all_to_lower_loses_case() {
        assert_eq!(roundtrip("personName"), "personname");
        assert_eq!(roundtrip("HTTP.Server"), "http.server");
    }

    #[test]
    fn decodes_known_payload() {
        let dec = MetaStringDecoder::default();
        assert_eq!(dec.decode(Encoding::LowerSpecial, &[0x80, 0x20]).unwrap(), "ab");
        assert_eq!(
            dec.decode(Encoding::FirstToLowerSpecial, &[0x80, 0x20]).unwrap(),
            "Ab"
        );
        assert_eq!(
            dec.decode(Encoding::AllToLowerSpecial, &[0x80, 0x20]).unwrap(),
            "ab"
        );
        assert_eq!(dec.decode(Encoding::Utf8, b"a-b").unwrap(), "a-b");
    }

    #[test]
    fn utf8_ignores_specials() {
        assert_eq!(decode(Encoding::Utf8, b'a', b'a', b"x").unwrap(), "x");
        assert!(matches!(
            decode(Encoding::LowerSpecial, b'a', b'_', &[0x80, 0x20]),
            Err(MetaStringError::InvalidSpecialCharacter { ch: 'a' })
        ));
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(
            decode(Encoding::Utf8, b'.', b'_', &[0xFF, 0xFE]),
            Err(MetaStringError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn rejects_unassigned_code() {
        // 0 | 11111 | 00 -> code 31 has no LOWER_SPECIAL symbol.
        assert!(matches!(
            decode(Encoding::LowerSpecial, b'.', b'_', &[0x7C]),
            Err(MetaStringError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn specials_must_match_encoder() {
        let ms = MetaStringEncoder::new('$', '|')
            .unwrap()
            .encode("a$b|c")
            .unwrap();
        assert_eq!(ms.encoding(), Encoding::LowerSpecial);
        let other = decode(ms.encoding(), b'.', b'_', ms.encoded_bytes()).unwrap();
        assert_eq!(other, "a.b_c");
        assert_eq!(ms.decode().unwrap(), "a$b|c");
    }
}
