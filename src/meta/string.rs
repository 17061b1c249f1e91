// The encoded meta string record.

use std::fmt;

use super::alphabet::SpecialChars;
use super::bits;
use super::decoder;
use super::encoding::Encoding;
use super::error::Result;

/// An encoded meta string: encoding tag, special characters and payload.
///
/// Built once by the encoder (or from encoded parts) and never mutated.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MetaString {
    input_string: Option<String>,
    encoding: Encoding,
    special_char1: u8,
    special_char2: u8,
    encoded_bytes: Vec<u8>,
}

impl MetaString {
    pub(crate) fn new(
        input_string: Option<String>,
        encoding: Encoding,
        specials: SpecialChars,
        encoded_bytes: Vec<u8>,
    ) -> Self {
        Self {
            input_string,
            encoding,
            special_char1: specials.first(),
            special_char2: specials.second(),
            encoded_bytes,
        }
    }

    /// Rebuild a record from its encoded parts, decoding the text.
    ///
    /// Fails exactly when [`decoder::decode`] fails on the same parts.
    pub fn from_encoded(
        encoding: Encoding,
        special_char1: u8,
        special_char2: u8,
        encoded_bytes: Vec<u8>,
    ) -> Result<Self> {
        let text = decoder::decode(encoding, special_char1, special_char2, &encoded_bytes)?;
        Ok(Self {
            input_string: Some(text),
            encoding,
            special_char1,
            special_char2,
            encoded_bytes,
        })
    }

    /// Original (or decoded) text, when known.
    pub fn input_string(&self) -> Option<&str> {
        self.input_string.as_deref()
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn special_char1(&self) -> u8 {
        self.special_char1
    }

    pub fn special_char2(&self) -> u8 {
        self.special_char2
    }

    pub fn encoded_bytes(&self) -> &[u8] {
        &self.encoded_bytes
    }

    /// Consume the record, keeping only the payload.
    pub fn into_encoded_bytes(self) -> Vec<u8> {
        self.encoded_bytes
    }

    /// Whether the decoder must drop one trailing code read from padding.
    ///
    /// Always false for UTF-8 and for an empty payload.
    pub fn strip_last_char(&self) -> bool {
        self.encoding != Encoding::Utf8 && bits::strip_flag(&self.encoded_bytes)
    }

    /// Decode the payload again.
    ///
    /// For `AllToLowerSpecial` this is the lower-cased form of the input.
    pub fn decode(&self) -> Result<String> {
        decoder::decode(
            self.encoding,
            self.special_char1,
            self.special_char2,
            &self.encoded_bytes,
        )
    }
}

impl fmt::Debug for MetaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaString")
            .field("input_string", &self.input_string)
            .field("encoding", &self.encoding)
            .field("special_char1", &char::from(self.special_char1))
            .field("special_char2", &char::from(self.special_char2))
            .field("encoded_bytes", &format_args!("{:02x?}", self.encoded_bytes))
            .finish()
    }
}
