// Meta string encoder.
//
// selection -> per-character table lookup -> bit packing -> MetaString

use super::MAX_INPUT_LEN;
use super::alphabet::{self, SpecialChars};
use super::bits::BitPacker;
use super::encoding::{Encoding, EncodingSet};
use super::error::{MetaStringError, Result};
use super::selector;
use super::string::MetaString;

/// Encodes names with a fixed pair of special characters.
///
/// Holds no mutable state; one encoder can be shared across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaStringEncoder {
    specials: SpecialChars,
    allowed: EncodingSet,
}

impl MetaStringEncoder {
    /// Create an encoder admitting `special_char1` and `special_char2`.
    pub fn new(special_char1: char, special_char2: char) -> Result<Self> {
        Ok(Self::with_specials(SpecialChars::new(
            special_char1,
            special_char2,
        )?))
    }

    pub fn with_specials(specials: SpecialChars) -> Self {
        Self {
            specials,
            allowed: EncodingSet::default(),
        }
    }

    /// Restrict the encodings the selector may choose.
    ///
    /// UTF-8 stays available as the fallback.
    pub fn allowed_encodings(mut self, allowed: EncodingSet) -> Self {
        self.allowed = allowed;
        self
    }

    /// Never fold case away: mixed-case names use 6-bit codes instead.
    pub fn lossless(self) -> Self {
        self.allowed_encodings(EncodingSet::lossless())
    }

    pub fn specials(&self) -> SpecialChars {
        self.specials
    }

    pub fn allowed(&self) -> EncodingSet {
        self.allowed
    }

    /// Encode `input` with the cheapest allowed encoding.
    pub fn encode(&self, input: &str) -> Result<MetaString> {
        check_len(input)?;
        let encoding = selector::select(input, self.specials, self.allowed);
        self.encode_unchecked(input, encoding)
    }

    /// Encode `input` with a caller-chosen encoding.
    ///
    /// Fails with `UnsupportedCharacter` on the first character the
    /// encoding cannot carry.
    pub fn encode_with_encoding(&self, input: &str, encoding: Encoding) -> Result<MetaString> {
        check_len(input)?;
        self.encode_unchecked(input, encoding)
    }

    fn encode_unchecked(&self, input: &str, encoding: Encoding) -> Result<MetaString> {
        let encoded = match encoding.bits_per_char() {
            None => input.as_bytes().to_vec(),
            Some(width) => self.pack(input, encoding, width)?,
        };
        Ok(MetaString::new(
            Some(input.to_owned()),
            encoding,
            self.specials,
            encoded,
        ))
    }

    fn pack(&self, input: &str, encoding: Encoding, width: u32) -> Result<Vec<u8>> {
        let mut packer = BitPacker::with_capacity(width, input.len());
        for (i, ch) in input.chars().enumerate() {
            let folded = match encoding {
                Encoding::FirstToLowerSpecial if i == 0 => {
                    if !ch.is_ascii_uppercase() {
                        return Err(MetaStringError::UnsupportedCharacter { ch, encoding });
                    }
                    ch.to_ascii_lowercase()
                }
                Encoding::AllToLowerSpecial => ch.to_ascii_lowercase(),
                _ => ch,
            };
            let code = alphabet::char_to_code(encoding, self.specials, folded)
                .map_err(|_| MetaStringError::UnsupportedCharacter { ch, encoding })?;
            packer.push(code);
        }
        Ok(packer.finish())
    }

    /// Encode many names on the rayon pool, preserving order.
    #[cfg(feature = "parallel")]
    pub fn encode_batch<S: AsRef<str> + Sync>(&self, inputs: &[S]) -> Vec<Result<MetaString>> {
        use rayon::prelude::*;
        inputs.par_iter().map(|s| self.encode(s.as_ref())).collect()
    }
}

impl Default for MetaStringEncoder {
    fn default() -> Self {
        Self::with_specials(SpecialChars::default())
    }
}

fn check_len(input: &str) -> Result<()> {
    if input.len() >= MAX_INPUT_LEN {
        return Err(MetaStringError::InputTooLong { len: input.len() });
    }
    Ok(())
}

/// Encode `input` with the given special characters.
pub fn encode(input: &str, special_char1: char, special_char2: char) -> Result<MetaString> {
    MetaStringEncoder::new(special_char1, special_char2)?.encode(input)
}
