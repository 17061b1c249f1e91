// Encoding variants and the allowed-encoding set.
//
// The wire tag of each variant is fixed; consumers store it in the single
// byte that precedes the special characters.

use std::fmt;

use bitflags::bitflags;

use super::error::{MetaStringError, Result};

/// Bit-packing scheme of a meta string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Encoding {
    /// Raw UTF-8 bytes, no packing.
    Utf8 = 0x00,
    /// `a-z` plus the two special characters, 5 bits each.
    LowerSpecial = 0x01,
    /// `a-z`, `A-Z`, `0-9` plus the two special characters, 6 bits each.
    LowerUpperDigitSpecial = 0x02,
    /// Like `LowerSpecial`, with the first character restored to upper case.
    FirstToLowerSpecial = 0x03,
    /// Like `LowerSpecial` after folding every character to lower case.
    /// Decoding does not restore case.
    AllToLowerSpecial = 0x04,
}

impl Encoding {
    /// All variants in tag order.
    pub const ALL: [Encoding; 5] = [
        Encoding::Utf8,
        Encoding::LowerSpecial,
        Encoding::LowerUpperDigitSpecial,
        Encoding::FirstToLowerSpecial,
        Encoding::AllToLowerSpecial,
    ];

    /// One-byte wire tag.
    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Parse a wire tag.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0x00 => Ok(Encoding::Utf8),
            0x01 => Ok(Encoding::LowerSpecial),
            0x02 => Ok(Encoding::LowerUpperDigitSpecial),
            0x03 => Ok(Encoding::FirstToLowerSpecial),
            0x04 => Ok(Encoding::AllToLowerSpecial),
            _ => Err(MetaStringError::malformed(format!(
                "unknown encoding tag {tag:#04x}"
            ))),
        }
    }

    /// Width of one packed code, or `None` for UTF-8.
    #[inline]
    pub fn bits_per_char(self) -> Option<u32> {
        match self {
            Encoding::Utf8 => None,
            Encoding::LowerUpperDigitSpecial => Some(6),
            Encoding::LowerSpecial
            | Encoding::FirstToLowerSpecial
            | Encoding::AllToLowerSpecial => Some(5),
        }
    }

    /// Canonical upper-snake name, as used by other language bindings.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF_8",
            Encoding::LowerSpecial => "LOWER_SPECIAL",
            Encoding::LowerUpperDigitSpecial => "LOWER_UPPER_DIGIT_SPECIAL",
            Encoding::FirstToLowerSpecial => "FIRST_TO_LOWER_SPECIAL",
            Encoding::AllToLowerSpecial => "ALL_TO_LOWER_SPECIAL",
        }
    }

    pub(crate) fn flag(self) -> EncodingSet {
        match self {
            Encoding::Utf8 => EncodingSet::UTF_8,
            Encoding::LowerSpecial => EncodingSet::LOWER_SPECIAL,
            Encoding::LowerUpperDigitSpecial => EncodingSet::LOWER_UPPER_DIGIT_SPECIAL,
            Encoding::FirstToLowerSpecial => EncodingSet::FIRST_TO_LOWER_SPECIAL,
            Encoding::AllToLowerSpecial => EncodingSet::ALL_TO_LOWER_SPECIAL,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Encoding {
    type Error = MetaStringError;

    fn try_from(tag: u8) -> Result<Self> {
        Encoding::from_tag(tag)
    }
}

impl std::str::FromStr for Encoding {
    type Err = MetaStringError;

    /// Accepts the canonical name in any case, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self> {
        let norm = s.trim().to_ascii_uppercase().replace('-', "_");
        Encoding::ALL
            .into_iter()
            .find(|e| e.name() == norm || (norm == "UTF8" && *e == Encoding::Utf8))
            .ok_or_else(|| MetaStringError::malformed(format!("unknown encoding name '{s}'")))
    }
}

bitflags! {
    /// Set of encodings the selector may choose from.
    ///
    /// UTF-8 is the universal fallback and is always considered, whether or
    /// not `UTF_8` is in the set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EncodingSet: u8 {
        const UTF_8 = 1 << 0;
        const LOWER_SPECIAL = 1 << 1;
        const LOWER_UPPER_DIGIT_SPECIAL = 1 << 2;
        const FIRST_TO_LOWER_SPECIAL = 1 << 3;
        const ALL_TO_LOWER_SPECIAL = 1 << 4;
    }
}

impl EncodingSet {
    /// Every encoding whose round trip reproduces the input exactly.
    pub fn lossless() -> Self {
        Self::all().difference(Self::ALL_TO_LOWER_SPECIAL)
    }

    /// Whether `encoding` may be selected.
    #[inline]
    pub fn allows(self, encoding: Encoding) -> bool {
        encoding == Encoding::Utf8 || self.contains(encoding.flag())
    }
}

impl Default for EncodingSet {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Encoding> for EncodingSet {
    fn from(encoding: Encoding) -> Self {
        encoding.flag()
    }
}

impl FromIterator<Encoding> for EncodingSet {
    fn from_iter<I: IntoIterator<Item = Encoding>>(iter: I) -> Self {
        iter.into_iter()
            .fold(EncodingSet::empty(), |set, e| set | e.flag())
    }
}
