// Symbol <-> code tables for the packed encodings.
//
// LOWER_SPECIAL (5 bits):
//   a..z -> 0..25, special1 -> 26, special2 -> 27, 28..31 unused
//
// LOWER_UPPER_DIGIT_SPECIAL (6 bits):
//   a..z -> 0..25, A..Z -> 26..51, 0..9 -> 52..61,
//   special1 -> 62, special2 -> 63
//
// FIRST_TO_LOWER_SPECIAL and ALL_TO_LOWER_SPECIAL share the 5-bit table;
// case is normalized before lookup and restored (or not) after decode.

use super::encoding::Encoding;
use super::error::{MetaStringError, Result};

/// Number of letters in the Latin alphabet.
const LETTERS: u8 = 26;

/// 5-bit code of the first special character.
pub const LOWER_SPECIAL1_CODE: u8 = LETTERS;
/// 5-bit code of the second special character.
pub const LOWER_SPECIAL2_CODE: u8 = LETTERS + 1;

const LUDS_UPPER_BASE: u8 = LETTERS;
const LUDS_DIGIT_BASE: u8 = 2 * LETTERS;
/// 6-bit code of the first special character.
pub const LUDS_SPECIAL1_CODE: u8 = LUDS_DIGIT_BASE + 10;
/// 6-bit code of the second special character.
pub const LUDS_SPECIAL2_CODE: u8 = LUDS_SPECIAL1_CODE + 1;

/// Validated pair of special characters admitted into the packed alphabets.
///
/// Both characters are single-byte (ASCII), neither is a letter or digit,
/// and they differ from each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecialChars {
    first: u8,
    second: u8,
}

impl SpecialChars {
    /// Validate a pair of special characters.
    pub fn new(first: char, second: char) -> Result<Self> {
        let a = Self::check(first)?;
        let b = Self::check(second)?;
        if a == b {
            return Err(MetaStringError::InvalidSpecialCharacter { ch: second });
        }
        Ok(Self {
            first: a,
            second: b,
        })
    }

    /// Validate a pair read back from the wire.
    pub fn from_bytes(first: u8, second: u8) -> Result<Self> {
        Self::new(char::from(first), char::from(second))
    }

    fn check(ch: char) -> Result<u8> {
        if !ch.is_ascii() || ch.is_ascii_alphanumeric() {
            return Err(MetaStringError::InvalidSpecialCharacter { ch });
        }
        Ok(ch as u8)
    }

    #[inline]
    pub fn first(self) -> u8 {
        self.first
    }

    #[inline]
    pub fn second(self) -> u8 {
        self.second
    }

    /// Whether `ch` is one of the two special characters.
    #[inline]
    pub fn contains(self, ch: char) -> bool {
        ch.is_ascii() && (ch as u8 == self.first || ch as u8 == self.second)
    }
}

impl Default for SpecialChars {
    /// `.` and `_`, the separators of package and field names.
    fn default() -> Self {
        Self {
            first: b'.',
            second: b'_',
        }
    }
}

/// Code of `ch` in the table of `encoding`.
///
/// The case-folding variants expect already-lowered input; an upper-case
/// letter reaching them is reported as unsupported.
pub fn char_to_code(encoding: Encoding, specials: SpecialChars, ch: char) -> Result<u8> {
    let unsupported = || MetaStringError::UnsupportedCharacter { ch, encoding };
    if !ch.is_ascii() {
        return Err(unsupported());
    }
    let b = ch as u8;
    let code = match encoding {
        Encoding::Utf8 => None,
        Encoding::LowerSpecial | Encoding::FirstToLowerSpecial | Encoding::AllToLowerSpecial => {
            match b {
                b'a'..=b'z' => Some(b - b'a'),
                _ if b == specials.first => Some(LOWER_SPECIAL1_CODE),
                _ if b == specials.second => Some(LOWER_SPECIAL2_CODE),
                _ => None,
            }
        }
        Encoding::LowerUpperDigitSpecial => match b {
            b'a'..=b'z' => Some(b - b'a'),
            b'A'..=b'Z' => Some(LUDS_UPPER_BASE + (b - b'A')),
            b'0'..=b'9' => Some(LUDS_DIGIT_BASE + (b - b'0')),
            _ if b == specials.first => Some(LUDS_SPECIAL1_CODE),
            _ if b == specials.second => Some(LUDS_SPECIAL2_CODE),
            _ => None,
        },
    };
    code.ok_or_else(unsupported)
}

/// Character for `code` in the table of `encoding`.
///
/// Codes with no symbol are a decode-time inconsistency.
pub fn code_to_char(encoding: Encoding, specials: SpecialChars, code: u8) -> Result<char> {
    let b = match encoding {
        Encoding::Utf8 => None,
        Encoding::LowerSpecial | Encoding::FirstToLowerSpecial | Encoding::AllToLowerSpecial => {
            match code {
                0..LETTERS => Some(b'a' + code),
                LOWER_SPECIAL1_CODE => Some(specials.first),
                LOWER_SPECIAL2_CODE => Some(specials.second),
                _ => None,
            }
        }
        Encoding::LowerUpperDigitSpecial => match code {
            0..LUDS_UPPER_BASE => Some(b'a' + code),
            LUDS_UPPER_BASE..LUDS_DIGIT_BASE => Some(b'A' + (code - LUDS_UPPER_BASE)),
            LUDS_DIGIT_BASE..LUDS_SPECIAL1_CODE => Some(b'0' + (code - LUDS_DIGIT_BASE)),
            LUDS_SPECIAL1_CODE => Some(specials.first),
            LUDS_SPECIAL2_CODE => Some(specials.second),
            _ => None,
        },
    };
    b.map(char::from).ok_or_else(|| {
        MetaStringError::malformed(format!("code {code} has no symbol in {encoding}"))
    })
}
