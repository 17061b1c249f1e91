// Encoding selection.
//
// One pass classifies every character; the cheapest capable encoding in
// the caller's allowed set wins:
//
//   LOWER_SPECIAL             all lower-case letters or specials
//   FIRST_TO_LOWER_SPECIAL    only the first character upper-case
//   ALL_TO_LOWER_SPECIAL      letters of mixed case and specials, no digits
//   LOWER_UPPER_DIGIT_SPECIAL letters, digits and specials
//   UTF_8                     anything else

use super::alphabet::SpecialChars;
use super::encoding::{Encoding, EncodingSet};

/// Character-class census of an input string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharStats {
    pub(crate) len: usize,
    pub(crate) lower: usize,
    pub(crate) upper: usize,
    pub(crate) digit: usize,
    pub(crate) special: usize,
    /// Characters outside every packed alphabet (including non-ASCII).
    pub(crate) other: usize,
    pub(crate) first_is_upper: bool,
}

impl CharStats {
    pub fn collect(input: &str, specials: SpecialChars) -> Self {
        let mut stats = CharStats::default();
        for (i, ch) in input.chars().enumerate() {
            stats.len += 1;
            if ch.is_ascii_lowercase() {
                stats.lower += 1;
            } else if ch.is_ascii_uppercase() {
                stats.upper += 1;
                if i == 0 {
                    stats.first_is_upper = true;
                }
            } else if ch.is_ascii_digit() {
                stats.digit += 1;
            } else if specials.contains(ch) {
                stats.special += 1;
            } else {
                stats.other += 1;
            }
        }
        stats
    }

    /// Whether `encoding` can represent the classified input.
    pub fn fits(&self, encoding: Encoding) -> bool {
        match encoding {
            Encoding::Utf8 => true,
            _ if self.other > 0 => false,
            Encoding::LowerSpecial => self.upper == 0 && self.digit == 0,
            Encoding::FirstToLowerSpecial => {
                self.upper == 1 && self.first_is_upper && self.digit == 0
            }
            Encoding::AllToLowerSpecial => self.digit == 0,
            Encoding::LowerUpperDigitSpecial => true,
        }
    }
}

/// Candidates in the order they are tried.
const PREFERENCE: [Encoding; 5] = [
    Encoding::LowerSpecial,
    Encoding::FirstToLowerSpecial,
    Encoding::AllToLowerSpecial,
    Encoding::LowerUpperDigitSpecial,
    Encoding::Utf8,
];

/// Pick the cheapest allowed encoding able to carry `input`.
pub fn select(input: &str, specials: SpecialChars, allowed: EncodingSet) -> Encoding {
    let stats = CharStats::collect(input, specials);
    let encoding = PREFERENCE
        .into_iter()
        .find(|&e| allowed.allows(e) && stats.fits(e))
        .unwrap_or(Encoding::Utf8);
    log::trace!("selected {encoding} for {input:?} ({stats:?})");
    encoding
}
