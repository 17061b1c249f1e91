// Error taxonomy shared by every meta string operation.

use super::encoding::Encoding;

/// Errors produced while encoding, decoding or framing a meta string.
///
/// No variant is transient: retrying the same call with the same input
/// always fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetaStringError {
    /// A caller-supplied special character is not a single byte, is an
    /// ASCII letter or digit, or equals the other special character.
    #[error("invalid special character {ch:?}")]
    InvalidSpecialCharacter { ch: char },

    /// A character has no code in the alphabet of `encoding`.
    #[error("character {ch:?} cannot be encoded as {encoding}")]
    UnsupportedCharacter { ch: char, encoding: Encoding },

    /// Encoded bytes (or their framing) are inconsistent.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// Input is longer than the maximum meta string length.
    #[error("meta string of {len} bytes exceeds the {max} byte limit", max = super::MAX_INPUT_LEN - 1)]
    InputTooLong { len: usize },
}

impl MetaStringError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedEncoding(msg.into())
    }
}

/// Result alias for meta string operations.
pub type Result<T> = std::result::Result<T, MetaStringError>;
