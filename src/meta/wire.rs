// Reference framing of a meta string record:
//
//   [encoding tag: 1][special1: 1][special2: 1][len: varint][payload: len]
//
// The length is a base-128 big-endian varint: most-significant group first,
// bit 7 set on every byte except the last. The surrounding protocol may
// frame records differently; this layout is what the CLI reads and writes.

use std::io::{self, Write};

use super::encoding::Encoding;
use super::error::{MetaStringError, Result};
use super::string::MetaString;

/// Fixed bytes before the length prefix.
const HEADER_LEN: usize = 3;

/// Bytes taken by the length prefix of a `len`-byte payload.
fn prefix_len(len: usize) -> usize {
    let bits = usize::BITS - len.leading_zeros();
    bits.max(1).div_ceil(7) as usize
}

/// Append the length prefix for `len`, most-significant group first.
fn push_len(out: &mut Vec<u8>, len: usize) {
    for group in (0..prefix_len(len)).rev() {
        let bits = ((len >> (7 * group)) & 0x7F) as u8;
        out.push(if group == 0 { bits } else { bits | 0x80 });
    }
}

/// Parse the length prefix at the front of `data`; returns `(len, consumed)`.
fn read_len(data: &[u8]) -> Result<(usize, usize)> {
    let mut len = 0usize;
    for (i, &byte) in data.iter().enumerate() {
        if len > usize::MAX >> 7 {
            return Err(MetaStringError::malformed("length prefix overflow"));
        }
        len = (len << 7) | usize::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((len, i + 1));
        }
    }
    Err(MetaStringError::malformed("truncated length prefix"))
}

/// Number of bytes `write_meta_string` emits for `ms`.
pub fn framed_len(ms: &MetaString) -> usize {
    let len = ms.encoded_bytes().len();
    HEADER_LEN + prefix_len(len) + len
}

/// Serialize `ms` into a fresh buffer.
pub fn to_bytes(ms: &MetaString) -> Vec<u8> {
    let payload = ms.encoded_bytes();
    let mut out = Vec::with_capacity(framed_len(ms));
    out.extend_from_slice(&[ms.encoding().tag(), ms.special_char1(), ms.special_char2()]);
    push_len(&mut out, payload.len());
    out.extend_from_slice(payload);
    out
}

/// Write `ms` in the reference layout.
pub fn write_meta_string<W: Write>(w: &mut W, ms: &MetaString) -> io::Result<()> {
    w.write_all(&to_bytes(ms))
}

/// Read one framed record from the front of `data`.
///
/// Returns the decoded record and the number of bytes consumed. The
/// record's `input_string` is the decoded text.
pub fn read_meta_string(data: &[u8]) -> Result<(MetaString, usize)> {
    let Some((header, rest)) = data.split_first_chunk::<HEADER_LEN>() else {
        return Err(MetaStringError::malformed(format!(
            "truncated header: {} of {HEADER_LEN} bytes",
            data.len()
        )));
    };
    let [tag, special1, special2] = *header;
    let encoding = Encoding::from_tag(tag)?;
    let (len, prefix) = read_len(rest)?;
    let payload = rest[prefix..].get(..len).ok_or_else(|| {
        MetaStringError::malformed(format!(
            "truncated payload: need {len} bytes, have {}",
            rest.len() - prefix
        ))
    })?;
    let ms = MetaString::from_encoded(encoding, special1, special2, payload.to_vec())?;
    Ok((ms, HEADER_LEN + prefix + len))
}
