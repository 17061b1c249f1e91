// Fixed-width code packing with the strip flag.
//
// Layout, MSB-first from bit 7 of byte 0:
//
//   [strip: 1][code 0: w][code 1: w] ... [code n-1: w][zero padding]
//
// n codes take L = ceil((1 + n*w) / 8) bytes; n = 0 takes no bytes at all.
// Byte length alone admits two code counts whenever the padding could hold
// one more code, so the strip flag records which one the writer meant:
//
//   strip = (8*L - 1 - n*w) >= w
//   n     = floor((8*L - 1) / w) - strip
//
// Nothing outside this module reads or writes the flag bit.

use super::error::{MetaStringError, Result};

const STRIP_FLAG: u8 = 0x80;

/// Bytes needed to pack `count` codes of `width` bits, flag included.
#[inline]
pub fn packed_len(count: usize, width: u32) -> usize {
    if count == 0 {
        return 0;
    }
    (1 + count * width as usize).div_ceil(8)
}

/// Whether a packed stream of `count` codes carries the strip flag.
#[inline]
pub fn needs_strip(count: usize, width: u32) -> bool {
    let len = packed_len(count, width);
    len != 0 && len * 8 - 1 - count * width as usize >= width as usize
}

/// Reads the strip flag of a packed stream.
#[inline]
pub fn strip_flag(bytes: &[u8]) -> bool {
    bytes.first().is_some_and(|b| b & STRIP_FLAG != 0)
}

/// Appends fixed-width codes MSB-first into a byte buffer.
///
/// Bit 7 of the first byte is reserved for the strip flag, which
/// `finish` sets once the final code count is known.
#[derive(Debug, Clone)]
pub struct BitPacker {
    bytes: Vec<u8>,
    width: u32,
    /// Accumulated bits not yet flushed, right-aligned.
    acc: u32,
    /// Number of valid bits in `acc` (always < 8 between pushes).
    acc_bits: u32,
    count: usize,
}

impl BitPacker {
    /// Create a packer for `capacity` codes of `width` bits (1..=8).
    pub fn with_capacity(width: u32, capacity: usize) -> Self {
        debug_assert!((1..=8).contains(&width), "code width {width} out of range");
        Self {
            bytes: Vec::with_capacity(packed_len(capacity, width)),
            width,
            acc: 0,
            // The flag bit is the first bit in the stream.
            acc_bits: 1,
            count: 0,
        }
    }

    /// Append one code; only its low `width` bits are used.
    #[inline]
    pub fn push(&mut self, code: u8) {
        let mask = (1u32 << self.width) - 1;
        self.acc = (self.acc << self.width) | (u32::from(code) & mask);
        self.acc_bits += self.width;
        while self.acc_bits >= 8 {
            self.acc_bits -= 8;
            self.bytes.push((self.acc >> self.acc_bits) as u8);
        }
        self.acc &= (1u32 << self.acc_bits) - 1;
        self.count += 1;
    }

    /// Number of codes pushed so far.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Flush the zero-padded final byte and set the strip flag.
    pub fn finish(mut self) -> Vec<u8> {
        if self.count == 0 {
            return Vec::new();
        }
        if self.acc_bits > 0 {
            self.bytes.push((self.acc << (8 - self.acc_bits)) as u8);
        }
        debug_assert_eq!(self.bytes.len(), packed_len(self.count, self.width));
        if needs_strip(self.count, self.width) {
            self.bytes[0] |= STRIP_FLAG;
        }
        self.bytes
    }
}

/// Pack `codes` of `width` bits into a flagged byte stream.
pub fn pack(codes: &[u8], width: u32) -> Vec<u8> {
    let mut packer = BitPacker::with_capacity(width, codes.len());
    for &code in codes {
        packer.push(code);
    }
    packer.finish()
}

/// Reads fixed-width codes back out of a flagged byte stream.
///
/// Construction validates the stream length against the strip flag, so the
/// iterator yields exactly the codes the writer pushed.
#[derive(Debug, Clone)]
pub struct BitUnpacker<'a> {
    data: &'a [u8],
    width: u32,
    /// Next bit to read; bit 0 is the MSB of byte 0 (the flag).
    bit_pos: usize,
    remaining: usize,
}

impl<'a> BitUnpacker<'a> {
    pub fn new(data: &'a [u8], width: u32) -> Result<Self> {
        let remaining = code_count(data, width)?;
        Ok(Self {
            data,
            width,
            bit_pos: 1,
            remaining,
        })
    }

    /// Codes left to read.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn read(&mut self) -> u8 {
        let mut value = 0u32;
        let mut need = self.width;
        while need > 0 {
            let byte = u32::from(self.data[self.bit_pos / 8]);
            let offset = (self.bit_pos % 8) as u32;
            let take = need.min(8 - offset);
            let bits = (byte >> (8 - offset - take)) & ((1 << take) - 1);
            value = (value << take) | bits;
            self.bit_pos += take as usize;
            need -= take;
        }
        value as u8
    }
}

impl Iterator for BitUnpacker<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.read())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for BitUnpacker<'_> {}

/// Unpack a flagged byte stream into codes of `width` bits.
pub fn unpack(data: &[u8], width: u32) -> Result<Vec<u8>> {
    Ok(BitUnpacker::new(data, width)?.collect())
}

/// Number of codes encoded in `data`, after checking that `pack` could have
/// produced it.
fn code_count(data: &[u8], width: u32) -> Result<usize> {
    if data.is_empty() {
        return Ok(0);
    }
    let w = width as usize;
    let capacity = data.len() * 8 - 1;
    let strip = strip_flag(data);
    let count = match (capacity / w).checked_sub(usize::from(strip)) {
        Some(n) if n > 0 => n,
        _ => {
            return Err(MetaStringError::malformed(format!(
                "{} byte(s) hold no {width}-bit code",
                data.len()
            )));
        }
    };
    if packed_len(count, width) != data.len() {
        return Err(MetaStringError::malformed(format!(
            "{} byte(s) are too long for {count} {width}-bit code(s)",
            data.len()
        )));
    }
    let used = 1 + count * w;
    let padding = data.len() * 8 - used;
    if padding > 0 {
        let last = data[data.len() - 1];
        if last & ((1u16 << padding.min(8)) - 1) as u8 != 0 {
            return Err(MetaStringError::malformed("non-zero padding bits"));
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stream_has_no_flag_byte() {
        assert!(pack(&[], 5).is_empty());
        assert_eq!(unpack(&[], 5).unwrap(), Vec::<u8>::new());
        assert!(!strip_flag(&[]));
    }

    #[test]
    fn packs_msb_first_after_flag() {
        // 0 | 00001 | 00010 | 00000 -> 0000_0100 0100_0000
        assert_eq!(pack(&[1, 2, 0], 5), vec![0x04, 0x40]);
        // 0 | 11111 | 00 (pad)
        assert_eq!(pack(&[31], 5), vec![0b0111_1100]);
    }

    #[test]
    fn strip_flag_marks_room_for_one_more_code() {
        // 1 + 2*5 = 11 bits -> 2 bytes, 5 padding bits: ambiguous with 3 codes.
        assert!(needs_strip(2, 5));
        // 1 + 3*5 = 16 bits -> exact fit.
        assert!(!needs_strip(3, 5));
        // 1 + 8*5 = 41 bits -> 6 bytes, 7 padding bits.
        assert!(needs_strip(8, 5));
        assert!(!needs_strip(9, 5));
        // 1 + 1*6 = 7 bits -> 1 byte.
        assert!(!needs_strip(1, 6));
        // 1 + 2*6 = 13 bits -> 2 bytes, 3 padding bits.
        assert!(!needs_strip(2, 6));
        // 1 + 3*6 = 19 bits -> 3 bytes, 5 padding bits.
        assert!(!needs_strip(3, 6));
        // 1 + 6*6 = 37 bits -> 5 bytes, 3 padding; 1 + 5*6 = 31 -> 4 bytes, 1.
        assert!(!needs_strip(5, 6));
        assert!(!needs_strip(0, 5));

        let bytes = pack(&[0, 1], 5);
        assert!(strip_flag(&bytes));
        assert_eq!(unpack(&bytes, 5).unwrap(), vec![0, 1]);
    }

    #[test]
    fn every_count_survives_both_widths() {
        for width in [5u32, 6] {
            let max = (1u8 << width) - 1;
            for n in 0..64usize {
                let codes: Vec<u8> = (0..n).map(|i| ((i * 7 + 3) as u8) & max).collect();
                let bytes = pack(&codes, width);
                assert_eq!(bytes.len(), packed_len(n, width), "n={n} w={width}");
                assert_eq!(strip_flag(&bytes), needs_strip(n, width));
                assert_eq!(unpack(&bytes, width).unwrap(), codes, "n={n} w={width}");
            }
        }
    }

    #[test]
    fn packer_tracks_count() {
        let mut packer = BitPacker::with_capacity(6, 4);
        assert!(packer.is_empty());
        packer.push(63);
        packer.push(0);
        assert_eq!(packer.len(), 2);
        // 0 | 111111 | 000000 | 000 -> 0111_1110 0000_0000
        assert_eq!(packer.finish(), vec![0x7E, 0x00]);
    }

    #[test]
    fn unpacker_reports_exact_size() {
        let bytes = pack(&[4, 5, 6, 7], 6);
        let it = BitUnpacker::new(&bytes, 6).unwrap();
        assert_eq!(it.len(), 4);
        assert_eq!(it.remaining(), 4);
    }

    #[test]
    fn rejects_inconsistent_length() {
        // A single byte with the flag set: 7 bits, one 5-bit code, minus strip = 0.
        assert!(matches!(
            unpack(&[0x80], 5),
            Err(MetaStringError::MalformedEncoding(_))
        ));
        // Three bytes with the flag: 23 / 5 - 1 = 3 codes, which fit in two.
        assert!(matches!(
            unpack(&[0x80, 0x00, 0x00], 5),
            Err(MetaStringError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn rejects_non_zero_padding() {
        let mut bytes = pack(&[1, 2], 5);
        *bytes.last_mut().unwrap() |= 0x01;
        assert!(matches!(
            unpack(&bytes, 5),
            Err(MetaStringError::MalformedEncoding(_))
        ));
    }
}
