//! Multi-byte symbol encoding used when a codec is asked to write symbols as "utf8".
//!
//! This is the original (RFC 2279) form of UTF-8: one to six bytes, covering every value below
//! 2^31. Surrogates and overlong forms are not policed; symbols are opaque numbers here, not
//! text, so any 31 bit value is accepted on both sides.

use std::io::Read;

use crate::error::{CodecError, Result};

/// Largest value the six byte form can carry.
pub const MAX_CODE_POINT: u32 = 0x7fff_ffff;

/// Number of bytes needed to encode `value`.
pub fn encoded_len(value: u32) -> Result<usize> {
    Ok(match value {
        0..=0x7f => 1,
        0x80..=0x7ff => 2,
        0x800..=0xffff => 3,
        0x1_0000..=0x1f_ffff => 4,
        0x20_0000..=0x3ff_ffff => 5,
        0x400_0000..=MAX_CODE_POINT => 6,
        _ => return Err(CodecError::InvalidCodePoint(value)),
    })
}

/// Append the encoding of `value` to `out`.
pub fn encode_code_point(value: u32, out: &mut Vec<u8>) -> Result<()> {
    let len = encoded_len(value)?;
    if len == 1 {
        out.push(value as u8);
        return Ok(());
    }
    // Lead byte: `len` ones, a zero, then the top bits of the value.
    let lead_marker = !(0xff_u8 >> len);
    let lead_bits = (value >> (6 * (len - 1))) as u8;
    out.push(lead_marker | lead_bits);
    // Continuation bytes carry six bits each, high bits first.
    for shift in (0..len - 1).rev() {
        out.push(0x80 | ((value >> (6 * shift)) & 0x3f) as u8);
    }
    Ok(())
}

/// Sequence length announced by a lead byte, or None if the byte cannot start a sequence.
fn sequence_len(lead: u8) -> Option<usize> {
    match lead.leading_ones() {
        0 => Some(1),
        n @ 2..=6 => Some(n as usize),
        _ => None,
    }
}

/// Read one encoded value from `source`.
pub fn read_code_point<R: Read>(source: &mut R) -> Result<u32> {
    let mut lead = [0_u8; 1];
    source.read_exact(&mut lead)?;
    let len = sequence_len(lead[0]).ok_or_else(|| {
        CodecError::corrupted(format!("invalid multi-byte lead byte {:#04x}", lead[0]))
    })?;
    if len == 1 {
        return Ok(lead[0] as u32);
    }

    let mut value = (lead[0] & (0x7f >> len)) as u32;
    let mut tail = [0_u8; 5];
    source.read_exact(&mut tail[..len - 1])?;
    for &byte in &tail[..len - 1] {
        if byte & 0xc0 != 0x80 {
            return Err(CodecError::corrupted(format!(
                "invalid multi-byte continuation byte {:#04x}",
                byte
            )));
        }
        value = (value << 6) | (byte & 0x3f) as u32;
    }
    Ok(value)
}

#[cfg(test)]
mod test {
    use super::*;

    fn encode(value: u32) -> Vec<u8> {
        let mut out = vec![];
        encode_code_point(value, &mut out).unwrap();
        out
    }

    #[test]
    fn matches_std_for_scalar_values() {
        for c in ['a', 'é', '€', '😀'] {
            let mut buf = [0_u8; 4];
            assert_eq!(encode(c as u32), c.encode_utf8(&mut buf).as_bytes());
        }
    }

    #[test]
    fn lengths_at_boundaries() {
        let cases = [
            (0x7f, 1),
            (0x80, 2),
            (0x7ff, 2),
            (0x800, 3),
            (0xffff, 3),
            (0x1_0000, 4),
            (0x1f_ffff, 4),
            (0x20_0000, 5),
            (0x3ff_ffff, 5),
            (0x400_0000, 6),
            (MAX_CODE_POINT, 6),
        ];
        for (value, len) in cases {
            assert_eq!(encode(value).len(), len, "value {:#x}", value);
            let bytes = encode(value);
            assert_eq!(read_code_point(&mut bytes.as_slice()).unwrap(), value);
        }
    }

    #[test]
    fn rejects_values_above_31_bits() {
        let mut out = vec![];
        assert!(matches!(
            encode_code_point(0x8000_0000, &mut out),
            Err(CodecError::InvalidCodePoint(0x8000_0000))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn reads_sequences_back_to_back() {
        let mut bytes = encode(0x41);
        bytes.extend(encode(0x20ac));
        bytes.extend(encode(0x1_f600));
        let mut source = bytes.as_slice();
        assert_eq!(read_code_point(&mut source).unwrap(), 0x41);
        assert_eq!(read_code_point(&mut source).unwrap(), 0x20ac);
        assert_eq!(read_code_point(&mut source).unwrap(), 0x1_f600);
        assert!(source.is_empty());
    }

    #[test]
    fn bad_bytes_are_corrupted_data() {
        // A bare continuation byte cannot lead.
        assert!(matches!(
            read_code_point(&mut [0x80_u8].as_slice()),
            Err(CodecError::CorruptedData(_))
        ));
        // Lead announces two bytes but the second is not a continuation.
        assert!(matches!(
            read_code_point(&mut [0xc3_u8, 0x41].as_slice()),
            Err(CodecError::CorruptedData(_))
        ));
        // Truncated sequence surfaces as an I/O error.
        assert!(matches!(
            read_code_point(&mut [0xe2_u8, 0x82].as_slice()),
            Err(CodecError::Io(_))
        ));
    }
}
