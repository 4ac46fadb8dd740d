//! Fixed-width little-endian integers and symbol (de)serialization shared by every codec.
//!
//! Counts, lengths and indices are always plain integers. Symbols go through
//! `write_symbol`/`read_symbol`, which honour the caller's `utf8` flag.

use std::io::{Read, Write};

use super::symbol::Symbol;
use super::utf8::{encode_code_point, read_code_point};
use crate::error::{CodecError, Result};

/// Cap on speculative allocation when a length prefix comes off the wire.
const MAX_PREALLOC: usize = 1 << 16;

pub fn write_u8<W: Write>(w: &mut W, value: u8) -> Result<()> {
    w.write_all(&[value])?;
    Ok(())
}

pub fn write_u16<W: Write>(w: &mut W, value: u16) -> Result<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_u32<W: Write>(w: &mut W, value: u32) -> Result<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut buf = [0_u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u16<R: Read>(r: &mut R) -> Result<u16> {
    let mut buf = [0_u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0_u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Convert an in-memory length to the u32 the wire format carries.
pub fn wire_len(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| CodecError::InvalidSetting(format!("length {} does not fit in u32", len)))
}

/// Capacity to reserve for a length read from the stream. A corrupt length must not be able
/// to request gigabytes up front; the vector still grows as real data arrives.
pub fn prealloc(len: usize) -> usize {
    len.min(MAX_PREALLOC)
}

pub fn write_symbol<S: Symbol, W: Write>(w: &mut W, symbol: S, utf8: bool) -> Result<()> {
    let mut buf = Vec::with_capacity(6);
    if utf8 {
        encode_code_point(symbol.to_u32(), &mut buf)?;
    } else {
        symbol.to_le_bytes(&mut buf);
    }
    w.write_all(&buf)?;
    Ok(())
}

pub fn read_symbol<S: Symbol, R: Read>(r: &mut R, utf8: bool) -> Result<S> {
    if utf8 {
        let value = read_code_point(r)?;
        S::try_from_u32(value).ok_or(CodecError::InvalidCodePoint(value))
    } else {
        let mut buf = [0_u8; 4];
        r.read_exact(&mut buf[..S::WIDTH])?;
        Ok(S::from_le_slice(&buf))
    }
}

pub fn write_symbols<S: Symbol, W: Write>(w: &mut W, symbols: &[S], utf8: bool) -> Result<()> {
    let mut buf = Vec::with_capacity(symbols.len() * S::WIDTH);
    for &symbol in symbols {
        if utf8 {
            encode_code_point(symbol.to_u32(), &mut buf)?;
        } else {
            symbol.to_le_bytes(&mut buf);
        }
    }
    w.write_all(&buf)?;
    Ok(())
}

pub fn read_symbols<S: Symbol, R: Read>(r: &mut R, count: usize, utf8: bool) -> Result<Vec<S>> {
    let mut symbols = Vec::with_capacity(prealloc(count));
    for _ in 0..count {
        symbols.push(read_symbol(r, utf8)?);
    }
    Ok(symbols)
}
