use std::io::{Read, Write};

use log::{debug, trace};

use crate::error::{CodecError, Result};
use crate::tools::settings::{Settings, LZ77_LOOKAHEAD};
use crate::tools::symbol::Symbol;
use crate::tools::wire::{
    prealloc, read_symbol, read_u16, read_u32, read_u8, wire_len, write_symbol, write_u16,
    write_u32, write_u8,
};

/// A literal (length 0, carries the symbol) or a back-reference of `length` symbols starting
/// `offset` symbols before the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77Token<S> {
    pub offset: u16,
    pub length: u8,
    pub literal: Option<S>,
}

impl<S: Symbol> Lz77Token<S> {
    pub fn literal(symbol: S) -> Self {
        Self {
            offset: 0,
            length: 0,
            literal: Some(symbol),
        }
    }

    pub fn reference(offset: u16, length: u8) -> Self {
        Self {
            offset,
            length,
            literal: None,
        }
    }

    /// Symbols this token adds to the output.
    fn expanded_len(&self) -> usize {
        match self.length {
            0 => 1,
            n => n as usize,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lz77Record<S> {
    /// Number of symbols the tokens expand to.
    pub length: u32,
    pub tokens: Vec<Lz77Token<S>>,
}

/// Longest match for position `i` within the window. Scans from the nearest candidate back, so
/// among equally long matches the smallest offset wins. Returns (offset, length).
fn longest_match<S: Symbol>(data: &[S], i: usize, window: usize) -> (usize, usize) {
    let max_len = LZ77_LOOKAHEAD.min(data.len() - i);
    let start = i.saturating_sub(window);
    let (mut best_off, mut best_len) = (0, 0);
    for p in (start..i).rev() {
        // The match may run past i into the lookahead.
        let len = data[p..]
            .iter()
            .zip(&data[i..i + max_len])
            .take_while(|(a, b)| a == b)
            .count();
        if len > best_len {
            best_len = len;
            best_off = i - p;
            if best_len == max_len {
                break;
            }
        }
    }
    (best_off, best_len)
}

/// Greedy longest-match dictionary encode.
pub fn lz77_encode<S: Symbol>(data: &[S], settings: &Settings) -> Result<Lz77Record<S>> {
    settings.validate()?;
    let length = wire_len(data.len())?;
    let mut tokens = Vec::with_capacity(data.len() / 4 + 1);

    let mut i = 0;
    while i < data.len() {
        let (offset, len) = longest_match(data, i, settings.lz77_window);
        if len == 0 {
            tokens.push(Lz77Token::literal(data[i]));
            i += 1;
        } else {
            // window <= u16::MAX and len <= LZ77_LOOKAHEAD, both checked by Settings.
            tokens.push(Lz77Token::reference(offset as u16, len as u8));
            i += len;
        }
    }
    debug!(
        "LZ77 encoded {} symbols into {} tokens (window {})",
        data.len(),
        tokens.len(),
        settings.lz77_window
    );
    Ok(Lz77Record { length, tokens })
}

/// Replay one token onto the output.
fn apply<S: Symbol>(token: &Lz77Token<S>, out: &mut Vec<S>) -> Result<()> {
    if token.length == 0 {
        let symbol = token
            .literal
            .ok_or_else(|| CodecError::corrupted("LZ77 literal token without a symbol"))?;
        out.push(symbol);
        return Ok(());
    }
    let offset = token.offset as usize;
    if offset == 0 || offset > out.len() {
        return Err(CodecError::corrupted(format!(
            "LZ77 offset {} with only {} symbols decoded",
            offset,
            out.len()
        )));
    }
    // Copy one at a time so overlapping references repeat what they just wrote.
    let start = out.len() - offset;
    for k in 0..token.length as usize {
        let symbol = out[start + k];
        out.push(symbol);
    }
    Ok(())
}

pub fn lz77_decode<S: Symbol>(record: &Lz77Record<S>) -> Result<Vec<S>> {
    let mut out = Vec::with_capacity(prealloc(record.length as usize));
    for token in &record.tokens {
        apply(token, &mut out)?;
    }
    if out.len() != record.length as usize {
        return Err(CodecError::corrupted(format!(
            "LZ77 tokens expand to {} symbols, expected {}",
            out.len(),
            record.length
        )));
    }
    trace!("LZ77 decoded {} tokens", record.tokens.len());
    Ok(out)
}

impl<S: Symbol> Lz77Record<S> {
    /// length u32, then per token: offset u16, length u8, literal symbol when length is 0.
    pub fn write_to<W: Write>(&self, w: &mut W, utf8: bool) -> Result<()> {
        write_u32(w, self.length)?;
        let mut buf = Vec::with_capacity(self.tokens.len() * 4);
        for token in &self.tokens {
            write_u16(&mut buf, token.offset)?;
            write_u8(&mut buf, token.length)?;
            if token.length == 0 {
                let symbol = token
                    .literal
                    .ok_or_else(|| CodecError::corrupted("LZ77 literal token without a symbol"))?;
                write_symbol(&mut buf, symbol, utf8)?;
            }
        }
        w.write_all(&buf)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R, utf8: bool) -> Result<Self> {
        let length = read_u32(r)?;
        let mut tokens = Vec::new();
        let mut seen = 0_usize;
        while seen < length as usize {
            let offset = read_u16(r)?;
            let len = read_u8(r)?;
            let token = if len == 0 {
                Lz77Token::literal(read_symbol(r, utf8)?)
            } else {
                Lz77Token::reference(offset, len)
            };
            seen += token.expanded_len();
            tokens.push(token);
        }
        Ok(Self { length, tokens })
    }

    /// Flatten the tokens into symbols for the next pipeline stage. The packing depends on the
    /// symbol width: 8 bit splits the offset over two symbols, 16 bit gives offset and length a
    /// symbol each, 32 bit packs both into one.
    pub fn to_symbols(&self) -> Result<Vec<S>> {
        let mut out = Vec::with_capacity(self.tokens.len() * 3);
        for token in &self.tokens {
            let offset = token.offset as u32;
            let length = token.length as u32;
            match S::WIDTH {
                1 => {
                    out.push(S::from_u32(offset >> 8));
                    out.push(S::from_u32(offset & 0xff));
                    out.push(S::from_u32(length));
                }
                2 => {
                    out.push(S::from_u32(offset));
                    out.push(S::from_u32(length));
                }
                4 => out.push(S::from_u32((offset << 8) | length)),
                width => return Err(CodecError::UnsupportedSymbolWidth(width)),
            }
            if token.length == 0 {
                let symbol = token
                    .literal
                    .ok_or_else(|| CodecError::corrupted("LZ77 literal token without a symbol"))?;
                out.push(symbol);
            }
        }
        Ok(out)
    }

    /// Parse the flattened stream produced by `to_symbols`. `length` is the expanded symbol
    /// count, carried separately by the pipeline.
    pub fn from_symbols(symbols: &[S], length: u32) -> Result<Self> {
        let header = match S::WIDTH {
            1 => 3,
            2 => 2,
            4 => 1,
            width => return Err(CodecError::UnsupportedSymbolWidth(width)),
        };
        let truncated = || CodecError::corrupted("LZ77 token stream ends mid-token");

        let mut tokens = Vec::new();
        let mut i = 0;
        while i < symbols.len() {
            let head = symbols.get(i..i + header).ok_or_else(truncated)?;
            let (offset, len) = match S::WIDTH {
                1 => ((head[0].to_u32() << 8) | head[1].to_u32(), head[2].to_u32()),
                2 => (head[0].to_u32(), head[1].to_u32()),
                _ => (head[0].to_u32() >> 8, head[0].to_u32() & 0xff),
            };
            i += header;
            if offset > u16::MAX as u32 || len > u8::MAX as u32 {
                return Err(CodecError::corrupted(format!(
                    "LZ77 token ({}, {}) out of range",
                    offset, len
                )));
            }
            let token = if len == 0 {
                let symbol = *symbols.get(i).ok_or_else(truncated)?;
                i += 1;
                Lz77Token::literal(symbol)
            } else {
                Lz77Token::reference(offset as u16, len as u8)
            };
            tokens.push(token);
        }
        Ok(Self { length, tokens })
    }
}

/// Stand-alone LZ77 stream.
pub fn encode<S: Symbol, W: Write>(
    data: &[S],
    w: &mut W,
    utf8: bool,
    settings: &Settings,
) -> Result<()> {
    lz77_encode(data, settings)?.write_to(w, utf8)
}

pub fn decode<S: Symbol, R: Read>(r: &mut R, utf8: bool) -> Result<Vec<S>> {
    lz77_decode(&Lz77Record::<S>::read_from(r, utf8)?)
}
