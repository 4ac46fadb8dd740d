//! Run-length transform with signed counts.
//!
//! A positive count is a repeat token: one symbol repeated `count` times. A negative count is a
//! literal token: the next `|count|` symbols copied verbatim. Both are capped at 127.
use std::io::{Read, Write};

use log::trace;

use super::symbol::Symbol;
use super::wire::{
    prealloc, read_symbol, read_symbols, read_u32, read_u8, wire_len, write_symbol,
    write_symbols, write_u32, write_u8,
};
use crate::error::{CodecError, Result};

/// Largest count a single token carries.
pub const MAX_RUN: usize = 127;
/// Offset added to a count when it is flattened into a symbol.
const COUNT_BIAS: i32 = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunToken<S> {
    /// One symbol repeated `count` times (1..=127).
    Repeat { count: u8, symbol: S },
    /// 1..=127 symbols copied as-is.
    Literal(Vec<S>),
}

impl<S: Symbol> RunToken<S> {
    /// The signed count as it appears on the wire.
    pub fn count(&self) -> i8 {
        match self {
            RunToken::Repeat { count, .. } => *count as i8,
            RunToken::Literal(run) => -(run.len() as i8),
        }
    }

    /// Number of symbols this token expands to.
    pub fn expanded_len(&self) -> usize {
        match self {
            RunToken::Repeat { count, .. } => *count as usize,
            RunToken::Literal(run) => run.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RleRecord<S> {
    /// Number of symbols the tokens expand to.
    pub length: u32,
    pub tokens: Vec<RunToken<S>>,
}

/// Push the pending literal symbols out in tokens of at most MAX_RUN.
fn flush_literals<S: Symbol>(literals: &mut Vec<S>, tokens: &mut Vec<RunToken<S>>) {
    for chunk in literals.chunks(MAX_RUN) {
        tokens.push(RunToken::Literal(chunk.to_vec()));
    }
    literals.clear();
}

/// Run-length encode the data.
pub fn rle_encode<S: Symbol>(data: &[S]) -> Result<RleRecord<S>> {
    let length = wire_len(data.len())?;
    let mut tokens = Vec::new();
    let mut literals: Vec<S> = Vec::with_capacity(MAX_RUN);

    let mut i = 0;
    while i < data.len() {
        let symbol = data[i];
        // Measure the run starting here.
        let run = data[i..].iter().take_while(|&&s| s == symbol).count();

        if run >= 2 {
            // A repeat closes any literal stretch in progress.
            flush_literals(&mut literals, &mut tokens);
            let mut remaining = run;
            while remaining > 0 {
                let count = remaining.min(MAX_RUN);
                tokens.push(RunToken::Repeat {
                    count: count as u8,
                    symbol,
                });
                remaining -= count;
            }
        } else {
            literals.push(symbol);
            if literals.len() == MAX_RUN {
                flush_literals(&mut literals, &mut tokens);
            }
        }
        i += run;
    }
    flush_literals(&mut literals, &mut tokens);

    trace!("RLE: {} symbols into {} tokens", data.len(), tokens.len());
    Ok(RleRecord { length, tokens })
}

/// Expand the tokens back into symbols.
pub fn rle_decode<S: Symbol>(record: &RleRecord<S>) -> Result<Vec<S>> {
    let mut out = Vec::with_capacity(prealloc(record.length as usize));
    for token in &record.tokens {
        match token {
            RunToken::Repeat { count, symbol } => {
                out.extend(std::iter::repeat(*symbol).take(*count as usize))
            }
            RunToken::Literal(run) => out.extend_from_slice(run),
        }
    }
    if out.len() != record.length as usize {
        return Err(CodecError::corrupted(format!(
            "RLE tokens expand to {} symbols, expected {}",
            out.len(),
            record.length
        )));
    }
    Ok(out)
}

/// Build a token from a signed count, rejecting zero.
fn check_count(count: i8) -> Result<i8> {
    if count == 0 || count == i8::MIN {
        return Err(CodecError::corrupted(format!("invalid RLE count {}", count)));
    }
    Ok(count)
}

impl<S: Symbol> RleRecord<S> {
    /// u32 length, then per token: i8 count and its payload.
    pub fn write_to<W: Write>(&self, w: &mut W, utf8: bool) -> Result<()> {
        write_u32(w, self.length)?;
        let mut buf = Vec::with_capacity(self.length as usize);
        for token in &self.tokens {
            write_u8(&mut buf, token.count() as u8)?;
            match token {
                RunToken::Repeat { symbol, .. } => write_symbol(&mut buf, *symbol, utf8)?,
                RunToken::Literal(run) => write_symbols(&mut buf, run, utf8)?,
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
            let count = check_count(read_u8(r)? as i8)?;
            let token = if count > 0 {
                RunToken::Repeat {
                    count: count as u8,
                    symbol: read_symbol(r, utf8)?,
                }
            } else {
                RunToken::Literal(read_symbols(r, count.unsigned_abs() as usize, utf8)?)
            };
            seen += token.expanded_len();
            tokens.push(token);
        }
        Ok(Self { length, tokens })
    }

    /// Flatten into one symbol stream for the next pipeline stage: each count becomes the
    /// symbol `count + 128`, followed by its payload.
    pub fn to_symbols(&self) -> Vec<S> {
        let mut out = Vec::with_capacity(self.tokens.len() * 2);
        for token in &self.tokens {
            out.push(S::from_u32((token.count() as i32 + COUNT_BIAS) as u32));
            match token {
                RunToken::Repeat { symbol, .. } => out.push(*symbol),
                RunToken::Literal(run) => out.extend_from_slice(run),
            }
        }
        out
    }

    /// Parse the flattened stream produced by `to_symbols`.
    pub fn from_symbols(symbols: &[S]) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut length = 0_usize;
        let mut i = 0;
        while i < symbols.len() {
            let raw = symbols[i].to_u32() as i32 - COUNT_BIAS;
            if !(-(MAX_RUN as i32)..=MAX_RUN as i32).contains(&raw) {
                return Err(CodecError::corrupted(format!("invalid RLE count symbol {}", raw)));
            }
            let count = check_count(raw as i8)?;
            i += 1;
            let payload = count.unsigned_abs() as usize;
            let token = if count > 0 {
                let symbol = *symbols
                    .get(i)
                    .ok_or_else(|| CodecError::corrupted("RLE repeat token without payload"))?;
                i += 1;
                RunToken::Repeat {
                    count: count as u8,
                    symbol,
                }
            } else {
                let run = symbols
                    .get(i..i + payload)
                    .ok_or_else(|| CodecError::corrupted("RLE literal token runs past the end"))?;
                i += payload;
                RunToken::Literal(run.to_vec())
            };
            length += token.expanded_len();
            tokens.push(token);
        }
        Ok(Self {
            length: wire_len(length)?,
            tokens,
        })
    }
}

/// Stand-alone RLE stream.
pub fn encode<S: Symbol, W: Write>(data: &[S], w: &mut W, utf8: bool) -> Result<()> {
    rle_encode(data)?.write_to(w, utf8)
}

pub fn decode<S: Symbol, R: Read>(r: &mut R, utf8: bool) -> Result<Vec<S>> {
    rle_decode(&RleRecord::<S>::read_from(r, utf8)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn counts<S: Symbol>(record: &RleRecord<S>) -> Vec<i8> {
        record.tokens.iter().map(|t| t.count()).collect()
    }

    #[test]
    fn long_run_splits_at_cap() {
        let data = vec![b'x'; 300];
        let record = rle_encode(&data).unwrap();
        assert_eq!(counts(&record), vec![127, 127, 46]);
        assert!(record
            .tokens
            .iter()
            .all(|t| matches!(t, RunToken::Repeat { symbol: b'x', .. })));
        assert_eq!(rle_decode(&record).unwrap(), data);
    }

    #[test]
    fn split_can_leave_a_single_repeat() {
        let record = rle_encode(&vec![7_u16; 128]).unwrap();
        assert_eq!(counts(&record), vec![127, 1]);
    }

    #[test]
    fn literals_and_repeats() {
        let record = rle_encode("aabcdd".as_bytes()).unwrap();
        assert_eq!(
            record.tokens,
            vec![
                RunToken::Repeat {
                    count: 2,
                    symbol: b'a'
                },
                RunToken::Literal(b"bc".to_vec()),
                RunToken::Repeat {
                    count: 2,
                    symbol: b'd'
                },
            ]
        );
    }

    #[test]
    fn long_literal_splits_at_cap() {
        let data: Vec<u32> = (0..300).collect();
        let record = rle_encode(&data).unwrap();
        assert_eq!(counts(&record), vec![-127, -127, -46]);
    }

    #[test]
    fn token_bounds_and_lengths() {
        let mut rng = StdRng::seed_from_u64(0x524c45);
        for _ in 0..50 {
            let len = rng.gen_range(0..2000);
            let data: Vec<u8> = (0..len)
                .map(|_| if rng.gen_bool(0.7) { b'z' } else { rng.gen() })
                .collect();
            let record = rle_encode(&data).unwrap();
            let mut total = 0;
            for token in &record.tokens {
                let magnitude = token.count().unsigned_abs() as usize;
                assert!((1..=MAX_RUN).contains(&magnitude));
                total += magnitude;
            }
            assert_eq!(total, data.len());
            assert_eq!(rle_decode(&record).unwrap(), data);
        }
    }

    #[test]
    fn stream_round_trip() {
        let data: Vec<u16> = "hello   world!!!!!".encode_utf16().collect();
        for utf8 in [false, true] {
            let mut out = vec![];
            encode(&data, &mut out, utf8).unwrap();
            assert_eq!(decode::<u16, _>(&mut out.as_slice(), utf8).unwrap(), data);
        }
        let mut out = vec![];
        encode::<u8, _>(&[], &mut out, false).unwrap();
        assert_eq!(out, [0, 0, 0, 0]);
        assert!(decode::<u8, _>(&mut out.as_slice(), false).unwrap().is_empty());
    }

    #[test]
    fn zero_count_is_corrupted() {
        let bytes = [3_u8, 0, 0, 0, 0, b'a'];
        assert!(matches!(
            decode::<u8, _>(&mut bytes.as_slice(), false),
            Err(CodecError::CorruptedData(_))
        ));
    }

    #[test]
    fn pipeline_symbols() {
        let record = rle_encode("aabcdd".as_bytes()).unwrap();
        let symbols = record.to_symbols();
        assert_eq!(symbols, vec![130, b'a', 126, b'b', b'c', 130, b'd']);
        assert_eq!(RleRecord::from_symbols(&symbols).unwrap(), record);
        assert!(matches!(
            RleRecord::from_symbols(&[126_u8, b'b']),
            Err(CodecError::CorruptedData(_))
        ));
    }
}
