use std::io::{Read, Write};

use log::trace;

use super::freq_count::alphabet;
use super::symbol::Symbol;
use super::wire::{
    prealloc, read_symbols, read_u16, read_u32, read_u8, wire_len, write_symbols, write_u16,
    write_u32, write_u8,
};
use crate::error::{CodecError, Result};

/// Move-to-front record: the sorted starting alphabet and one rank per input symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtfRecord<S> {
    pub alphabet: Vec<S>,
    pub codes: Vec<u32>,
}

/// Move the symbol at `idx` to the front, shifting everything before it one place right.
#[inline]
fn shift<S: Copy>(index: &mut [S], idx: usize) {
    index[..=idx].rotate_right(1);
}

/// Encode data using Move To Front transform against an explicit starting alphabet.
/// Every symbol of `data` must appear in `alphabet`.
pub fn mtf_encode_with<S: Symbol>(mut index: Vec<S>, data: &[S]) -> Result<Vec<u32>> {
    let mut codes = Vec::with_capacity(data.len());
    for &sym in data {
        let idx = index
            .iter()
            .position(|&c| c == sym)
            .ok_or_else(|| CodecError::UnknownSymbol(sym.to_u32()))?;
        codes.push(idx as u32);
        shift(&mut index, idx);
    }
    Ok(codes)
}

/// Encode data using Move To Front transform. The starting alphabet is the sorted set of
/// symbols in the data.
pub fn mtf_encode<S: Symbol>(data: &[S]) -> Result<MtfRecord<S>> {
    let alphabet = alphabet(data);
    let codes = mtf_encode_with(alphabet.clone(), data)?;
    trace!(
        "MTF encoded {} symbols over an alphabet of {}",
        codes.len(),
        alphabet.len()
    );
    Ok(MtfRecord { alphabet, codes })
}

/// Decode a Move To Front record. Replays the same shift as the encoder.
pub fn mtf_decode<S: Symbol>(record: &MtfRecord<S>) -> Result<Vec<S>> {
    let mut index = record.alphabet.clone();
    let mut out = Vec::with_capacity(record.codes.len());
    for &code in &record.codes {
        let idx = code as usize;
        if idx >= index.len() {
            return Err(CodecError::corrupted(format!(
                "MTF code {} outside alphabet of {}",
                code,
                index.len()
            )));
        }
        out.push(index[idx]);
        shift(&mut index, idx);
    }
    Ok(out)
}

/// Width in bytes of each code on the wire, chosen by alphabet size.
pub fn code_width(alphabet_len: usize) -> usize {
    if alphabet_len <= 256 {
        1
    } else if alphabet_len <= 65_536 {
        2
    } else {
        4
    }
}

impl<S: Symbol> MtfRecord<S> {
    /// Alphabet section: u32 length followed by the sorted symbols. Pipelines write this on
    /// its own after their entropy section.
    pub fn write_alphabet<W: Write>(&self, w: &mut W, utf8: bool) -> Result<()> {
        write_u32(w, wire_len(self.alphabet.len())?)?;
        write_symbols(w, &self.alphabet, utf8)
    }

    pub fn read_alphabet<R: Read>(r: &mut R, utf8: bool) -> Result<Vec<S>> {
        let len = read_u32(r)? as usize;
        let alphabet: Vec<S> = read_symbols(r, len, utf8)?;
        if alphabet.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CodecError::corrupted("MTF alphabet is not strictly ascending"));
        }
        Ok(alphabet)
    }

    /// Full MTF layout: alphabet section, u32 code count, codes at `code_width`.
    pub fn write_to<W: Write>(&self, w: &mut W, utf8: bool) -> Result<()> {
        self.write_alphabet(w, utf8)?;
        write_u32(w, wire_len(self.codes.len())?)?;
        let mut buf = Vec::with_capacity(self.codes.len() * code_width(self.alphabet.len()));
        match code_width(self.alphabet.len()) {
            1 => {
                for &code in &self.codes {
                    write_u8(&mut buf, code as u8)?;
                }
            }
            2 => {
                for &code in &self.codes {
                    write_u16(&mut buf, code as u16)?;
                }
            }
            _ => {
                for &code in &self.codes {
                    write_u32(&mut buf, code)?;
                }
            }
        }
        w.write_all(&buf)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R, utf8: bool) -> Result<Self> {
        let alphabet = Self::read_alphabet(r, utf8)?;
        let len = read_u32(r)? as usize;
        let mut codes = Vec::with_capacity(prealloc(len));
        let width = code_width(alphabet.len());
        for _ in 0..len {
            let code = match width {
                1 => read_u8(r)? as u32,
                2 => read_u16(r)? as u32,
                _ => read_u32(r)?,
            };
            codes.push(code);
        }
        Ok(Self { alphabet, codes })
    }

    /// Codes as symbols, for the next pipeline stage. A code is always below the alphabet
    /// size, so it fits the symbol width the alphabet was drawn from.
    pub fn to_symbols(&self) -> Vec<S> {
        self.codes.iter().map(|&code| S::from_u32(code)).collect()
    }

    pub fn from_symbols(alphabet: Vec<S>, symbols: &[S]) -> Self {
        Self {
            alphabet,
            codes: symbols.iter().map(|&sym| sym.to_u32()).collect(),
        }
    }
}

/// Stand-alone MTF stream.
pub fn encode<S: Symbol, W: Write>(data: &[S], w: &mut W, utf8: bool) -> Result<()> {
    mtf_encode(data)?.write_to(w, utf8)
}

pub fn decode<S: Symbol, R: Read>(r: &mut R, utf8: bool) -> Result<Vec<S>> {
    mtf_decode(&MtfRecord::<S>::read_from(r, utf8)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn known_ranks() {
        let record = mtf_encode("banana".as_bytes()).unwrap();
        assert_eq!(record.alphabet, b"abn".to_vec());
        // b:1 [b a n], a:1 [a b n], n:2 [n a b], a:1 [a n b], n:1 [n a b], a:1
        assert_eq!(record.codes, vec![1, 1, 2, 1, 1, 1]);
        assert_eq!(mtf_decode(&record).unwrap(), "banana".as_bytes());
    }

    #[test]
    fn unknown_symbol() {
        let result = mtf_encode_with(vec![b'a', b'b'], b"abc");
        assert!(matches!(result, Err(CodecError::UnknownSymbol(0x63))));
    }

    #[test]
    fn bad_code_is_corrupted() {
        let record = MtfRecord {
            alphabet: vec![1_u16, 2],
            codes: vec![0, 2],
        };
        assert!(matches!(
            mtf_decode(&record),
            Err(CodecError::CorruptedData(_))
        ));
    }

    #[test]
    fn code_width_by_alphabet() {
        assert_eq!(code_width(256), 1);
        assert_eq!(code_width(257), 2);
        assert_eq!(code_width(65_536), 2);
        assert_eq!(code_width(65_537), 4);
    }

    #[test]
    fn wide_alphabet_uses_two_byte_codes() {
        let data: Vec<u16> = (0..300_u16).rev().collect();
        let mut out = vec![];
        encode(&data, &mut out, false).unwrap();
        // u32 + 300 * 2 alphabet, u32 count, 300 * 2 codes
        assert_eq!(out.len(), 4 + 600 + 4 + 600);
        assert_eq!(decode::<u16, _>(&mut out.as_slice(), false).unwrap(), data);
    }

    #[test]
    fn round_trip_streams() {
        let mut rng = StdRng::seed_from_u64(0x4d54_46);
        for utf8 in [false, true] {
            for len in [0_usize, 1, 2, 17, 1000] {
                let data: Vec<u32> = (0..len).map(|_| rng.gen_range(0..40)).collect();
                let mut out = vec![];
                encode(&data, &mut out, utf8).unwrap();
                assert_eq!(decode::<u32, _>(&mut out.as_slice(), utf8).unwrap(), data);
            }
        }
    }

    #[test]
    fn symbols_round_trip_through_pipeline_form() {
        let record = mtf_encode(&[5_u8, 5, 9, 1, 9]).unwrap();
        let symbols = record.to_symbols();
        let back = MtfRecord::from_symbols(record.alphabet.clone(), &symbols);
        assert_eq!(back, record);
    }
}
