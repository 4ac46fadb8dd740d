use std::io::{Read, Write};

use log::{debug, trace};

use super::suffix_array::suffix_array;
use crate::error::{CodecError, Result};
use crate::tools::symbol::Symbol;
use crate::tools::wire::{read_symbols, read_u32, wire_len, write_symbols, write_u32};

/// Block-sort record: the rotation index (key) and the transformed data, which is one symbol
/// longer than the input. The slot at `key` holds the sentinel, written as the zero symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BwtRecord<S> {
    pub key: u32,
    pub data: Vec<S>,
}

/// Burrows-Wheeler-Transform of the data with an implicit end-of-block sentinel.
pub fn bwt_encode<S: Symbol>(data: &[S]) -> Result<BwtRecord<S>> {
    wire_len(data.len() + 1)?;
    let index = suffix_array(data);

    // Get key and BWT output
    let mut key = 0_u32;
    let mut bwt = Vec::with_capacity(index.len());
    for (i, &start) in index.iter().enumerate() {
        if start == 0 {
            // The rotation preceding the original starts with the sentinel.
            key = i as u32;
            bwt.push(S::default());
        } else {
            bwt.push(data[start as usize - 1]);
        }
    }
    debug!("BWT key is {} for {} symbols", key, data.len());
    Ok(BwtRecord { key, data: bwt })
}

/// Decode a Burrows-Wheeler-Transform.
pub fn bwt_decode<S: Symbol>(record: &BwtRecord<S>) -> Result<Vec<S>> {
    let end = record.data.len();
    let key = record.key as usize;
    if key >= end {
        return Err(CodecError::corrupted(format!(
            "BWT key {} outside transformed length {}",
            key, end
        )));
    }

    // Stable sort of positions by symbol, with the sentinel slot ahead of every real symbol.
    // This is the first column of the sorted rotations, and each entry points at the row that
    // follows it in the original text.
    let mut next: Vec<u32> = (0..end as u32).collect();
    next.sort_by_key(|&i| (i as usize != key, record.data[i as usize]));

    // Follow the chain from the key, emitting one symbol per step.
    let mut out = Vec::with_capacity(end - 1);
    let mut j = key;
    for _ in 1..end {
        j = next[j] as usize;
        out.push(record.data[j]);
    }
    trace!("BWT decoded {} symbols", out.len());
    Ok(out)
}

impl<S: Symbol> BwtRecord<S> {
    /// rotationIndex u32, transformedLength u32, transformed symbols.
    pub fn write_to<W: Write>(&self, w: &mut W, utf8: bool) -> Result<()> {
        write_u32(w, self.key)?;
        write_u32(w, wire_len(self.data.len())?)?;
        write_symbols(w, &self.data, utf8)
    }

    pub fn read_from<R: Read>(r: &mut R, utf8: bool) -> Result<Self> {
        let key = read_u32(r)?;
        let len = read_u32(r)? as usize;
        if len == 0 {
            return Err(CodecError::corrupted("BWT block without sentinel"));
        }
        let data = read_symbols(r, len, utf8)?;
        Ok(Self { key, data })
    }
}

/// Stand-alone BWT stream.
pub fn encode<S: Symbol, W: Write>(data: &[S], w: &mut W, utf8: bool) -> Result<()> {
    bwt_encode(data)?.write_to(w, utf8)
}

pub fn decode<S: Symbol, R: Read>(r: &mut R, utf8: bool) -> Result<Vec<S>> {
    bwt_decode(&BwtRecord::<S>::read_from(r, utf8)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn banana() {
        let record = bwt_encode("banana".as_bytes()).unwrap();
        assert_eq!(record.key, 4);
        assert_eq!(record.data, b"annb\0aa".to_vec());
        assert_eq!(bwt_decode(&record).unwrap(), "banana".as_bytes());
    }

    #[test]
    fn empty_input_is_sentinel_only() {
        let record = bwt_encode::<u32>(&[]).unwrap();
        assert_eq!(record, BwtRecord { key: 0, data: vec![0] });
        assert!(bwt_decode(&record).unwrap().is_empty());
    }

    #[test]
    fn zero_symbols_round_trip() {
        let data = [0_u8, 3, 0, 0, 3, 0];
        let record = bwt_encode(&data).unwrap();
        assert_eq!(bwt_decode(&record).unwrap(), data);
    }

    #[test]
    fn key_is_in_range_and_random_round_trips() {
        let mut rng = StdRng::seed_from_u64(0x425754);
        for _ in 0..100 {
            let len = rng.gen_range(0..500);
            let data: Vec<u32> = (0..len).map(|_| rng.gen_range(0..8)).collect();
            let record = bwt_encode(&data).unwrap();
            assert!((record.key as usize) <= data.len());
            assert_eq!(record.data.len(), data.len() + 1);
            assert_eq!(bwt_decode(&record).unwrap(), data);
        }
    }

    #[test]
    fn stream_round_trip() {
        let data: Vec<u16> = "abracadabra ünïcödé".encode_utf16().collect();
        for utf8 in [false, true] {
            let mut out = vec![];
            encode(&data, &mut out, utf8).unwrap();
            assert_eq!(decode::<u16, _>(&mut out.as_slice(), utf8).unwrap(), data);
        }
    }

    #[test]
    fn bad_key_is_corrupted() {
        let record = BwtRecord {
            key: 3,
            data: vec![1_u8, 2, 0],
        };
        assert!(matches!(
            bwt_decode(&record),
            Err(CodecError::CorruptedData(_))
        ));
    }
}
