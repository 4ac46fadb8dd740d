//! Canonical code assignment.
//!
//! Only the symbol order and the code lengths travel on the wire. Given a table sorted by code
//! length, both sides assign values sequentially: the first code is all zeros, each following
//! code is the previous plus one, shifted left whenever the length grows. For a length-sorted
//! table this is the same assignment as taking, symbol by symbol, the smallest value of the
//! right length that no shorter code is a prefix of.

use rustc_hash::FxHashMap;

use super::huffman_code_from_weights::MAX_CODE_LEN;
use crate::error::{CodecError, Result};
use crate::tools::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry<S> {
    pub symbol: S,
    pub code: u32,
    pub length: u8,
}

/// Assign codes to (symbol, length) pairs sorted by non-decreasing length.
/// Fails if the lengths are out of order, out of range, or oversubscribe the code space.
pub fn assign_codes<S: Symbol>(table: &[(S, u8)]) -> Result<Vec<CodeEntry<S>>> {
    let mut entries = Vec::with_capacity(table.len());
    let mut code = 0_u64;
    let mut prev_len = 0_u8;

    for (i, &(symbol, length)) in table.iter().enumerate() {
        if length == 0 || length > MAX_CODE_LEN {
            return Err(CodecError::corrupted(format!(
                "code length {} outside 1..={}",
                length, MAX_CODE_LEN
            )));
        }
        if length < prev_len {
            return Err(CodecError::corrupted("code lengths are not sorted"));
        }
        if i > 0 {
            code = (code + 1) << (length - prev_len);
        }
        // Out of codes of this length: the table is not a prefix code.
        if code >> length != 0 {
            return Err(CodecError::corrupted("code lengths oversubscribe the code space"));
        }
        entries.push(CodeEntry {
            symbol,
            code: code as u32,
            length,
        });
        prev_len = length;
    }
    Ok(entries)
}

/// Encoder lookup: symbol to (code, length).
pub fn encode_map<S: Symbol>(entries: &[CodeEntry<S>]) -> FxHashMap<S, (u32, u8)> {
    entries
        .iter()
        .map(|e| (e.symbol, (e.code, e.length)))
        .collect()
}

/// Decoder lookup: (code, length) to symbol.
pub fn decode_map<S: Symbol>(entries: &[CodeEntry<S>]) -> FxHashMap<(u32, u8), S> {
    entries
        .iter()
        .map(|e| ((e.code, e.length), e.symbol))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use crate::huffman_coding::huffman_code_from_weights::code_lengths;

    /// The slow rule: for each symbol take the smallest value of its length such that no
    /// already assigned code equals it or any of its shorter prefixes.
    fn greedy(lengths: &[u8]) -> Vec<u32> {
        let mut assigned: Vec<(u32, u8)> = vec![];
        for &len in lengths {
            let mut value = 0_u64;
            loop {
                let clash = assigned
                    .iter()
                    .any(|&(code, l)| (value >> (len - l)) as u32 == code);
                if !clash {
                    break;
                }
                value += 1;
            }
            assigned.push((value as u32, len));
        }
        assigned.into_iter().map(|(code, _)| code).collect()
    }

    fn is_prefix_free(entries: &[CodeEntry<u16>]) -> bool {
        for (i, a) in entries.iter().enumerate() {
            for (j, b) in entries.iter().enumerate() {
                if i != j && a.length <= b.length && b.code >> (b.length - a.length) == a.code {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn small_table() {
        let entries = assign_codes(&[(b'a', 1), (b'b', 2), (b'c', 3), (b'd', 3)]).unwrap();
        let codes: Vec<(u32, u8)> = entries.iter().map(|e| (e.code, e.length)).collect();
        assert_eq!(codes, vec![(0b0, 1), (0b10, 2), (0b110, 3), (0b111, 3)]);
    }

    #[test]
    fn matches_greedy_rule_and_is_prefix_free() {
        let mut rng = StdRng::seed_from_u64(0x4341_4e4f);
        for _ in 0..200 {
            let symbols = rng.gen_range(2..40);
            let weights: Vec<u32> = (0..symbols).map(|_| rng.gen_range(1..500)).collect();
            let mut lengths = code_lengths(&weights);
            lengths.sort_unstable();
            let table: Vec<(u16, u8)> = lengths
                .iter()
                .enumerate()
                .map(|(i, &l)| (i as u16, l))
                .collect();
            let entries = assign_codes(&table).unwrap();
            let codes: Vec<u32> = entries.iter().map(|e| e.code).collect();
            assert_eq!(codes, greedy(&lengths));
            assert!(is_prefix_free(&entries));
            assert_eq!(decode_map(&entries).len(), entries.len());
        }
    }

    #[test]
    fn rejects_bad_tables() {
        assert!(matches!(
            assign_codes(&[(1_u8, 2), (2, 1)]),
            Err(CodecError::CorruptedData(_))
        ));
        assert!(matches!(
            assign_codes(&[(1_u8, 1), (2, 1), (3, 1)]),
            Err(CodecError::CorruptedData(_))
        ));
        assert!(matches!(
            assign_codes(&[(1_u8, 0)]),
            Err(CodecError::CorruptedData(_))
        ));
    }
}
