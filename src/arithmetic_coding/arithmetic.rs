use std::io::{Read, Write};

use log::{debug, trace};

use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;
use crate::error::{CodecError, Result};
use crate::tools::freq_count::counted_alphabet;
use crate::tools::symbol::Symbol;
use crate::tools::wire::{
    prealloc, read_symbols, read_u32, read_u8, wire_len, write_symbols, write_u32, write_u8,
};

/// Bisection steps allowed for one symbol before the interval is declared unusable. An f64
/// midpoint stops moving after roughly this many halvings.
const MAX_STEPS_PER_SYMBOL: usize = 1100;

/// Arithmetic coding record: the model (alphabet by descending count) and the packed bits.
#[derive(Debug, Clone, PartialEq)]
pub struct AcRecord<S> {
    pub length: u32,
    pub alphabet: Vec<S>,
    pub counts: Vec<u32>,
    pub payload: Vec<u8>,
}

/// Cumulative segment boundaries for the model. One more entry than the alphabet, first 0.0,
/// last exactly 1.0. Fewer than two symbols falls back to {0, 0.5, 1}.
pub fn segments(counts: &[u32], length: u32) -> Vec<f64> {
    if counts.len() < 2 {
        return vec![0.0, 0.5, 1.0];
    }
    let mut seg = Vec::with_capacity(counts.len() + 1);
    let mut acc = 0.0_f64;
    seg.push(acc);
    for &count in &counts[..counts.len() - 1] {
        acc += count as f64 / length as f64;
        seg.push(acc);
    }
    seg.push(1.0);
    seg
}

/// Narrow [0, 1) toward [lo, hi) by bisection, writing one bit per step.
fn encode_symbol(bw: &mut BitWriter, lo: f64, hi: f64) -> Result<()> {
    let target = (lo + hi) / 2.0;
    let (mut low, mut high, mut mid) = (0.0_f64, 1.0_f64, 0.5_f64);
    let mut steps = 0;
    while !(high <= hi && low >= lo) {
        if mid > target {
            bw.out_bit(false);
            high = mid;
        } else {
            bw.out_bit(true);
            low = mid;
        }
        mid = (high + low) / 2.0;
        steps += 1;
        if steps > MAX_STEPS_PER_SYMBOL {
            return Err(CodecError::corrupted(format!(
                "interval precision exhausted on segment [{}, {})",
                lo, hi
            )));
        }
    }
    Ok(())
}

/// Arithmetic encode the data against its static frequency model.
pub fn ac_encode<S: Symbol>(data: &[S]) -> Result<AcRecord<S>> {
    let length = wire_len(data.len())?;
    let mut counted = counted_alphabet(data);
    counted.sort_by(|a, b| b.1.cmp(&a.1));
    let (alphabet, counts): (Vec<S>, Vec<u32>) = counted.into_iter().unzip();

    let mut bw = BitWriter::new(data.len() / 4 + 1);
    // A lone symbol is implied by the model: nothing to code.
    if alphabet.len() > 1 {
        let seg = segments(&counts, length);
        let position: rustc_hash::FxHashMap<S, usize> =
            alphabet.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        for sym in data {
            let &i = position
                .get(sym)
                .ok_or_else(|| CodecError::UnknownSymbol(sym.to_u32()))?;
            encode_symbol(&mut bw, seg[i], seg[i + 1])?;
        }
    }
    debug!(
        "AC encoded {} symbols over {} in {} bits",
        data.len(),
        alphabet.len(),
        bw.bit_len()
    );
    Ok(AcRecord {
        length,
        alphabet,
        counts,
        payload: bw.into_bytes(),
    })
}

/// One step of the decoder's binary search. `value` is the bisection point just consumed and
/// `bit` the side of it the coded value lies on. Narrows the candidate range [s, e].
pub fn bin_search_step(seg: &[f64], value: f64, bit: bool, s: usize, e: usize) -> Result<(usize, usize)> {
    if !(seg[s] <= value && value <= seg[e]) {
        return Err(CodecError::MalformedInterval {
            value,
            low: seg[s],
            high: seg[e],
        });
    }
    let (mut l, mut r) = (s, e);
    let mut c = (l + r) / 2;
    loop {
        if value >= seg[c] {
            l = c;
        } else {
            r = c;
        }
        c = (l + r) / 2;
        if l + 1 >= r {
            break;
        }
    }
    if bit {
        Ok((l, e))
    } else if seg[l] == value && l > s {
        // The lower half ends exactly on a boundary: the segment starting there is out.
        Ok((s, l))
    } else {
        Ok((s, r))
    }
}

/// Decode one symbol index, pulling bits until its segment holds the working interval.
fn decode_symbol<R: Read>(seg: &[f64], br: &mut BitReader<R>) -> Result<usize> {
    let (mut low, mut high, mut mid) = (0.0_f64, 1.0_f64, 0.5_f64);
    let (mut s, mut e) = (0, seg.len() - 1);
    for _ in 0..MAX_STEPS_PER_SYMBOL {
        let bit = br.bit()?;
        if bit {
            low = mid;
        } else {
            high = mid;
        }
        (s, e) = bin_search_step(seg, mid, bit, s, e)?;
        mid = (high + low) / 2.0;
        if s + 1 >= e && low >= seg[s] && high <= seg[s + 1] {
            return Ok(s);
        }
    }
    Err(CodecError::corrupted(format!(
        "arithmetic decoder did not settle at {}",
        br.loc()
    )))
}

fn decode_with<S: Symbol, R: Read>(
    alphabet: &[S],
    counts: &[u32],
    length: u32,
    br: &mut BitReader<R>,
) -> Result<Vec<S>> {
    if alphabet.len() == 1 {
        return Ok(vec![alphabet[0]; length as usize]);
    }
    let seg = segments(counts, length);
    let mut out = Vec::with_capacity(prealloc(length as usize));
    for _ in 0..length {
        out.push(alphabet[decode_symbol(&seg, br)?]);
    }
    trace!("AC decoded {} symbols, read {}", out.len(), br.loc());
    Ok(out)
}

/// Check a model read off the wire before it drives the decoder.
fn check_model(alphabet_len: usize, counts: &[u32], length: u32) -> Result<()> {
    if counts.iter().any(|&c| c == 0) {
        return Err(CodecError::corrupted("AC model has a zero count"));
    }
    if counts.windows(2).any(|w| w[0] < w[1]) {
        return Err(CodecError::corrupted("AC counts are not in descending order"));
    }
    let total: u64 = counts.iter().map(|&c| c as u64).sum();
    if total != length as u64 || counts.len() != alphabet_len {
        return Err(CodecError::corrupted(format!(
            "AC counts sum to {}, expected {}",
            total, length
        )));
    }
    Ok(())
}

/// Decode an in-memory record.
pub fn ac_decode<S: Symbol>(record: &AcRecord<S>) -> Result<Vec<S>> {
    if record.length == 0 {
        return Ok(vec![]);
    }
    check_model(record.alphabet.len(), &record.counts, record.length)?;
    let mut br = BitReader::new(record.payload.as_slice());
    decode_with(&record.alphabet, &record.counts, record.length, &mut br)
}

/// Bits needed to store the largest count, floor(log2(max)) + 1.
fn count_bit_width(counts: &[u32]) -> u8 {
    let max = counts.first().copied().unwrap_or(1).max(1);
    (32 - max.leading_zeros()) as u8
}

impl<S: Symbol> AcRecord<S> {
    /// length u32, alphabetLength u32, alphabet, count bit width u8, packed counts, packed
    /// coded bits. An empty record is the two zero lengths alone.
    pub fn write_to<W: Write>(&self, w: &mut W, utf8: bool) -> Result<()> {
        write_u32(w, self.length)?;
        write_u32(w, wire_len(self.alphabet.len())?)?;
        if self.length == 0 {
            return Ok(());
        }
        write_symbols(w, &self.alphabet, utf8)?;

        let width = count_bit_width(&self.counts);
        write_u8(w, width)?;
        let mut bw = BitWriter::new(self.counts.len() * width as usize / 8 + 1);
        for &count in &self.counts {
            bw.out_bits(count, width);
        }
        w.write_all(&bw.into_bytes())?;
        w.write_all(&self.payload)?;
        Ok(())
    }
}

/// Stand-alone AC stream.
pub fn encode<S: Symbol, W: Write>(data: &[S], w: &mut W, utf8: bool) -> Result<()> {
    ac_encode(data)?.write_to(w, utf8)
}

/// Decode an AC stream, reading no further than the last byte of its coded bits.
pub fn decode<S: Symbol, R: Read>(r: &mut R, utf8: bool) -> Result<Vec<S>> {
    let length = read_u32(r)?;
    let alphabet_len = read_u32(r)? as usize;
    if length == 0 {
        if alphabet_len != 0 {
            return Err(CodecError::corrupted("empty AC stream with an alphabet"));
        }
        return Ok(vec![]);
    }
    if alphabet_len == 0 || alphabet_len > length as usize {
        return Err(CodecError::corrupted(format!(
            "AC alphabet of {} for {} symbols",
            alphabet_len, length
        )));
    }
    let alphabet: Vec<S> = read_symbols(r, alphabet_len, utf8)?;

    let width = read_u8(r)?;
    if !(1..=32).contains(&width) {
        return Err(CodecError::corrupted(format!(
            "AC count bit width {} is invalid",
            width
        )));
    }
    let mut counts = Vec::with_capacity(alphabet_len);
    {
        let mut br = BitReader::new(&mut *r);
        for _ in 0..alphabet_len {
            counts.push(br.bint(width)?);
        }
        trace!("AC counts took {} bytes", br.bytes_read());
    }
    check_model(alphabet_len, &counts, length)?;

    let mut br = BitReader::new(&mut *r);
    decode_with(&alphabet, &counts, length, &mut br)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn single_symbol_emits_no_bits() {
        let data = vec![b'q'; 5];
        let record = ac_encode(&data).unwrap();
        assert_eq!(record.alphabet, vec![b'q']);
        assert_eq!(record.counts, vec![5]);
        assert!(record.payload.is_empty());
        assert_eq!(segments(&record.counts, 5), vec![0.0, 0.5, 1.0]);
        assert_eq!(ac_decode(&record).unwrap(), data);

        let mut out = vec![];
        record.write_to(&mut out, false).unwrap();
        // length, alphabet length, 'q', width 3, count 101 padded
        assert_eq!(out, vec![5, 0, 0, 0, 1, 0, 0, 0, b'q', 3, 0b1010_0000]);
        assert_eq!(decode::<u8, _>(&mut out.as_slice(), false).unwrap(), data);
    }

    #[test]
    fn segment_tables_are_monotonic() {
        let mut rng = StdRng::seed_from_u64(0x5345_47);
        for _ in 0..100 {
            let symbols = rng.gen_range(2..50);
            let counts: Vec<u32> = (0..symbols).map(|_| rng.gen_range(1..1000)).collect();
            let length: u32 = counts.iter().sum();
            let seg = segments(&counts, length);
            assert_eq!(seg.len(), counts.len() + 1);
            assert_eq!(seg[0], 0.0);
            assert_eq!(*seg.last().unwrap(), 1.0);
            assert!(seg.windows(2).all(|w| w[1] >= w[0] - 1e-12));
        }
    }

    #[test]
    fn model_is_sorted_by_descending_count() {
        let record = ac_encode("abracadabra".as_bytes()).unwrap();
        assert_eq!(record.alphabet, b"abrcd".to_vec());
        assert_eq!(record.counts, vec![5, 2, 2, 1, 1]);
    }

    #[test]
    fn banana() {
        let record = ac_encode("banana".as_bytes()).unwrap();
        assert_eq!(ac_decode(&record).unwrap(), "banana".as_bytes());
    }

    #[test]
    fn empty_stream_is_two_zero_lengths() {
        let mut out = vec![];
        encode::<u32, _>(&[], &mut out, true).unwrap();
        assert_eq!(out, vec![0; 8]);
        assert!(decode::<u32, _>(&mut out.as_slice(), true).unwrap().is_empty());
    }

    #[test]
    fn random_round_trips() {
        let mut rng = StdRng::seed_from_u64(0x4143);
        for _ in 0..300 {
            let len = rng.gen_range(1..200);
            let spread = rng.gen_range(1..25);
            let data: Vec<u16> = (0..len).map(|_| rng.gen_range(0..spread) * 7).collect();
            for utf8 in [false, true] {
                let mut out = vec![];
                encode(&data, &mut out, utf8).unwrap();
                let back: Vec<u16> = decode(&mut out.as_slice(), utf8).unwrap();
                assert_eq!(back, data);
            }
        }
    }

    #[test]
    fn long_skewed_input() {
        let mut rng = StdRng::seed_from_u64(0x534b);
        let data: Vec<u8> = (0..10_000)
            .map(|_| if rng.gen_bool(0.97) { b'e' } else { rng.gen_range(b'a'..b'e') })
            .collect();
        let record = ac_encode(&data).unwrap();
        assert_eq!(ac_decode(&record).unwrap(), data);
    }

    #[test]
    fn stream_stops_at_its_last_byte() {
        let mut out = vec![];
        encode("mississippi".as_bytes(), &mut out, false).unwrap();
        out.push(0x99);
        let mut source = out.as_slice();
        let back: Vec<u8> = decode(&mut source, false).unwrap();
        assert_eq!(back, b"mississippi");
        assert_eq!(source, &[0x99]);
    }

    #[test]
    fn out_of_range_value_is_malformed_interval() {
        let seg = [0.0, 0.25, 0.5, 1.0];
        assert!(matches!(
            bin_search_step(&seg, 0.75, true, 0, 2),
            Err(CodecError::MalformedInterval { .. })
        ));
        assert_eq!(bin_search_step(&seg, 0.5, true, 0, 3).unwrap(), (2, 3));
        assert_eq!(bin_search_step(&seg, 0.5, false, 0, 3).unwrap(), (0, 2));
    }

    #[test]
    fn bad_counts_are_corrupted() {
        let record = AcRecord {
            length: 4,
            alphabet: vec![1_u8, 2],
            counts: vec![3, 2],
            payload: vec![0xff],
        };
        assert!(matches!(
            ac_decode(&record),
            Err(CodecError::CorruptedData(_))
        ));
    }
}
