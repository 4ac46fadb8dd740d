use std::cmp::Ordering;
use std::io::{Read, Write};

use log::{debug, info, trace};
use rustc_hash::FxHashMap;

use super::canonical::{assign_codes, decode_map, encode_map, CodeEntry};
use super::huffman_code_from_weights::code_lengths;
use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;
use crate::error::{CodecError, Result};
use crate::tools::freq_count::counted_alphabet;
use crate::tools::settings::Settings;
use crate::tools::symbol::Symbol;
use crate::tools::wire::{
    prealloc, read_symbols, read_u16, read_u32, read_u8, wire_len, write_symbols, write_u16,
    write_u32, write_u8,
};

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum NodeData {
    Kids(Box<Node>, Box<Node>),
    Leaf(u32),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Node {
    pub weight: u32,
    pub depth: u8,
    pub syms: u32,
    pub node_data: NodeData,
}

impl Node {
    /// Create a new node
    pub fn new(weight: u32, depth: u8, syms: u32, node_data: NodeData) -> Node {
        Node {
            weight,
            depth,
            syms,
            node_data,
        }
    }
}

impl Ord for Node {
    /// Sort Nodes by decreasing weight and decreasing symbol value
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.syms.cmp(&self.syms))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One coded block: its canonical table in stored order and the packed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanBlock<S> {
    pub table: Vec<CodeEntry<S>>,
    /// Symbols coded in this block.
    pub length: u32,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanRecord<S> {
    pub length: u32,
    pub blocks: Vec<HuffmanBlock<S>>,
}

/// Bits needed to store any of the code lengths, floor(log2(max)) + 1.
fn length_bit_width<S>(table: &[CodeEntry<S>]) -> u8 {
    let max = table.iter().map(|e| e.length).max().unwrap_or(1);
    (8 - max.leading_zeros()) as u8
}

/// Build the canonical table for one block: symbols by ascending frequency, then stable
/// sorted by code length.
fn block_table<S: Symbol>(block: &[S]) -> Result<Vec<CodeEntry<S>>> {
    let mut counted = counted_alphabet(block);
    counted.sort_by_key(|&(_, count)| count);

    let weights: Vec<u32> = counted.iter().map(|&(_, count)| count).collect();
    let lengths = code_lengths(&weights);

    let mut table: Vec<(S, u8)> = counted
        .iter()
        .zip(lengths)
        .map(|(&(sym, _), len)| (sym, len))
        .collect();
    table.sort_by_key(|&(_, len)| len);
    assign_codes(&table)
}

fn encode_block<S: Symbol>(block: &[S]) -> Result<HuffmanBlock<S>> {
    let table = block_table(block)?;
    let codes = encode_map(&table);

    let mut bw = BitWriter::new(block.len() / 2 + 1);
    for sym in block {
        let &(code, len) = codes
            .get(sym)
            .ok_or_else(|| CodecError::UnknownSymbol(sym.to_u32()))?;
        bw.out_bits(code, len);
    }
    trace!(
        "Huffman block: {} symbols, {} codes, payload {}",
        block.len(),
        table.len(),
        bw.loc()
    );
    Ok(HuffmanBlock {
        table,
        length: wire_len(block.len())?,
        payload: bw.into_bytes(),
    })
}

/// Huffman encode the data, one independent table per block of `settings.huffman_block_size`.
pub fn huffman_encode<S: Symbol>(data: &[S], settings: &Settings) -> Result<HuffmanRecord<S>> {
    settings.validate()?;
    let blocks = data
        .chunks(settings.huffman_block_size)
        .map(encode_block)
        .collect::<Result<Vec<_>>>()?;
    debug!(
        "Huffman encoded {} symbols in {} blocks",
        data.len(),
        blocks.len()
    );
    Ok(HuffmanRecord {
        length: wire_len(data.len())?,
        blocks,
    })
}

/// Decode `count` symbols from the bit reader using the block's table.
fn decode_symbols<S: Symbol, R: Read>(
    table: &[CodeEntry<S>],
    count: usize,
    br: &mut BitReader<R>,
) -> Result<Vec<S>> {
    let lookup: FxHashMap<(u32, u8), S> = decode_map(table);
    let max_len = table.iter().map(|e| e.length).max().unwrap_or(0);
    let mut out = Vec::with_capacity(prealloc(count));

    let mut value = 0_u32;
    let mut len = 0_u8;
    while out.len() < count {
        value = (value << 1) | br.bit()? as u32;
        len += 1;
        if let Some(&sym) = lookup.get(&(value, len)) {
            out.push(sym);
            value = 0;
            len = 0;
        } else if len >= max_len {
            return Err(CodecError::corrupted(format!(
                "no Huffman code matches {:0width$b} at {}",
                value,
                br.loc(),
                width = len as usize
            )));
        }
    }
    Ok(out)
}

/// Decode an in-memory record.
pub fn huffman_decode<S: Symbol>(record: &HuffmanRecord<S>) -> Result<Vec<S>> {
    let mut out = Vec::with_capacity(prealloc(record.length as usize));
    for block in &record.blocks {
        let mut br = BitReader::new(block.payload.as_slice());
        out.extend(decode_symbols(&block.table, block.length as usize, &mut br)?);
    }
    if out.len() != record.length as usize {
        return Err(CodecError::corrupted("Huffman blocks do not add up to the record length"));
    }
    Ok(out)
}

impl<S: Symbol> HuffmanBlock<S> {
    /// alphabetLength u16, symbols in table order, length bit width u8, packed code lengths,
    /// packed payload.
    pub fn write_to<W: Write>(&self, w: &mut W, utf8: bool) -> Result<()> {
        let alphabet_len = u16::try_from(self.table.len()).map_err(|_| {
            CodecError::InvalidSetting(format!(
                "{} distinct symbols do not fit a Huffman block",
                self.table.len()
            ))
        })?;
        write_u16(w, alphabet_len)?;
        let symbols: Vec<S> = self.table.iter().map(|e| e.symbol).collect();
        write_symbols(w, &symbols, utf8)?;

        let width = length_bit_width(&self.table);
        write_u8(w, width)?;
        let mut bw = BitWriter::new(self.table.len());
        for entry in &self.table {
            bw.out_bits(entry.length as u32, width);
        }
        w.write_all(&bw.into_bytes())?;
        w.write_all(&self.payload)?;
        Ok(())
    }

    /// Read one block's table and decode its `count` symbols straight from the stream.
    fn read_symbols_from<R: Read>(r: &mut R, count: usize, utf8: bool) -> Result<Vec<S>> {
        let alphabet_len = read_u16(r)? as usize;
        if alphabet_len == 0 {
            return Err(CodecError::corrupted("Huffman block with an empty alphabet"));
        }
        let symbols: Vec<S> = read_symbols(r, alphabet_len, utf8)?;

        let width = read_u8(r)?;
        if !(1..=8).contains(&width) {
            return Err(CodecError::corrupted(format!(
                "Huffman length bit width {} is invalid",
                width
            )));
        }
        let mut lengths = Vec::with_capacity(alphabet_len);
        {
            let mut br = BitReader::new(&mut *r);
            for _ in 0..alphabet_len {
                let len = br.bint(width)?;
                lengths.push(u8::try_from(len).unwrap_or(u8::MAX));
            }
            trace!("Huffman code lengths took {} bytes", br.bytes_read());
        }
        let table: Vec<(S, u8)> = symbols.into_iter().zip(lengths).collect();
        let entries = assign_codes(&table)?;

        let mut br = BitReader::new(&mut *r);
        let out = decode_symbols(&entries, count, &mut br)?;
        trace!("Huffman block payload took {} bytes", br.bytes_read());
        Ok(out)
    }
}

impl<S: Symbol> HuffmanRecord<S> {
    /// totalLength u32, then every block.
    pub fn write_to<W: Write>(&self, w: &mut W, utf8: bool) -> Result<()> {
        write_u32(w, self.length)?;
        for block in &self.blocks {
            block.write_to(w, utf8)?;
        }
        Ok(())
    }
}

/// Stand-alone HA stream.
pub fn encode<S: Symbol, W: Write>(
    data: &[S],
    w: &mut W,
    utf8: bool,
    settings: &Settings,
) -> Result<()> {
    huffman_encode(data, settings)?.write_to(w, utf8)
}

/// Decode an HA stream. The block size must match the one used to encode it.
pub fn decode<S: Symbol, R: Read>(r: &mut R, utf8: bool, settings: &Settings) -> Result<Vec<S>> {
    settings.validate()?;
    let length = read_u32(r)? as usize;
    let block_size = settings.huffman_block_size;
    let block_count = (length + block_size - 1) / block_size;
    info!("Huffman stream: {} symbols in {} blocks", length, block_count);

    let mut out = Vec::with_capacity(prealloc(length));
    for block in 0..block_count {
        let count = block_size.min(length - block * block_size);
        out.extend(HuffmanBlock::<S>::read_symbols_from(r, count, utf8)?);
    }
    Ok(out)
}
