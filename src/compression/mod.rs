//! The compression module chains the codecs into named pipelines and drives them from files.
//!
//! A pipeline runs its stages left to right when encoding:
//! - Block sort (BWT): group symbols by context.
//! - Move To Front (MTF): turn that locality into small ranks.
//! - Run-Length Encoding (RLE): collapse the runs the first two stages produce.
//! - Dictionary (LZ77): replace repeated substrings with back-references.
//! - Entropy coding, Huffman (HA) or arithmetic (AC): spend fewer bits on frequent symbols.
//!
//! Each stage hands its in-memory record straight to the next one and the record is released as
//! soon as it has been consumed. Decoding runs the same stages in reverse, reading the entropy
//! section first and then the metadata the earlier stages stored after it.
//!
//! Files written by the command line tool start with a small header (see container) naming the
//! method, symbol width and settings, so they can be decoded without any options.
//!

pub mod compress;
pub mod container;
pub mod decompress;
pub mod pipeline;
