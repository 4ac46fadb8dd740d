//! Classical lossless compression transforms and entropy coders, usable alone or chained.
//!
//! Version 0.1.0
//!
//! Every codec is generic over the symbol width (u8, u16 or u32) and writes a self-delimiting,
//! little-endian stream. Symbols inside a stream are stored either at their fixed width or, with
//! the `utf8` flag, in a 1 to 6 byte variable-length form.
//!
//! The codecs are:
//! - BWT: Burrows-Wheeler transform with an implicit end-of-string sentinel.
//! - MTF: Move-To-Front over the sorted alphabet of the input.
//! - RLE: run-length encoding with signed counts.
//! - LZ77: sliding-window back-references.
//! - HA: block-wise canonical Huffman coding.
//! - AC: arithmetic coding by interval bisection.
//!
//! The named pipelines (BWT-MTF-RLE-HA and friends) live in `compression::pipeline`.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> textpack -z --method bwt-mtf-rle-ha notes.txt`
//!
//! This creates notes.txt.tpk and deletes notes.txt unless `-k` is given.
//!
pub mod arithmetic_coding;
pub mod bitstream;
pub mod bwt_algorithms;
pub mod compression;
pub mod dictionary;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::compress::compress_bytes;
pub use compression::decompress::decompress_bytes;
pub use compression::pipeline::Method;
pub use error::{CodecError, Result};
pub use tools::settings::Settings;
pub use tools::symbol::Symbol;
