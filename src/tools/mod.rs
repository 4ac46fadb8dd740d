//! The tools module provides the building blocks the codecs share, plus the two simplest
//! transforms.
//!
//! The tools are:
//! - symbol: the Symbol trait the codecs are generic over (u8, u16, u32).
//! - utf8: the multi-byte symbol encoding selected by the `utf8` flag.
//! - wire: little-endian integers and symbol (de)serialization.
//! - freq_count: alphabet and frequency derivation.
//! - settings: Huffman block size and LZ77 window.
//! - mtf: Move-To-Front transform.
//! - rle: Run-Length-Encoding with signed counts.
//! - cli: Command line interface.
//!
pub mod cli;
pub mod freq_count;
pub mod mtf;
pub mod rle;
pub mod settings;
pub mod symbol;
pub mod utf8;
pub mod wire;
