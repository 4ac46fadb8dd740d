//! The huffman_coding module is the block-wise prefix coder.
//!
//! Input is cut into fixed-size blocks (see `Settings::huffman_block_size`). Each block gets its
//! own code table built from that block's symbol counts, so blocks are independent for modelling
//! purposes. Only the symbols and their code lengths are stored; the code values themselves are
//! rebuilt by the canonical assignment on both sides.
//!
//! - huffman_code_from_weights: code lengths from a huffman tree over the block's counts.
//! - canonical: code values from (order, length) pairs.
//! - huffman: the block codec and its stream layout.
//!
pub mod canonical;
pub mod huffman;
pub mod huffman_code_from_weights;
