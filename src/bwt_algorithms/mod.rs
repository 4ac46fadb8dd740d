//! The bwt_algorithms module holds the block-sorting subsystem.
//!
//! The Burrows-Wheeler Transform permutes a block so that symbols sharing a context end up next
//! to each other, which turns repetition in the text into runs the later stages can exploit. An
//! end-of-block sentinel, implicitly smaller than every symbol, terminates the rotations so the
//! transform is invertible from a single rotation index.
//!
//! - suffix_array: sorted suffix start positions of a sentinel-terminated block.
//! - bwt: the forward and inverse transform, plus its stream layout.
//!
pub mod bwt;
pub mod suffix_array;
