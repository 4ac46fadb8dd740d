//! The arithmetic_coding module is the whole-message interval coder.
//!
//! The model is static: symbol counts over the entire input, sorted by descending count, turned
//! into cumulative segments of [0, 1). Each symbol is coded on its own by bisecting [0, 1) until
//! the working interval sits inside the symbol's segment, so precision never accumulates across
//! symbols. The decoder repeats the same bisection while binary searching the segment table.
//!
pub mod arithmetic;
