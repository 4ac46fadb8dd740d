//! The dictionary module replaces repeated substrings with back-references.
//!
//! LZ77 keeps a bounded search window of already coded symbols (`Settings::lz77_window`) and
//! looks up to 128 symbols ahead for the longest match. Back-references may overlap the cursor,
//! which is how a long run of one symbol collapses into a single token.
//!
pub mod lz77;
