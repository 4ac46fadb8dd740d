//! The bitstream module forms the I/O subsystem for sub-byte quantities.
//!
//! The entropy coders (Huffman and arithmetic) and the bit-packed count tables write individual
//! bits or short bit fields. BitWriter packs those most-significant-bit first into bytes, padding
//! the final byte with zeros. BitReader reverses this, pulling one byte at a time from any
//! source that supports read(), so that a section which ends on a partial byte never consumes
//! the bytes of the section that follows it.
//!
pub mod bitreader;
pub mod bitwriter;
