//! Error type shared by every codec, pipeline and the command line driver.
//!
//! Codec failures are local and synchronous: any error aborts the encode or decode call that
//! raised it. I/O errors from the underlying stream are passed through untouched.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// Arithmetic decoding produced a probability outside the candidate segment range.
    #[error("malformed interval: value {value} is outside segments [{low}, {high}]")]
    MalformedInterval { value: f64, low: f64, high: f64 },

    /// A symbol was looked up in an alphabet it was never derived from.
    #[error("unknown symbol {0:#x}: not part of the derived alphabet")]
    UnknownSymbol(u32),

    /// Token flattening is only defined for 8, 16 and 32 bit symbols.
    #[error("unsupported symbol width: {0} bytes")]
    UnsupportedSymbolWidth(usize),

    /// The value cannot be carried by the multi-byte encoding or by the target symbol width.
    #[error("invalid code point {0:#x}")]
    InvalidCodePoint(u32),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Shorthand used by the decoders when a stream fails a structural check.
    pub fn corrupted(msg: impl Into<String>) -> Self {
        CodecError::CorruptedData(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
