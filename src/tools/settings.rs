//! Tunable parameters shared by the codecs.
use log::debug;

use crate::error::{CodecError, Result};

/// Default number of symbols the Huffman coder models at once.
pub const DEFAULT_HUFFMAN_BLOCK_SIZE: usize = 32_768;
/// Default distance the dictionary coder searches backwards.
pub const DEFAULT_LZ77_WINDOW: usize = 4_096;
/// Longest match the dictionary coder will look ahead for.
pub const LZ77_LOOKAHEAD: usize = 128;

/// Both limits are bounded by the wire format: a Huffman block's alphabet length is a u16 and
/// dictionary offsets are u16.
const MAX_SETTING: usize = u16::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Symbols per Huffman block, 1..=65535.
    pub huffman_block_size: usize,
    /// Dictionary search window, 1..=65535.
    pub lz77_window: usize,
}

impl Settings {
    /// Build and validate.
    pub fn new(huffman_block_size: usize, lz77_window: usize) -> Result<Self> {
        let settings = Self {
            huffman_block_size,
            lz77_window,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SETTING).contains(&self.huffman_block_size) {
            return Err(CodecError::InvalidSetting(format!(
                "huffman block size {} is outside 1..={}",
                self.huffman_block_size, MAX_SETTING
            )));
        }
        if !(1..=MAX_SETTING).contains(&self.lz77_window) {
            return Err(CodecError::InvalidSetting(format!(
                "lz77 window {} is outside 1..={}",
                self.lz77_window, MAX_SETTING
            )));
        }
        debug!(
            "Settings: huffman block size {}, lz77 window {}",
            self.huffman_block_size, self.lz77_window
        );
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            huffman_block_size: DEFAULT_HUFFMAN_BLOCK_SIZE,
            lz77_window: DEFAULT_LZ77_WINDOW,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.huffman_block_size, 32_768);
        assert_eq!(settings.lz77_window, 4_096);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn limits() {
        assert!(Settings::new(1, 1).is_ok());
        assert!(Settings::new(65_535, 65_535).is_ok());
        assert!(matches!(
            Settings::new(0, 4096),
            Err(CodecError::InvalidSetting(_))
        ));
        assert!(matches!(
            Settings::new(65_536, 4096),
            Err(CodecError::InvalidSetting(_))
        ));
        assert!(matches!(
            Settings::new(1024, 70_000),
            Err(CodecError::InvalidSetting(_))
        ));
    }
}
