//! File header written in front of every codec stream produced by the command line tool, so a
//! compressed file carries everything needed to decode it.
//!
//! Layout: magic "TPK", version u8, method id u8, symbol width in bytes u8, flags u8 (bit 0 is
//! the utf8 symbol flag), huffman block size u32, lz77 window u32.

use std::fmt::{Display, Formatter};
use std::io::{Read, Write};

use log::debug;

use super::pipeline::Method;
use crate::error::{CodecError, Result};
use crate::tools::settings::Settings;
use crate::tools::wire::{read_u32, read_u8, write_u32, write_u8};

pub const MAGIC: &[u8; 3] = b"TPK";
pub const VERSION: u8 = 1;
const FLAG_UTF8: u8 = 0x01;

/// Width of the symbols a file was compressed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolWidth {
    /// Raw bytes.
    W8,
    /// UTF-8 text as code points up to U+FFFF.
    W16,
    /// UTF-8 text as code points.
    W32,
}

impl SymbolWidth {
    pub fn bytes(self) -> u8 {
        match self {
            SymbolWidth::W8 => 1,
            SymbolWidth::W16 => 2,
            SymbolWidth::W32 => 4,
        }
    }

    pub fn from_bytes(bytes: u8) -> Result<Self> {
        match bytes {
            1 => Ok(SymbolWidth::W8),
            2 => Ok(SymbolWidth::W16),
            4 => Ok(SymbolWidth::W32),
            other => Err(CodecError::UnsupportedSymbolWidth(other as usize)),
        }
    }

    /// Parse a width given in bits on the command line.
    pub fn from_bits(bits: &str) -> std::result::Result<Self, String> {
        match bits {
            "8" => Ok(SymbolWidth::W8),
            "16" => Ok(SymbolWidth::W16),
            "32" => Ok(SymbolWidth::W32),
            other => Err(format!("symbol width must be 8, 16 or 32, not {}", other)),
        }
    }
}

impl Display for SymbolWidth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} bit", self.bytes() as u32 * 8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub method: Method,
    pub width: SymbolWidth,
    pub utf8: bool,
    pub settings: Settings,
}

impl Header {
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(MAGIC)?;
        write_u8(w, VERSION)?;
        write_u8(w, self.method.id())?;
        write_u8(w, self.width.bytes())?;
        write_u8(w, if self.utf8 { FLAG_UTF8 } else { 0 })?;
        write_u32(w, self.settings.huffman_block_size as u32)?;
        write_u32(w, self.settings.lz77_window as u32)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0_u8; 3];
        r.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(CodecError::corrupted("not a textpack file (bad signature)"));
        }
        let version = read_u8(r)?;
        if version != VERSION {
            return Err(CodecError::corrupted(format!(
                "unsupported format version {}",
                version
            )));
        }
        let method = Method::from_id(read_u8(r)?)?;
        let width = SymbolWidth::from_bytes(read_u8(r)?)?;
        let flags = read_u8(r)?;
        if flags & !FLAG_UTF8 != 0 {
            return Err(CodecError::corrupted(format!("unknown header flags {:#04x}", flags)));
        }
        let settings = Settings::new(read_u32(r)? as usize, read_u32(r)? as usize)?;
        let header = Self {
            method,
            width,
            utf8: flags & FLAG_UTF8 != 0,
            settings,
        };
        debug!("Read header {:?}", header);
        Ok(header)
    }
}
