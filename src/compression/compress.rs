use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::{info, warn};

use super::container::{Header, SymbolWidth};
use super::pipeline::encode;
use crate::error::{CodecError, Result};
use crate::tools::cli::{Opts, Output};

/// Extension appended to compressed files.
pub const EXTENSION: &str = "tpk";

/// Split UTF-8 text into code points of the requested width.
fn text_symbols<T: TryFrom<u32>>(input: &[u8]) -> Result<Vec<T>> {
    let text = std::str::from_utf8(input).map_err(|e| {
        CodecError::corrupted(format!("input is not UTF-8 text ({}); use --width 8", e))
    })?;
    text.chars()
        .map(|c| T::try_from(c as u32).map_err(|_| CodecError::InvalidCodePoint(c as u32)))
        .collect()
}

/// Compress a buffer into a self-describing stream: header, then the codec stream.
pub fn compress_bytes(input: &[u8], header: &Header) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() / 2 + 16);
    header.write_to(&mut out)?;
    let (method, utf8, settings) = (header.method, header.utf8, &header.settings);
    match header.width {
        SymbolWidth::W8 => encode(method, input, &mut out, utf8, settings)?,
        SymbolWidth::W16 => {
            let symbols: Vec<u16> = text_symbols(input)?;
            encode(method, &symbols, &mut out, utf8, settings)?
        }
        SymbolWidth::W32 => {
            let symbols: Vec<u32> = text_symbols(input)?;
            encode(method, &symbols, &mut out, utf8, settings)?
        }
    }
    Ok(out)
}

/// Refuse to clobber an existing file unless forced.
pub(crate) fn check_overwrite(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CodecError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists; use -f to overwrite", path.display()),
        )));
    }
    Ok(())
}

/// Compress the input file defined in opts.
pub fn compress(opts: &Opts) -> Result<()> {
    let input = fs::read(&opts.file)?;
    info!("Read {} bytes from {}", input.len(), opts.file);

    let header = Header {
        method: opts.method,
        width: opts.width,
        utf8: opts.utf8,
        settings: opts.settings,
    };
    let output = compress_bytes(&input, &header)?;
    if !input.is_empty() {
        info!(
            "Compressed {} bytes to {} ({:.1}%)",
            input.len(),
            output.len(),
            output.len() as f64 * 100.0 / input.len() as f64
        );
    }
    if output.len() > input.len() {
        warn!("Output is larger than the input");
    }

    match opts.output {
        Output::Stdout => io::stdout().lock().write_all(&output)?,
        Output::File => {
            let fname = format!("{}.{}", opts.file, EXTENSION);
            check_overwrite(Path::new(&fname), opts.force_overwrite)?;
            fs::write(&fname, &output)?;
            info!("Wrote {}", fname);
            if !opts.keep_input_files {
                fs::remove_file(&opts.file)?;
                info!("Removed {}", opts.file);
            }
        }
    }
    Ok(())
}
