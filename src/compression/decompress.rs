use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::{error, info, warn};

use super::compress::{check_overwrite, EXTENSION};
use super::container::{Header, SymbolWidth};
use super::pipeline::decode;
use crate::error::{CodecError, Result};
use crate::tools::cli::{Mode, Opts, Output};

/// Re-encode decoded code points as UTF-8 text.
fn text_bytes(symbols: impl IntoIterator<Item = u32>) -> Result<Vec<u8>> {
    let text = symbols
        .into_iter()
        .map(|v| char::from_u32(v).ok_or(CodecError::InvalidCodePoint(v)))
        .collect::<Result<String>>()?;
    Ok(text.into_bytes())
}

/// Decompress a stream produced by `compress_bytes`.
pub fn decompress_bytes(input: &[u8]) -> Result<Vec<u8>> {
    let mut source = input;
    let header = Header::read_from(&mut source)?;
    info!(
        "Found a valid header: {}, {} symbols, utf8 {}",
        header.method, header.width, header.utf8
    );
    let (method, utf8, settings) = (header.method, header.utf8, &header.settings);

    let out = match header.width {
        SymbolWidth::W8 => decode::<u8, _>(method, &mut source, utf8, settings)?,
        SymbolWidth::W16 => {
            let symbols: Vec<u16> = decode(method, &mut source, utf8, settings)?;
            text_bytes(symbols.into_iter().map(u32::from))?
        }
        SymbolWidth::W32 => {
            let symbols: Vec<u32> = decode(method, &mut source, utf8, settings)?;
            text_bytes(symbols)?
        }
    };
    if !source.is_empty() {
        warn!("Ignoring {} trailing bytes after the stream", source.len());
    }
    Ok(out)
}

/// Decompress the file specified in opts. Test mode decodes without writing anything.
pub fn decompress(opts: &Opts) -> Result<()> {
    let input = fs::read(&opts.file)?;
    let output = match decompress_bytes(&input) {
        Ok(output) => output,
        Err(e) => {
            error!("Fatal error: {} is not a valid textpack file: {}", opts.file, e);
            return Err(e);
        }
    };
    info!("Decompressed {} bytes to {}", input.len(), output.len());

    if opts.op_mode == Mode::Test {
        info!("{}: ok", opts.file);
        return Ok(());
    }

    match opts.output {
        Output::Stdout => io::stdout().lock().write_all(&output)?,
        Output::File => {
            let suffix = format!(".{}", EXTENSION);
            let fname = match opts.file.strip_suffix(&suffix) {
                Some(stem) if !stem.is_empty() => stem.to_string(),
                _ => format!("{}.out", opts.file),
            };
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
