use std::fmt::{Display, Formatter};

use clap::Parser;
use log::{info, warn};

use super::settings::{Settings, DEFAULT_HUFFMAN_BLOCK_SIZE, DEFAULT_LZ77_WINDOW};
use crate::compression::container::SymbolWidth;
use crate::compression::pipeline::Method;
use crate::error::Result;

/// Zip, Unzip, Test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
    Test,
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    File,
    Stdout,
}

impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Lossless text compressor built from classic transforms",
    long_about = "
    Compresses a file with one of the single codecs (BWT, MTF, RLE, LZ77, Huffman,
    arithmetic) or with one of the named pipelines that chain them. The method, symbol
    width and settings are stored in the compressed file, so decompression needs no options."
)]
pub struct Args {
    /// Filename of file to process
    #[clap()]
    filename: String,

    /// Perform compression on the input file
    #[clap(short = 'z', long = "compress")]
    compress: bool,

    /// Perform decompression on the input file
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    test: bool,

    ///Force overwriting output file
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Keep input file
    #[clap(short = 'k', long = "keep")]
    keep: bool,

    /// Send output to the terminal
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Sets verbosity. -v0 is silent, -v5 is chatty
    #[clap(short = 'v', default_value_t = 3)]
    v: u8,

    /// Codec or pipeline used when compressing
    #[clap(short = 'm', long, value_enum, default_value = "bwt-mtf-rle-ha")]
    method: Method,

    /// Symbol width in bits: 8 reads raw bytes, 16 and 32 read UTF-8 text as code points
    #[clap(short = 'w', long, value_parser = SymbolWidth::from_bits, default_value = "8")]
    width: SymbolWidth,

    /// Store symbols with the multi-byte (UTF-8 style) encoding instead of fixed width
    #[clap(long)]
    utf8: bool,

    /// Symbols per Huffman block (1-65535)
    #[clap(long, default_value_t = DEFAULT_HUFFMAN_BLOCK_SIZE)]
    block_size: usize,

    /// LZ77 search window (1-65535)
    #[clap(long, default_value_t = DEFAULT_LZ77_WINDOW)]
    window: usize,
}

/// Everything the drivers need, resolved from the command line.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Name of file to read for input
    pub file: String,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Don't remove input files after processing
    pub keep_input_files: bool,
    pub method: Method,
    pub width: SymbolWidth,
    pub utf8: bool,
    pub settings: Settings,
    /// Requested log level
    pub verbosity: log::LevelFilter,
}

impl TryFrom<Args> for Opts {
    type Error = crate::error::CodecError;

    /// Put command line information from CLAP into our internal structure.
    fn try_from(args: Args) -> Result<Self> {
        let op_mode = if args.test {
            Mode::Test
        } else if args.decompress && !args.compress {
            Mode::Unzip
        } else {
            Mode::Zip
        };
        let output = if args.stdout {
            Output::Stdout
        } else {
            Output::File
        };
        let verbosity = match args.v {
            0 => log::LevelFilter::Off,
            1 => log::LevelFilter::Error,
            2 => log::LevelFilter::Warn,
            3 => log::LevelFilter::Info,
            4 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        Ok(Self {
            file: args.filename,
            op_mode,
            output,
            force_overwrite: args.force,
            // Nothing is written in test mode, so the input must stay too.
            keep_input_files: args.keep || op_mode == Mode::Test,
            method: args.method,
            width: args.width,
            utf8: args.utf8,
            settings: Settings::new(args.block_size, args.window)?,
            verbosity,
        })
    }
}

/// Parse the command line, set the log level and report what we are about to do.
pub fn opts_init() -> Result<Opts> {
    let opts = Opts::try_from(Args::parse())?;
    log::set_max_level(opts.verbosity);

    // Below we report initialization status to the user
    info!("---- textpack initialization start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    info!("Getting input from the file {}", opts.file);
    if opts.output == Output::Stdout {
        warn!("Sending output to stdout");
    }
    if opts.op_mode == Mode::Zip {
        info!(
            "Method {}, {} symbols, utf8 {}",
            opts.method, opts.width, opts.utf8
        );
        info!(
            "Huffman block size {}, LZ77 window {}",
            opts.settings.huffman_block_size, opts.settings.lz77_window
        );
    }
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    if opts.keep_input_files {
        info!("Keeping input files")
    };
    info!("---- textpack initialization end ----");
    Ok(opts)
}
