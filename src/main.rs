//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use log::{error, info, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode};

use textpack::compression::compress::compress;
use textpack::compression::decompress::decompress;
use textpack::tools::cli::{opts_init, Mode};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    // Available log levels are Error, Warn, Info, Debug, Trace.
    // Logs go to stderr so that -c can stream the result to stdout.
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("Unable to start the logger: {}", e);
    }

    let options = match opts_init() {
        Ok(options) => options,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    //----- Figure how what we need to do and go do it
    let result = match options.op_mode {
        Mode::Zip => compress(&options),
        Mode::Unzip | Mode::Test => decompress(&options),
    };

    match result {
        Ok(()) => info!("Done.\n"),
        Err(e) => {
            error!("{}: {}", options.file, e);
            std::process::exit(1);
        }
    }
}
