// xmlscrub/src/main.rs
//! XmlScrub entry point.
//!
//! Parses the CLI, initializes logging, and runs the conversion command.

use anyhow::Result;
use clap::Parser;
use log::error;

use xmlscrub::cli::Cli;
use xmlscrub::logger;
use xmlscrub::{run_convert, ConvertOptions};

fn main() -> Result<()> {
    let args = Cli::parse();

    if args.quiet {
        logger::init_logger(Some(log::LevelFilter::Off));
    } else if args.verbose {
        logger::init_logger(Some(log::LevelFilter::Debug));
    } else {
        logger::init_logger(None);
    }

    let output = args.output_path();
    let opts = ConvertOptions {
        input: &args.input,
        output: &output,
        config: &args.config,
        quiet: args.quiet,
    };

    run_convert(&opts).inspect_err(|err| {
        error!("Error executing conversion: {err:#}");
    })
}
