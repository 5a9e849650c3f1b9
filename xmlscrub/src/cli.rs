// xmlscrub/src/cli.rs
//! This file defines the command-line interface (CLI) for the xmlscrub
//! application and its arguments.
//! License: MIT OR Apache-2.0

use clap::Parser;
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "xmlscrub",
    version = env!("CARGO_PKG_VERSION"),
    about = "Redact or delete sensitive fields from XML in a single streaming pass",
    long_about = "Xmlscrub rewrites an XML document in one forward pass, applying the \
transformations configured for absolute element paths: SKIP rules delete an element and \
its whole subtree, REPLACE rules rewrite text content by regex or wholesale. It is built \
for sanitizing large XML exports that do not fit in memory.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Path to the XML document to rewrite.
    #[arg(long, short = 'i', value_name = "FILE", help = "Input XML file to rewrite.")]
    pub input: PathBuf,

    /// Where to write the rewritten document.
    #[arg(
        long,
        short = 'o',
        value_name = "FILE",
        help = "Output file. Defaults to <input>.converted.xml."
    )]
    pub output: Option<PathBuf>,

    /// Rule configuration document.
    #[arg(
        long,
        short = 'c',
        value_name = "FILE",
        default_value = "config.json",
        help = "JSON rule configuration file."
    )]
    pub config: PathBuf,

    /// Disable informational messages.
    #[arg(long, short = 'q', help = "Suppress all informational messages.")]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long, short = 'v', help = "Enable debug logging.")]
    pub verbose: bool,
}

impl Cli {
    /// The effective output path: the `-o` value, or the input path with
    /// `.converted.xml` appended.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let mut name = self.input.as_os_str().to_os_string();
            name.push(".converted.xml");
            PathBuf::from(name)
        })
    }
}
