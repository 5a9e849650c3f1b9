//! Convert command implementation: load the rules, stream the document.

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use log::{debug, info};

use xmlscrub_core::{Converter, JsonRuleReader, RuleReader};

/// Options for one conversion run, resolved from the CLI.
pub struct ConvertOptions<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub config: &'a Path,
    pub quiet: bool,
}

/// The main operation runner for the xmlscrub CLI.
///
/// Validates the file arguments, builds the rule index (all configuration
/// errors surface here, before any document byte is read), then runs the
/// single-pass conversion.
pub fn run_convert(opts: &ConvertOptions<'_>) -> Result<()> {
    if !opts.input.exists() {
        bail!("input file '{}' doesn't exist", opts.input.display());
    }
    if !opts.config.exists() {
        bail!(
            "configuration file '{}' not found; specify one with -c or place config.json next to the binary",
            opts.config.display()
        );
    }

    let rules = JsonRuleReader
        .read(opts.config)
        .with_context(|| format!("failed to load rules from '{}'", opts.config.display()))?;
    debug!("Rule index ready: {} path entries.", rules.len());

    if !opts.quiet {
        println!("Starting conversion");
    }
    info!(
        "Converting '{}' into '{}'",
        opts.input.display(),
        opts.output.display()
    );

    let started = Instant::now();
    Converter::new(&rules)
        .convert_file(opts.input, opts.output)
        .with_context(|| format!("conversion of '{}' failed", opts.input.display()))?;

    if !opts.quiet {
        println!("Conversion completed in {:.2?}", started.elapsed());
    }
    info!("Conversion completed in {:.2?}", started.elapsed());
    Ok(())
}
