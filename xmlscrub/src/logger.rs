//! Logging bootstrap for the CLI.

use env_logger::Builder;
use log::LevelFilter;

/// Initializes the global logger.
///
/// An explicit `level` wins; otherwise `RUST_LOG` is honored, falling back
/// to `info`. Safe to call once per process; the CLI calls it before any
/// other work.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    // try_init so tests that initialize logging twice don't panic.
    let _ = builder.try_init();
}
