//! errors.rs - Custom error types for the xmlscrub-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `xmlscrub-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions. This prevents them from
/// matching all variants exhaustively, thus avoiding breaking changes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScrubError {
    /// A bad rule-set shape, duplicate skip rule, or invalid pattern.
    /// Always raised before the first document byte is processed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An end-element event arrived with no matching start-element.
    #[error("path stack underflow: {0}")]
    PathUnderflow(String),

    /// The document ended while elements were still open.
    #[error("document ended with {open} unclosed element(s), innermost at '{path}'")]
    UnbalancedDocument { open: usize, path: String },

    /// A fatal tokenizer error, with the byte offset where it occurred.
    #[error("XML parse error at byte {position}: {source}")]
    Parse {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("an unexpected I/O error occurred: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors detected while building a [`crate::rules::RuleIndex`] from a
/// configuration document. Each variant corresponds to one distinct shape
/// of bad configuration; all of them abort before streaming begins.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read configuration file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("configuration has errors, found a null rule entry at index {0}")]
    NullRuleEntry(usize),

    #[error("rule entry at index {0} has an empty xpath")]
    EmptyXPath(usize),

    #[error("invalid match pattern '{pattern}' for path '{xpath}': {source}")]
    InvalidPattern {
        xpath: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("pattern for path '{xpath}' is {len} characters long, exceeding the maximum of {max}")]
    PatternTooLong {
        xpath: String,
        len: usize,
        max: usize,
    },

    #[error("more than one SKIP rule defined for path '{0}'; only one is allowed per path")]
    DuplicateSkip(String),
}
