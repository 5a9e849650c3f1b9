// xmlscrub-core/src/lib.rs
//! # XmlScrub Core Library
//!
//! `xmlscrub-core` rewrites an XML document in a single forward streaming
//! pass, selectively redacting or deleting content at locations identified
//! by absolute element paths, producing well-formed XML with correctly
//! escaped text and attribute values. It exists for batch sanitization
//! pipelines that must strip or mask sensitive field values from large XML
//! exports without loading the document into memory.
//!
//! ## Modules
//!
//! * `config`: the on-disk rule document and its compilation into a rule index.
//! * `rules`: the closed rule variants (replace, skip) and the per-path index.
//! * `path`: the open-element stack rendered as absolute path strings.
//! * `escape`: XML text and attribute-value escaping.
//! * `rewriter`: the event-driven streaming rewrite engine.
//! * `convert`: conversion entry points binding the tokenizer to the rewriter.
//! * `errors`: the library error taxonomy.
//!
//! ## Usage Example
//!
//! ```rust
//! use xmlscrub_core::{scrub_string, ScrubConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ScrubConfig::from_json_str(r#"{
//!         "rule_set": [
//!             {"xpath": "/root/secret", "rules": [{"type": "SKIP"}]},
//!             {"xpath": "/root/public", "rules": [
//!                 {"type": "REPLACE", "match": "*", "replacement": "REDACTED"}
//!             ]}
//!         ]
//!     }"#)?;
//!     let rules = config.build_index()?;
//!
//!     let output = scrub_string(
//!         "<root><secret>42</secret><public>hi &amp; bye</public></root>",
//!         &rules,
//!     )?;
//!     assert_eq!(
//!         output,
//!         "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root><public>REDACTED</public></root>"
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fatal conditions are typed: configuration errors surface before any
//! document byte is processed, structural and I/O errors abort the current
//! document mid-stream. Recoverable tokenizer-level oddities (such as a
//! malformed attribute) are logged through the `log` facade and do not
//! abort the run. Nothing is retried; retry policy belongs to the caller
//! around the whole conversion call.
//!
//! ## Concurrency
//!
//! Single-threaded and synchronous. A [`RuleIndex`] is immutable after
//! construction and may be shared read-only across concurrent conversions;
//! all per-document state is exclusively owned by one converter call.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod convert;
pub mod errors;
pub mod escape;
pub mod path;
pub mod rewriter;
pub mod rules;

/// Re-exports the configuration document types and the rule-reader seam.
pub use config::{JsonRuleReader, RuleEntry, RuleReader, RuleSpec, ScrubConfig};

/// Re-exports the library error taxonomy.
pub use errors::{ConfigError, ScrubError};

/// Re-exports the rule model and the immutable per-path index.
pub use rules::{ReplaceRule, Rule, RuleIndex, MAX_PATTERN_LENGTH, WILDCARD_PATTERN};

/// Re-exports the conversion entry points.
pub use convert::{scrub_string, Converter};

/// Re-exports the streaming engine and its fixed prolog line.
pub use rewriter::{StreamRewriter, XML_DOCUMENT_START_DEFAULT};

pub use escape::escape;
pub use path::PathTracker;
