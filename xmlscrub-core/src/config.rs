//! Configuration management for `xmlscrub-core`.
//!
//! This module defines the on-disk rule document and turns it into a
//! [`RuleIndex`]. The document is a single JSON object with one field,
//! `rule_set`, an array of `{ "xpath": ..., "rules": [...] }` entries; every
//! shape error is rejected here, before the first document byte is
//! processed.
//!
//! License: MIT OR Apache-2.0

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::rules::{ReplaceRule, Rule, RuleIndex};

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScrubConfig {
    /// One entry per targeted absolute path. Entries are `Option` so that
    /// an explicit JSON `null` in the array surfaces as a distinct
    /// configuration error instead of a generic parse failure.
    pub rule_set: Vec<Option<RuleEntry>>,
}

/// The rules configured for one absolute path.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RuleEntry {
    /// Target path, exactly as the path tracker renders it (e.g. `/a/b/c`).
    pub xpath: String,
    pub rules: Vec<RuleSpec>,
}

/// One rule as written in the configuration document, before compilation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleSpec {
    /// Replace content matching `match` (a regex, or the literal `*`
    /// wildcard) with `replacement`.
    #[serde(rename = "REPLACE")]
    Replace {
        #[serde(rename = "match")]
        pattern: String,
        replacement: String,
    },
    /// Elide the element and its entire subtree from the output.
    #[serde(rename = "SKIP")]
    Skip,
}

impl ScrubConfig {
    /// Loads a configuration document from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not parse into the
    /// documented shape (a missing `xpath`, an unrecognized rule `type`,
    /// and malformed JSON all surface here).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading configuration file: {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses a configuration document from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: ScrubConfig = serde_json::from_str(text)?;
        debug!("Parsed {} rule entries.", config.rule_set.len());
        Ok(config)
    }

    /// Validates the document and compiles it into an immutable
    /// [`RuleIndex`].
    ///
    /// Entries sharing an `xpath` merge into one rule set. Rejected here,
    /// each as its own error: a `null` entry, an empty `xpath`, an invalid
    /// or overlong regex, and a second `SKIP` rule at a path that already
    /// holds one.
    pub fn build_index(&self) -> Result<RuleIndex, ConfigError> {
        let mut builder = RuleIndex::builder();

        for (position, entry) in self.rule_set.iter().enumerate() {
            let entry = entry
                .as_ref()
                .ok_or(ConfigError::NullRuleEntry(position))?;
            if entry.xpath.is_empty() {
                return Err(ConfigError::EmptyXPath(position));
            }

            for spec in &entry.rules {
                let rule = match spec {
                    RuleSpec::Replace {
                        pattern,
                        replacement,
                    } => Rule::Replace(ReplaceRule::compile(&entry.xpath, pattern, replacement)?),
                    RuleSpec::Skip => Rule::Skip,
                };
                builder.add_rule(&entry.xpath, rule)?;
            }
        }

        let index = builder.build();
        info!("Loaded {} xpath rule sets.", index.len());
        Ok(index)
    }
}

/// Source of a ready-to-use rule index, abstracted over the document
/// format. The conversion entry points only care about the index.
pub trait RuleReader {
    /// Reads and compiles the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Any read, parse, or validation failure; always before streaming.
    fn read(&self, path: &Path) -> Result<RuleIndex, ConfigError>;
}

/// The JSON implementation of [`RuleReader`].
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRuleReader;

impl RuleReader for JsonRuleReader {
    fn read(&self, path: &Path) -> Result<RuleIndex, ConfigError> {
        ScrubConfig::load_from_file(path)?.build_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replace_and_skip_rules() {
        let config = ScrubConfig::from_json_str(
            r#"{
                "rule_set": [
                    {
                        "xpath": "/root/public",
                        "rules": [{"type": "REPLACE", "match": "*", "replacement": "REDACTED"}]
                    },
                    {
                        "xpath": "/root/secret",
                        "rules": [{"type": "SKIP"}]
                    }
                ]
            }"#,
        )
        .unwrap();

        let index = config.build_index().unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.is_skip("/root/secret"));
        assert!(!index.is_skip("/root/public"));
        let rules = index.replace_rules("/root/public");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].pattern(), "*");
        assert_eq!(rules[0].replacement(), "REDACTED");
    }

    #[test]
    fn null_rule_entry_is_rejected() {
        let config = ScrubConfig::from_json_str(
            r#"{"rule_set": [null, {"xpath": "/a", "rules": []}]}"#,
        )
        .unwrap();
        let err = config.build_index().unwrap_err();
        assert!(matches!(err, ConfigError::NullRuleEntry(0)));
    }

    #[test]
    fn empty_xpath_is_rejected() {
        let config =
            ScrubConfig::from_json_str(r#"{"rule_set": [{"xpath": "", "rules": []}]}"#).unwrap();
        let err = config.build_index().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyXPath(0)));
    }

    #[test]
    fn missing_xpath_fails_to_parse() {
        let err = ScrubConfig::from_json_str(r#"{"rule_set": [{"rules": []}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unrecognized_rule_type_fails_to_parse() {
        let err = ScrubConfig::from_json_str(
            r#"{"rule_set": [{"xpath": "/a", "rules": [{"type": "OBFUSCATE"}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn duplicate_skip_across_entries_is_rejected() {
        let config = ScrubConfig::from_json_str(
            r#"{
                "rule_set": [
                    {"xpath": "/a/b", "rules": [{"type": "SKIP"}]},
                    {"xpath": "/a/b", "rules": [{"type": "SKIP"}]}
                ]
            }"#,
        )
        .unwrap();
        let err = config.build_index().unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSkip(path) if path == "/a/b"));
    }

    #[test]
    fn duplicate_skip_within_one_entry_is_rejected() {
        let config = ScrubConfig::from_json_str(
            r#"{"rule_set": [{"xpath": "/a", "rules": [{"type": "SKIP"}, {"type": "SKIP"}]}]}"#,
        )
        .unwrap();
        let err = config.build_index().unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSkip(_)));
    }

    #[test]
    fn invalid_regex_is_rejected_at_build_time() {
        let config = ScrubConfig::from_json_str(
            r#"{"rule_set": [{"xpath": "/a", "rules": [{"type": "REPLACE", "match": "(", "replacement": "X"}]}]}"#,
        )
        .unwrap();
        let err = config.build_index().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn entries_for_the_same_path_merge() {
        let config = ScrubConfig::from_json_str(
            r#"{
                "rule_set": [
                    {"xpath": "/a", "rules": [{"type": "REPLACE", "match": "x", "replacement": "y"}]},
                    {"xpath": "/a", "rules": [{"type": "REPLACE", "match": "z", "replacement": "w"}]}
                ]
            }"#,
        )
        .unwrap();
        let index = config.build_index().unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.replace_rules("/a").len(), 2);
    }

    #[test]
    fn load_from_file_reports_missing_file() {
        let err = ScrubConfig::load_from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
