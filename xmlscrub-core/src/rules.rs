//! rules.rs - Redaction rule variants and the per-path rule index.
//!
//! Rules come in two closed variants: content replacement (a regex or the
//! `*` wildcard, plus a replacement string) and skip (elide the element and
//! its whole subtree). A [`RuleIndex`] maps a rendered absolute path to the
//! set of rules configured for exactly that path; it is built once from
//! configuration and read-only for the lifetime of a conversion run.
//!
//! License: MIT OR APACHE 2.0

use std::borrow::Cow;
use std::collections::HashMap;

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::errors::ConfigError;

/// The literal pattern that means "replace the entire content".
pub const WILDCARD_PATTERN: &str = "*";

/// Maximum allowed length for a match pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// How a replace rule decides what to substitute.
#[derive(Debug, Clone)]
enum MatchPattern {
    /// `*`: the whole content chunk is replaced unconditionally.
    Wildcard,
    /// Every non-overlapping match of the regex is replaced.
    Regex(Regex),
}

/// A compiled content-replacement rule for one path.
///
/// The rule operates on already-escaped text: escaping runs first, so a
/// user-supplied pattern sees `&amp;` rather than a raw `&`.
#[derive(Debug, Clone)]
pub struct ReplaceRule {
    pattern: MatchPattern,
    replacement: String,
}

impl ReplaceRule {
    /// Compiles `pattern` (a regex, or the literal `*` wildcard) into a
    /// ready-to-apply rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if the regex does not compile
    /// and [`ConfigError::PatternTooLong`] if it exceeds
    /// [`MAX_PATTERN_LENGTH`]. `xpath` only labels the error message.
    pub fn compile(xpath: &str, pattern: &str, replacement: &str) -> Result<Self, ConfigError> {
        if pattern == WILDCARD_PATTERN {
            return Ok(Self {
                pattern: MatchPattern::Wildcard,
                replacement: replacement.to_string(),
            });
        }

        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(ConfigError::PatternTooLong {
                xpath: xpath.to_string(),
                len: pattern.len(),
                max: MAX_PATTERN_LENGTH,
            });
        }

        let regex = RegexBuilder::new(pattern)
            .size_limit(10 * (1 << 20)) // 10 MB limit for compiled regex
            .build()
            .map_err(|source| ConfigError::InvalidPattern {
                xpath: xpath.to_string(),
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            pattern: MatchPattern::Regex(regex),
            replacement: replacement.to_string(),
        })
    }

    /// Applies the rule to one (already escaped) content chunk.
    ///
    /// A wildcard returns the replacement regardless of `content`, including
    /// for empty or whitespace-only chunks. A regex replaces every
    /// non-overlapping match; capture-group references (`$1`) in the
    /// replacement are honored.
    pub fn apply<'a>(&self, content: &'a str) -> Cow<'a, str> {
        match &self.pattern {
            MatchPattern::Wildcard => Cow::Owned(self.replacement.clone()),
            MatchPattern::Regex(regex) => regex.replace_all(content, self.replacement.as_str()),
        }
    }

    /// The original pattern string (`*` for the wildcard).
    pub fn pattern(&self) -> &str {
        match &self.pattern {
            MatchPattern::Wildcard => WILDCARD_PATTERN,
            MatchPattern::Regex(regex) => regex.as_str(),
        }
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

// Uniqueness of rules within a set is by value: two rules are the same iff
// their pattern strings and replacements are equal.
impl PartialEq for ReplaceRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern() == other.pattern() && self.replacement == other.replacement
    }
}

impl Eq for ReplaceRule {}

/// A single parsed rule, before it is folded into a [`RuleSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Replace(ReplaceRule),
    Skip,
}

/// The rules configured for exactly one absolute path.
///
/// The skip flag is stored apart from the replace rules so the "at most one
/// skip per path" invariant is structural; duplicate SKIP entries are
/// rejected while the set is built, never discovered mid-stream.
#[derive(Debug, Default)]
pub struct RuleSet {
    replace: Vec<ReplaceRule>,
    skip: bool,
}

impl RuleSet {
    /// Replace rules in the order they were discovered in configuration.
    pub fn replace_rules(&self) -> &[ReplaceRule] {
        &self.replace
    }

    /// True if this path is marked for full subtree elision.
    pub fn is_skip(&self) -> bool {
        self.skip
    }
}

/// Immutable mapping from rendered absolute path to [`RuleSet`].
///
/// Lookup is O(1) amortized on the rendered path string. The index is never
/// mutated after [`RuleIndexBuilder::build`]; it may be shared read-only
/// across concurrent conversions.
#[derive(Debug, Default)]
pub struct RuleIndex {
    by_path: HashMap<String, RuleSet>,
}

impl RuleIndex {
    pub fn builder() -> RuleIndexBuilder {
        RuleIndexBuilder::default()
    }

    /// True if a skip rule is registered at `path`.
    pub fn is_skip(&self, path: &str) -> bool {
        self.by_path.get(path).is_some_and(RuleSet::is_skip)
    }

    /// The replace rules registered at `path`, or an empty slice if the
    /// path is absent from the index.
    pub fn replace_rules(&self, path: &str) -> &[ReplaceRule] {
        self.by_path
            .get(path)
            .map_or(&[], |set| set.replace_rules())
    }

    /// Number of distinct paths with at least one rule.
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

/// Accumulates parsed rules and enforces construction-time invariants.
#[derive(Debug, Default)]
pub struct RuleIndexBuilder {
    by_path: HashMap<String, RuleSet>,
}

impl RuleIndexBuilder {
    /// Registers one rule at `path`. Entries for the same path merge into
    /// one set; a replace rule equal by value to one already present is
    /// dropped, and a second skip rule is a configuration error.
    pub fn add_rule(&mut self, path: &str, rule: Rule) -> Result<(), ConfigError> {
        let set = self.by_path.entry(path.to_string()).or_default();
        match rule {
            Rule::Replace(rule) => {
                if !set.replace.contains(&rule) {
                    set.replace.push(rule);
                }
            }
            Rule::Skip => {
                if set.skip {
                    return Err(ConfigError::DuplicateSkip(path.to_string()));
                }
                set.skip = true;
            }
        }
        Ok(())
    }

    pub fn build(self) -> RuleIndex {
        debug!("Built rule index with {} path entries.", self.by_path.len());
        RuleIndex {
            by_path: self.by_path,
        }
    }
}
