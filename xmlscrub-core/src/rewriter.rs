//! rewriter.rs - The event-driven streaming rewrite engine.
//!
//! A `StreamRewriter` consumes tokenizer events for exactly one document
//! and decides, per event, whether to emit, transform, or suppress output.
//! It owns the path tracker and the skip state; the rule index is borrowed
//! read-only for the duration of the run.
//!
//! Skip regions are bracketed by a single anchor path: entering an element
//! whose self-inclusive path carries a skip rule records that path, and
//! only the close event of that exact element clears it. The path stack
//! mirrors real document structure even while skipping, so nested entries
//! and exits inside the region stay correctly anchored.
//!
//! License: MIT OR APACHE 2.0

use std::io::Write;

use log::{debug, info};

use crate::escape::escape;
use crate::errors::ScrubError;
use crate::path::PathTracker;
use crate::rules::RuleIndex;

/// The prolog emitted once at document start.
pub const XML_DOCUMENT_START_DEFAULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Single-document, single-pass XML rewriter.
///
/// Created at the start of one conversion and discarded at the end; never
/// shared. All write failures abort immediately, as do structural errors
/// (an end event with no matching start). Neither is retried.
#[derive(Debug)]
pub struct StreamRewriter<'r, W: Write> {
    writer: W,
    document_start: &'static str,
    rules: &'r RuleIndex,
    path: PathTracker,
    /// Path at which skip mode was entered; skip mode is active iff set.
    skip_anchor: Option<String>,
}

impl<'r, W: Write> StreamRewriter<'r, W> {
    pub fn new(writer: W, rules: &'r RuleIndex) -> Self {
        Self::with_document_start(writer, rules, XML_DOCUMENT_START_DEFAULT)
    }

    pub fn with_document_start(writer: W, rules: &'r RuleIndex, document_start: &'static str) -> Self {
        Self {
            writer,
            document_start,
            rules,
            path: PathTracker::new(),
            skip_anchor: None,
        }
    }

    /// True while inside a skip region.
    pub fn is_skipping(&self) -> bool {
        self.skip_anchor.is_some()
    }

    /// Emits the fixed prolog line. Called exactly once, before any
    /// element event.
    pub fn start_document(&mut self) -> Result<(), ScrubError> {
        info!("START document transformation");
        self.writer.write_all(self.document_start.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Handles an element-start event.
    ///
    /// Rule matching is self-inclusive: the element's own name is part of
    /// the path being looked up, so a skip rule registered at `/a/b/c`
    /// fires when entering the element named `c` under `/a/b`. Attributes
    /// are emitted in the order supplied, with escaped values.
    pub fn start_element(
        &mut self,
        name: &str,
        attributes: &[(String, String)],
    ) -> Result<(), ScrubError> {
        let path = self.path.current_with(name);

        if self.is_skipping() || self.rules.is_skip(&path) {
            if self.skip_anchor.is_none() {
                debug!("Entering skip region at {path}");
                self.skip_anchor = Some(path);
            }
        } else {
            self.writer.write_all(b"<")?;
            self.writer.write_all(name.as_bytes())?;
            for (attr_name, attr_value) in attributes {
                self.writer.write_all(b" ")?;
                self.writer.write_all(attr_name.as_bytes())?;
                self.writer.write_all(b"=\"")?;
                self.writer.write_all(escape(attr_value).as_bytes())?;
                self.writer.write_all(b"\"")?;
            }
            self.writer.write_all(b">")?;
        }

        // The stack must reflect real document structure even while
        // skipping, so nested skip transitions stay anchored correctly.
        self.path.enter(name);
        Ok(())
    }

    /// Handles an element-end event.
    ///
    /// The closing tag of the element that anchors the skip region is
    /// itself never emitted; reaching it returns the rewriter to normal
    /// output. Equal-valued paths can only recur through this same element
    /// under strict stack discipline, so comparing paths by value is exact.
    pub fn end_element(&mut self, name: &str) -> Result<(), ScrubError> {
        if self.path.is_empty() {
            return Err(ScrubError::PathUnderflow(format!(
                "end of element '{name}' with no matching start"
            )));
        }

        let path = self.path.current();
        match &self.skip_anchor {
            Some(anchor) if *anchor == path => {
                debug!("Leaving skip region at {path}");
                self.skip_anchor = None;
            }
            Some(_) => {}
            None => {
                self.writer.write_all(b"</")?;
                self.writer.write_all(name.as_bytes())?;
                self.writer.write_all(b">")?;
            }
        }

        self.path.exit()
    }

    /// Handles a text or ignorable-whitespace chunk.
    ///
    /// The chunk is escaped first, then any content-replace rules for the
    /// current path run on the escaped form, in the order they were
    /// discovered in configuration. A wildcard rule replaces the whole
    /// chunk regardless of prior content, so it interacts order-sensitively
    /// with other rules at the same path.
    pub fn text(&mut self, content: &str) -> Result<(), ScrubError> {
        if self.is_skipping() {
            return Ok(());
        }

        let path = self.path.current();
        let mut output = escape(content);
        for rule in self.rules.replace_rules(&path) {
            debug!(
                "Applying rule [{} -> {}] to xpath {path}",
                rule.pattern(),
                rule.replacement()
            );
            output = rule.apply(&output).into_owned().into();
        }

        self.writer.write_all(output.as_bytes())?;
        Ok(())
    }

    /// Emits a processing instruction verbatim.
    ///
    /// PIs are treated as document-level constructs, not element-subtree
    /// ones, so they are emitted even inside a skip region.
    pub fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ScrubError> {
        write!(self.writer, "<?{target} {data}?>")?;
        Ok(())
    }

    /// Finishes the document, verifying every opened element was closed,
    /// and hands the writer back.
    pub fn finish(self) -> Result<W, ScrubError> {
        info!("END document transformation");
        if !self.path.is_empty() {
            return Err(ScrubError::UnbalancedDocument {
                open: self.path.depth(),
                path: self.path.current(),
            });
        }
        Ok(self.writer)
    }
}
