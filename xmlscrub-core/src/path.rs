//! path.rs - Absolute-path tracking for the streaming rewriter.
//!
//! A `PathTracker` maintains the ordered stack of qualified element names
//! that are currently open, and renders it as a root-relative path string
//! (`/a/b/c`) on demand. One tracker is owned by one rewriter for the
//! duration of one document; it is never shared.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::ScrubError;

/// Stack of open element names, rendered to `/a/b/c` on demand.
///
/// Qualified names are stored verbatim as the tokenizer supplies them,
/// namespace prefixes included. Two paths are equal iff their rendered
/// strings are equal.
#[derive(Debug, Default)]
pub struct PathTracker {
    stack: Vec<String>,
}

impl PathTracker {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Pushes `name` onto the open-element stack. The name contents are
    /// not validated; the tokenizer owns well-formedness of names.
    pub fn enter(&mut self, name: &str) {
        self.stack.push(name.to_string());
    }

    /// Pops the most recently entered element.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubError::PathUnderflow`] if the stack is already empty,
    /// which means the event stream produced an end-element with no matching
    /// start. That is a malformed stream and fatal for the current document.
    pub fn exit(&mut self) -> Result<(), ScrubError> {
        match self.stack.pop() {
            Some(_) => Ok(()),
            None => Err(ScrubError::PathUnderflow(String::from(
                "impossible to exit a node, the path stack was empty",
            ))),
        }
    }

    /// Renders the current absolute path, one `/name` segment per open
    /// element. O(depth) per call; depth is bounded by document nesting.
    pub fn current(&self) -> String {
        let mut path = String::new();
        for node in &self.stack {
            path.push('/');
            path.push_str(node);
        }
        path
    }

    /// Renders the path the document would have after entering `name`,
    /// without mutating the stack. Used for self-inclusive rule matching
    /// at element-start time.
    pub fn current_with(&self, name: &str) -> String {
        let mut path = self.current();
        path.push('/');
        path.push_str(name);
        path
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_level_with_leading_slash() {
        let mut tracker = PathTracker::new();
        tracker.enter("rootNode");
        assert_eq!(tracker.current(), "/rootNode");

        tracker.enter("firstChild");
        tracker.enter("secondChild");
        assert_eq!(tracker.current(), "/rootNode/firstChild/secondChild");

        tracker.exit().unwrap();
        assert_eq!(tracker.current(), "/rootNode/firstChild");

        tracker.exit().unwrap();
        assert_eq!(tracker.current(), "/rootNode");
    }

    #[test]
    fn enter_exit_round_trip_matches_single_enter() {
        let mut a = PathTracker::new();
        a.enter("a");
        a.enter("b");
        a.exit().unwrap();

        let mut b = PathTracker::new();
        b.enter("a");

        assert_eq!(a.current(), b.current());
    }

    #[test]
    fn exit_on_empty_stack_is_a_structural_error() {
        let mut tracker = PathTracker::new();
        let err = tracker.exit().unwrap_err();
        assert!(matches!(err, ScrubError::PathUnderflow(_)));
    }

    #[test]
    fn current_with_previews_self_inclusive_path() {
        let mut tracker = PathTracker::new();
        tracker.enter("a");
        tracker.enter("b");
        assert_eq!(tracker.current_with("c"), "/a/b/c");
        // Preview must not mutate the stack.
        assert_eq!(tracker.current(), "/a/b");
    }

    #[test]
    fn empty_tracker_renders_empty_path() {
        let tracker = PathTracker::new();
        assert_eq!(tracker.current(), "");
        assert!(tracker.is_empty());
    }

    #[test]
    fn namespace_prefixes_are_preserved_verbatim() {
        let mut tracker = PathTracker::new();
        tracker.enter("soap:Envelope");
        tracker.enter("soap:Body");
        assert_eq!(tracker.current(), "/soap:Envelope/soap:Body");
    }
}
