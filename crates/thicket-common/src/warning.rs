//! Deduplicated warnings.
//!
//! Malformed markup tends to repeat the same mistake many times in one
//! document. A [`Warnings`] set reports each distinct warning once through
//! [`log::warn!`], so a page full of stray close tags does not flood the log.
//! The set belongs to one build and is dropped with it.

use std::collections::HashSet;

/// Warnings already emitted during one build.
#[derive(Debug, Default)]
pub struct Warnings {
    seen: HashSet<String>,
}

impl Warnings {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a warning once per unique `(component, message)` pair.
    ///
    /// Returns `true` if the warning was emitted, `false` if this set has
    /// already seen it.
    ///
    /// # Example
    /// ```
    /// use thicket_common::warning::Warnings;
    ///
    /// let mut warnings = Warnings::new();
    /// assert!(warnings.warn_once("Tree", "ignoring </p> with no open element"));
    /// assert!(!warnings.warn_once("Tree", "ignoring </p> with no open element"));
    /// ```
    pub fn warn_once(&mut self, component: &str, message: &str) -> bool {
        let is_new = self.seen.insert(format!("[{component}] {message}"));
        if is_new {
            log::warn!(target: "thicket", "[{component}] {message}");
        }
        is_new
    }

    /// Number of distinct warnings emitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns true if nothing has been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates() {
        let mut warnings = Warnings::new();
        assert!(warnings.warn_once("Test", "message"));
        assert!(!warnings.warn_once("Test", "message"));
        assert!(warnings.warn_once("Other", "message"));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_sets_are_independent() {
        let mut first = Warnings::new();
        assert!(first.warn_once("Doctype", "bad"));

        let mut second = Warnings::new();
        assert!(second.is_empty());
        assert!(second.warn_once("Doctype", "bad"));
    }
}
