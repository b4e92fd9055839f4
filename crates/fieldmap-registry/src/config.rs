//! Per-mapping fluent configuration

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// What the configuration says about one destination field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDirective<'a> {
    /// Leave the field alone
    Ignore,

    /// Read from a differently named source field
    Rename(&'a str),

    /// Compute from a custom expression (raw text)
    Expression(&'a str),

    /// Assign constant text verbatim
    Constant(&'a str),
}

/// Configuration of one mapping
///
/// A destination field has at most one directive. Each setter removes the
/// field from the other three tables, so the last call for a field wins.
/// Tables are ordered so the configuration serializes (and fingerprints)
/// identically however it was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FluentConfig {
    reverse: bool,
    ignore_unmatched: bool,
    ignored: BTreeSet<String>,
    renames: BTreeMap<String, String>,
    expressions: BTreeMap<String, String>,
    constants: BTreeMap<String, String>,
}

impl FluentConfig {
    /// Empty configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also synthesize the reverse mapping
    #[inline]
    #[must_use]
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Treat destination fields without a source as ignored
    #[inline]
    #[must_use]
    pub fn ignore_unmatched(mut self, ignore: bool) -> Self {
        self.ignore_unmatched = ignore;
        self
    }

    /// Ignore a destination field
    #[must_use]
    pub fn ignore(mut self, dest: impl Into<String>) -> Self {
        let dest = dest.into();
        self.clear(&dest);
        self.ignored.insert(dest);
        self
    }

    /// Read a destination field from a differently named source field
    #[must_use]
    pub fn rename(mut self, dest: impl Into<String>, source: impl Into<String>) -> Self {
        let dest = dest.into();
        self.clear(&dest);
        self.renames.insert(dest, source.into());
        self
    }

    /// Compute a destination field from an expression
    #[must_use]
    pub fn expression(mut self, dest: impl Into<String>, text: impl Into<String>) -> Self {
        let dest = dest.into();
        self.clear(&dest);
        self.expressions.insert(dest, text.into());
        self
    }

    /// Assign constant text to a destination field
    #[must_use]
    pub fn constant(mut self, dest: impl Into<String>, text: impl Into<String>) -> Self {
        let dest = dest.into();
        self.clear(&dest);
        self.constants.insert(dest, text.into());
        self
    }

    fn clear(&mut self, dest: &str) {
        self.ignored.remove(dest);
        self.renames.remove(dest);
        self.expressions.remove(dest);
        self.constants.remove(dest);
    }

    /// Whether the reverse mapping is requested
    #[inline]
    #[must_use]
    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    /// Whether unmatched destination fields are ignored
    #[inline]
    #[must_use]
    pub fn ignores_unmatched(&self) -> bool {
        self.ignore_unmatched
    }

    /// Directive for a destination field, if any
    #[must_use]
    pub fn directive(&self, dest: &str) -> Option<FieldDirective<'_>> {
        if self.ignored.contains(dest) {
            return Some(FieldDirective::Ignore);
        }
        if let Some(text) = self.constants.get(dest) {
            return Some(FieldDirective::Constant(text));
        }
        if let Some(text) = self.expressions.get(dest) {
            return Some(FieldDirective::Expression(text));
        }
        self.renames
            .get(dest)
            .map(|source| FieldDirective::Rename(source))
    }

    /// Check if nothing is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.reverse
            && !self.ignore_unmatched
            && self.ignored.is_empty()
            && self.renames.is_empty()
            && self.expressions.is_empty()
            && self.constants.is_empty()
    }

    /// Destination fields with a directive, in name order
    pub fn configured_fields(&self) -> impl Iterator<Item = &str> {
        let mut names: BTreeSet<&str> = self.ignored.iter().map(String::as_str).collect();
        names.extend(self.renames.keys().map(String::as_str));
        names.extend(self.expressions.keys().map(String::as_str));
        names.extend(self.constants.keys().map(String::as_str));
        names.into_iter()
    }
}
