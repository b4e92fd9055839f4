//! Diagnostics
//!
//! One taxonomy shared by registration and plan compilation. Diagnostics are
//! plain values; where they go is decided by a [`DiagnosticSink`].

use crate::key::MappingKey;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational
    Info,

    /// Plan still usable
    Warning,

    /// Plan (or configuration) is defective
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Destination field has no readable source
    MissingSource,

    /// Source and destination types are incompatible
    TypeMismatch,

    /// Element-wise boxing would be unsound
    UnsoundBoxing,

    /// Second registration for an existing key discarded
    DuplicateMapping,

    /// Reverse mapping not synthesized; an explicit entry exists
    ReverseConflict,

    /// Expression could not be rewritten safely
    MalformedExpression,
}

impl DiagnosticKind {
    /// Stable code used in logs and CLI output
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingSource => "missing-source",
            Self::TypeMismatch => "type-mismatch",
            Self::UnsoundBoxing => "unsound-boxing",
            Self::DuplicateMapping => "duplicate-mapping",
            Self::ReverseConflict => "reverse-conflict",
            Self::MalformedExpression => "malformed-expression",
        }
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A reported problem
///
/// Ordered by mapping key, field, kind, severity and message so a sorted list
/// is identical across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Diagnostic {
    key: MappingKey,
    field: Option<String>,
    kind: DiagnosticKind,
    severity: Severity,
    message: String,
}

impl Diagnostic {
    /// Create diagnostic for a mapping
    #[must_use]
    pub fn new(
        kind: DiagnosticKind,
        severity: Severity,
        key: MappingKey,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key,
            field: None,
            kind,
            severity,
            message: message.into(),
        }
    }

    /// Attach destination field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// A later-ordered registration for `key` was discarded
    #[must_use]
    pub fn duplicate(key: MappingKey, discarded: &impl Display) -> Self {
        let message = format!("duplicate mapping {key} from {discarded} discarded");
        Self::new(DiagnosticKind::DuplicateMapping, Severity::Warning, key, message)
    }

    /// Reverse of `forward` collides with an explicit entry for `key`
    #[must_use]
    pub fn reverse_conflict(key: MappingKey, forward: &MappingKey) -> Self {
        let message = format!("reverse of {forward} not synthesized, explicit {key} kept");
        Self::new(DiagnosticKind::ReverseConflict, Severity::Info, key, message)
    }

    /// Kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// Severity
    #[inline]
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Mapping the diagnostic belongs to
    #[inline]
    #[must_use]
    pub fn key(&self) -> &MappingKey {
        &self.key
    }

    /// Destination field, if field-specific
    #[inline]
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Human-readable message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if severity is error
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {}", self.severity, self.kind, self.key)?;
        if let Some(field) = &self.field {
            write!(f, " .{field}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Receives diagnostics as they are produced
pub trait DiagnosticSink: Send + Sync {
    /// Accept one diagnostic
    fn report(&self, diagnostic: &Diagnostic);
}

/// Emits diagnostics as tracing events, level chosen by severity
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, d: &Diagnostic) {
        let key = d.key();
        match d.severity() {
            Severity::Info => {
                tracing::info!(code = d.kind().code(), %key, field = d.field(), "{}", d.message());
            }
            Severity::Warning => {
                tracing::warn!(code = d.kind().code(), %key, field = d.field(), "{}", d.message());
            }
            Severity::Error => {
                tracing::error!(code = d.kind().code(), %key, field = d.field(), "{}", d.message());
            }
        }
    }
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    collected: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Create empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything collected so far, sorted
    #[must_use]
    pub fn drain(&self) -> Vec<Diagnostic> {
        let mut out = std::mem::take(&mut *self.collected.lock());
        out.sort();
        out
    }

    /// Number collected so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.collected.lock().len()
    }

    /// Check if nothing was collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collected.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.collected.lock().push(diagnostic.clone());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn report(&self, diagnostic: &Diagnostic) {
        (**self).report(diagnostic);
    }
}
