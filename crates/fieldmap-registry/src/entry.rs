//! Registry entries

use crate::config::FluentConfig;
use crate::key::{MappingKey, Provenance};
use serde::Serialize;
use std::cmp::Ordering;

/// How an entry came to exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    /// Registered by configuration
    Explicit(Provenance),

    /// Reverse of an explicit entry that asked for one
    Synthesized {
        /// Key of the entry this one was derived from
        forward: MappingKey,
    },
}

/// One mapping and its configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    key: MappingKey,
    config: FluentConfig,
    origin: EntryOrigin,
}

impl MappingEntry {
    /// Explicitly configured entry
    #[must_use]
    pub fn explicit(key: MappingKey, config: FluentConfig, provenance: Provenance) -> Self {
        Self {
            key,
            config,
            origin: EntryOrigin::Explicit(provenance),
        }
    }

    /// Reverse of `forward` with default configuration
    #[must_use]
    pub fn reverse_of(forward: &Self) -> Self {
        Self {
            key: forward.key.inverse(),
            config: FluentConfig::default(),
            origin: EntryOrigin::Synthesized {
                forward: forward.key.clone(),
            },
        }
    }

    /// Mapping key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &MappingKey {
        &self.key
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &FluentConfig {
        &self.config
    }

    /// Origin
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &EntryOrigin {
        &self.origin
    }

    /// Provenance, for explicit entries
    #[inline]
    #[must_use]
    pub fn provenance(&self) -> Option<&Provenance> {
        match &self.origin {
            EntryOrigin::Explicit(p) => Some(p),
            EntryOrigin::Synthesized { .. } => None,
        }
    }

    /// Check if configured explicitly
    #[inline]
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        matches!(self.origin, EntryOrigin::Explicit(_))
    }

    /// Precedence between two entries for the same key
    ///
    /// `Less` means `self` wins. Explicit entries beat synthesized ones, smaller
    /// provenance beats larger, and identical provenance falls back to the
    /// serialized configuration so the outcome never depends on arrival.
    pub(crate) fn precedence(&self, other: &Self) -> Ordering {
        match (&self.origin, &other.origin) {
            (EntryOrigin::Explicit(a), EntryOrigin::Explicit(b)) => {
                a.cmp(b).then_with(|| config_text(&self.config).cmp(&config_text(&other.config)))
            }
            (EntryOrigin::Explicit(_), EntryOrigin::Synthesized { .. }) => Ordering::Less,
            (EntryOrigin::Synthesized { .. }, EntryOrigin::Explicit(_)) => Ordering::Greater,
            (EntryOrigin::Synthesized { forward: a }, EntryOrigin::Synthesized { forward: b }) => {
                a.cmp(b)
            }
        }
    }

    /// Label used in diagnostics
    pub(crate) fn label(&self) -> String {
        match &self.origin {
            EntryOrigin::Explicit(p) => p.to_string(),
            EntryOrigin::Synthesized { forward } => format!("reverse of {forward}"),
        }
    }
}

fn config_text(config: &FluentConfig) -> String {
    serde_json::to_string(config).unwrap_or_default()
}
