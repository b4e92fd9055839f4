//! Mapping registry
//!
//! Concurrent registration, deterministic result. Conflicts for a key are
//! decided by [`MappingEntry`] precedence rather than by which registration
//! arrived first, and reverse mappings are only derived when a snapshot is
//! taken, from the entries that survived.

use crate::diagnostic::Diagnostic;
use crate::entry::MappingEntry;
use crate::key::MappingKey;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fieldmap_shape::ShapeId;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Outcome of [`MappingRegistry::add`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// No entry existed for the key
    Accepted,

    /// Entry replaced an existing, lower-precedence one
    Displaced {
        /// Label of the discarded entry
        discarded: String,
    },

    /// Existing entry has precedence; this one was discarded
    Rejected {
        /// Label of the kept entry
        kept: String,
    },
}

impl Registration {
    /// Check if the added entry is now registered
    #[inline]
    #[must_use]
    pub fn is_registered(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// Registry of mapping entries keyed by (source, destination)
#[derive(Debug, Default)]
pub struct MappingRegistry {
    entries: DashMap<MappingKey, MappingEntry>,
    duplicates: Mutex<Vec<Diagnostic>>,
}

impl MappingRegistry {
    /// Create empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry
    ///
    /// Safe to call from many threads. When an entry for the key exists the
    /// higher-precedence one is kept and the other reported as a duplicate,
    /// so any interleaving of the same set of calls ends in the same state.
    pub fn add(&self, entry: MappingEntry) -> Registration {
        let key = entry.key().clone();
        let (outcome, loser) = match self.entries.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
                (Registration::Accepted, None)
            }
            Entry::Occupied(mut slot) => {
                if entry.precedence(slot.get()) == Ordering::Less {
                    let discarded = slot.insert(entry).label();
                    let outcome = Registration::Displaced {
                        discarded: discarded.clone(),
                    };
                    (outcome, Some(discarded))
                } else {
                    let outcome = Registration::Rejected {
                        kept: slot.get().label(),
                    };
                    (outcome, Some(entry.label()))
                }
            }
        };

        if let Some(loser) = loser {
            tracing::warn!(%key, discarded = %loser, "duplicate mapping registration");
            self.duplicates.lock().push(Diagnostic::duplicate(key, &loser));
        } else {
            tracing::debug!(%key, "mapping registered");
        }
        outcome
    }

    /// Entry for a key, explicit entries only
    #[must_use]
    pub fn get(&self, key: &MappingKey) -> Option<MappingEntry> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    /// Number of explicit entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the registry, deriving reverse entries
    ///
    /// For every surviving entry that requests a reverse, the inverse key gets
    /// a default-configured entry unless an explicit entry already holds it,
    /// which is reported as a reverse conflict. Self-mappings derive nothing.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut entries: BTreeMap<MappingKey, MappingEntry> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let mut diagnostics = self.duplicates.lock().clone();

        let forwards: Vec<MappingEntry> = entries
            .values()
            .filter(|e| e.config().is_reverse() && !e.key().is_self_mapping())
            .cloned()
            .collect();
        for forward in &forwards {
            let inverse = forward.key().inverse();
            if entries.contains_key(&inverse) {
                tracing::info!(
                    key = %inverse,
                    forward = %forward.key(),
                    "reverse mapping conflicts with explicit entry"
                );
                diagnostics.push(Diagnostic::reverse_conflict(inverse, forward.key()));
            } else {
                entries.insert(inverse, MappingEntry::reverse_of(forward));
            }
        }

        diagnostics.sort();
        RegistrySnapshot {
            entries,
            diagnostics,
        }
    }

    /// All entries, reverses included, sorted by key
    #[must_use]
    pub fn materialize(&self) -> Vec<MappingEntry> {
        self.snapshot().materialize()
    }

    /// Registration and reverse-derivation diagnostics, sorted
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.snapshot().diagnostics
    }
}

/// Frozen, ordered view of a registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    entries: BTreeMap<MappingKey, MappingEntry>,
    diagnostics: Vec<Diagnostic>,
}

impl RegistrySnapshot {
    /// Entry for a key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &MappingKey) -> Option<&MappingEntry> {
        self.entries.get(key)
    }

    /// Check if a mapping from `source` to `destination` exists
    #[must_use]
    pub fn contains(&self, source: &ShapeId, destination: &ShapeId) -> bool {
        self.entries
            .contains_key(&MappingKey::new(source.clone(), destination.clone()))
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.values()
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &MappingKey> {
        self.entries.keys()
    }

    /// Number of entries, reverses included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned entries sorted by key
    #[must_use]
    pub fn materialize(&self) -> Vec<MappingEntry> {
        self.entries.values().cloned().collect()
    }

    /// Diagnostics, sorted
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl<'a> IntoIterator for &'a RegistrySnapshot {
    type Item = &'a MappingEntry;
    type IntoIter = std::collections::btree_map::Values<'a, MappingKey, MappingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
