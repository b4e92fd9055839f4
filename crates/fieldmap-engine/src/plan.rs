//! Resolution plans
//!
//! A [`ResolutionPlan`] says, for every destination field of one mapping, how
//! it gets its value. Plans are immutable once built and carry the
//! fingerprint of everything they were derived from.

use fieldmap_registry::{Diagnostic, MappingKey};
use fieldmap_shape::{FieldDescriptor, Fingerprint, StorageClass, StorageWidth};
use serde::Serialize;

/// Absence handling on a nested assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullGuard {
    /// No check
    None,

    /// Absent source yields absent destination
    PropagateAbsence,

    /// Absent source leaves the destination at its default
    SkipWhenAbsent,
}

impl NullGuard {
    /// Guard for a nested assignment between two storage classes
    #[must_use]
    pub const fn between(source: StorageClass, dest: StorageClass) -> Self {
        match (source, dest) {
            (StorageClass::Reference, StorageClass::Reference) => Self::PropagateAbsence,
            (StorageClass::Reference, StorageClass::Value) => Self::SkipWhenAbsent,
            (StorageClass::Value, _) => Self::None,
        }
    }
}

/// How collection elements are copied
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPath {
    /// Through the generic, type-erased path
    Boxed,

    /// Through the registered mapping between element shapes
    PerElement(MappingKey),
}

/// How one destination field gets its value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    /// Copy the named source field as is
    Direct(String),

    /// Map the named source field through another registered mapping
    Nested {
        /// Source field
        source: String,
        /// Mapping applied to it
        key: MappingKey,
        /// Absence handling
        null_guard: NullGuard,
    },

    /// Assign constant text verbatim
    Constant(String),

    /// Evaluate the rewritten expression text
    Expression(String),

    /// Copy a collection element by element
    Collection {
        /// Source field
        source: String,
        /// Element copy path
        path: CollectionPath,
    },

    /// Leave the field alone
    Ignored,

    /// No way to fill the field
    Unresolved,
}

impl ResolutionKind {
    /// Check if this produces an emission instruction
    #[inline]
    #[must_use]
    pub fn is_emitted(&self) -> bool {
        !matches!(self, Self::Ignored | Self::Unresolved)
    }
}

/// A destination field and its resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedField {
    /// Destination field
    pub descriptor: FieldDescriptor,

    /// How it is filled
    pub kind: ResolutionKind,
}

impl PlannedField {
    /// Destination field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    // Group first, then width inside the value-class direct group.
    fn emission_rank(&self) -> Option<(u8, u8)> {
        let group = match &self.kind {
            ResolutionKind::Direct(_) if self.descriptor.storage().is_value() => {
                return Some((0, width_rank(self.descriptor.width())));
            }
            ResolutionKind::Constant(_) => 1,
            ResolutionKind::Expression(_) => 2,
            ResolutionKind::Direct(_) => 3,
            ResolutionKind::Nested { .. } => 4,
            ResolutionKind::Collection { .. } => 5,
            ResolutionKind::Ignored | ResolutionKind::Unresolved => return None,
        };
        Some((group, 0))
    }
}

// Unknown widths sort after the widest known one.
fn width_rank(width: Option<StorageWidth>) -> u8 {
    width.map_or(u8::MAX, |w| w as u8)
}

/// Resolution plan for one mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionPlan {
    key: MappingKey,
    fields: Vec<PlannedField>,
    has_missing_source: bool,
    has_type_error: bool,
    diagnostics: Vec<Diagnostic>,
    fingerprint: Fingerprint,
}

impl ResolutionPlan {
    pub(crate) fn new(
        key: MappingKey,
        fields: Vec<PlannedField>,
        mut diagnostics: Vec<Diagnostic>,
        has_missing_source: bool,
        has_type_error: bool,
        fingerprint: Fingerprint,
    ) -> Self {
        diagnostics.sort();
        Self {
            key,
            fields,
            has_missing_source,
            has_type_error,
            diagnostics,
            fingerprint,
        }
    }

    /// Mapping this plan belongs to
    #[inline]
    #[must_use]
    pub fn key(&self) -> &MappingKey {
        &self.key
    }

    /// Every destination field, in destination order
    ///
    /// See [`emission_order`](Self::emission_order) for the order copies
    /// are emitted in.
    #[inline]
    #[must_use]
    pub fn fields_by_destination(&self) -> &[PlannedField] {
        &self.fields
    }

    /// Field by destination name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&PlannedField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Fields carrying an emission instruction, in emission order
    ///
    /// Value-class direct copies by ascending width, then constants,
    /// expressions, reference-class direct copies, nested mappings and
    /// collections. Ties keep destination order.
    #[must_use]
    pub fn emission_order(&self) -> Vec<&PlannedField> {
        let mut ranked: Vec<_> = self
            .fields
            .iter()
            .filter_map(|f| f.emission_rank().map(|rank| (rank, f)))
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().map(|(_, f)| f).collect()
    }

    /// A non-defaultable destination field has no source
    #[inline]
    #[must_use]
    pub fn has_missing_source(&self) -> bool {
        self.has_missing_source
    }

    /// A field was refused for type reasons
    #[inline]
    #[must_use]
    pub fn has_type_error(&self) -> bool {
        self.has_type_error
    }

    /// Diagnostics raised while resolving, sorted
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Digest of the plan's inputs
    #[inline]
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }
}
