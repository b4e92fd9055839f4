//! Mapping identity and provenance

use fieldmap_shape::ShapeId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Identity of a mapping: source shape to destination shape
///
/// Direction matters, `A -> B` and `B -> A` are different keys. Ordered by
/// source, then destination.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MappingKey {
    /// Shape values are read from
    pub source: ShapeId,

    /// Shape values are written to
    pub destination: ShapeId,
}

impl MappingKey {
    /// Create key
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<ShapeId>, destination: impl Into<ShapeId>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Key of the opposite direction
    #[inline]
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            source: self.destination.clone(),
            destination: self.source.clone(),
        }
    }

    /// Check if source and destination are the same shape
    #[inline]
    #[must_use]
    pub fn is_self_mapping(&self) -> bool {
        self.source == self.destination
    }
}

impl Display for MappingKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// Identifier of a configuration source (file, class, module)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigOrigin(String);

impl ConfigOrigin {
    /// Create origin identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Origin identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ConfigOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an entry was declared
///
/// Totally ordered: origin identifier first, then position within that
/// origin. The smaller provenance is the "first" registration, whatever the
/// order entries actually arrive in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Provenance {
    /// Configuration source
    pub origin: ConfigOrigin,

    /// Position within the source
    pub ordinal: u32,
}

impl Provenance {
    /// Create provenance
    #[inline]
    #[must_use]
    pub fn new(origin: impl Into<String>, ordinal: u32) -> Self {
        Self {
            origin: ConfigOrigin::new(origin),
            ordinal,
        }
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.origin, self.ordinal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_direction_matters() {
        let ab = MappingKey::new("A", "B");
        assert_ne!(ab, ab.inverse());
        assert_eq!(ab, ab.inverse().inverse());
        assert_eq!(ab.to_string(), "A -> B");
    }

    #[test]
    fn key_orders_by_source_then_destination() {
        let mut keys = vec![
            MappingKey::new("B", "A"),
            MappingKey::new("A", "C"),
            MappingKey::new("A", "B"),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                MappingKey::new("A", "B"),
                MappingKey::new("A", "C"),
                MappingKey::new("B", "A"),
            ]
        );
    }

    #[test]
    fn provenance_orders_origin_first() {
        assert!(Provenance::new("a.yaml", 9) < Provenance::new("b.yaml", 0));
        assert!(Provenance::new("a.yaml", 0) < Provenance::new("a.yaml", 1));
        assert_eq!(Provenance::new("a.yaml", 3).to_string(), "a.yaml#3");
    }

    #[test]
    fn self_mapping() {
        assert!(MappingKey::new("A", "A").is_self_mapping());
        assert!(!MappingKey::new("A", "B").is_self_mapping());
    }
}
