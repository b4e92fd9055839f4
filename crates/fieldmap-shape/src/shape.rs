//! Shapes and field sets
//!
//! Provides [`ShapeId`] and [`FieldSet`], the ordered, name-unique collection of
//! fields belonging to one shape.

use crate::field::FieldDescriptor;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Identifier of a named shape
///
/// Totally ordered by name so that every ordering derived from shapes is
/// reproducible.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    /// Create shape identifier
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Shape name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ShapeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ShapeId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Ordered fields of one shape
///
/// Field names are unique. Iteration follows declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSet {
    shape: ShapeId,
    fields: IndexMap<String, FieldDescriptor>,
}

impl FieldSet {
    /// Build a field set
    ///
    /// # Errors
    /// Returns [`ShapeError::DuplicateField`] if two fields share a name
    pub fn new(
        shape: impl Into<ShapeId>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self, ShapeError> {
        let shape = shape.into();
        let mut map = IndexMap::new();
        for field in fields {
            let name = field.name().to_string();
            if map.contains_key(&name) {
                return Err(ShapeError::DuplicateField { shape, field: name });
            }
            map.insert(name, field);
        }
        Ok(Self { shape, fields: map })
    }

    /// Empty field set
    #[inline]
    #[must_use]
    pub fn empty(shape: impl Into<ShapeId>) -> Self {
        Self {
            shape: shape.into(),
            fields: IndexMap::new(),
        }
    }

    /// Shape these fields belong to
    #[inline]
    #[must_use]
    pub fn shape(&self) -> &ShapeId {
        &self.shape
    }

    /// Look up a field by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Position of a field in declaration order
    #[inline]
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name)
    }

    /// Iterate in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if there are no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a FieldDescriptor;
    type IntoIter = indexmap::map::Values<'a, String, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.values()
    }
}

/// Structural violations in shape data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// Two fields of one shape share a name
    #[error("shape {shape} declares field '{field}' more than once")]
    DuplicateField {
        /// Offending shape
        shape: ShapeId,
        /// Repeated field name
        field: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::StorageWidth;

    fn id() -> FieldDescriptor {
        FieldDescriptor::value("Id", "int", StorageWidth::Word)
    }

    #[test]
    fn field_set_preserves_order() {
        let name = FieldDescriptor::reference("Name", "string");
        let set = FieldSet::new("Order", [name, id()]).unwrap();

        let names: Vec<_> = set.iter().map(FieldDescriptor::name).collect();
        assert_eq!(names, ["Name", "Id"]);
        assert_eq!(set.position("Id"), Some(1));
    }

    #[test]
    fn field_set_rejects_duplicates() {
        let err = FieldSet::new("Order", [id(), id()]).unwrap_err();
        assert_eq!(
            err,
            ShapeError::DuplicateField {
                shape: ShapeId::new("Order"),
                field: "Id".to_string(),
            }
        );
        assert!(err.to_string().contains("'Id'"));
    }

    #[test]
    fn field_set_lookup() {
        let set = FieldSet::new("Order", [id()]).unwrap();
        assert!(set.get("Id").is_some());
        assert!(set.get("id").is_none());
        assert_eq!(set.len(), 1);
        assert!(FieldSet::empty("X").is_empty());
    }

    #[test]
    fn shape_ids_order_by_name() {
        let mut ids = vec![ShapeId::new("b"), ShapeId::new("a"), ShapeId::new("B")];
        ids.sort();
        let names: Vec<_> = ids.iter().map(ShapeId::as_str).collect();
        assert_eq!(names, ["B", "a", "b"]);
    }
}
