//! Fixed table of shapes

use crate::catalog::ShapeIntrospector;
use crate::shape::{FieldSet, ShapeId};
use std::collections::BTreeMap;

/// Introspector over a fixed set of declared shapes
///
/// Shapes that were never declared introspect as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeTable {
    shapes: BTreeMap<ShapeId, FieldSet>,
}

impl ShapeTable {
    /// Empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a shape added (replacing one with the same id)
    #[must_use]
    pub fn with_shape(mut self, fields: FieldSet) -> Self {
        self.insert(fields);
        self
    }

    /// Add a shape, returning the one it replaced
    pub fn insert(&mut self, fields: FieldSet) -> Option<FieldSet> {
        self.shapes.insert(fields.shape().clone(), fields)
    }

    /// Declared fields of a shape
    #[inline]
    #[must_use]
    pub fn get(&self, shape: &ShapeId) -> Option<&FieldSet> {
        self.shapes.get(shape)
    }

    /// Declared shapes in id order
    pub fn shapes(&self) -> impl Iterator<Item = &ShapeId> {
        self.shapes.keys()
    }

    /// Number of declared shapes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if no shape is declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl ShapeIntrospector for ShapeTable {
    fn introspect(&self, shape: &ShapeId) -> FieldSet {
        self.shapes.get(shape).cloned().unwrap_or_else(|| {
            tracing::debug!(%shape, "undeclared shape introspected as empty");
            FieldSet::empty(shape.clone())
        })
    }
}

impl FromIterator<FieldSet> for ShapeTable {
    fn from_iter<T: IntoIterator<Item = FieldSet>>(iter: T) -> Self {
        let mut table = Self::new();
        for fields in iter {
            table.insert(fields);
        }
        table
    }
}
