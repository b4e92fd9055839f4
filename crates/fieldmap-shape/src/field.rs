//! Field descriptors
//!
//! Provides [`FieldDescriptor`], the immutable description of one field of a
//! shape, together with the storage vocabulary it is expressed in.

use crate::shape::ShapeId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// How a field's value is held
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageClass {
    /// Copied by value, always present
    Value,

    /// Shared by reference, may be absent
    Reference,
}

impl StorageClass {
    /// Check for value semantics
    #[inline]
    #[must_use]
    pub const fn is_value(self) -> bool {
        matches!(self, Self::Value)
    }

    /// Check for reference semantics
    #[inline]
    #[must_use]
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::Reference)
    }
}

/// Storage footprint of a value-class field
///
/// Declaration order is the emission order: smallest footprint first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageWidth {
    /// Boolean / byte class
    Byte,

    /// Short / char class
    Short,

    /// 4-byte class
    Word,

    /// 8-byte class
    DoubleWord,

    /// Decimal and other large value types
    Large,
}

/// Nominal type identity of a field
///
/// Opaque: the engine compares identities for equality and never looks
/// inside. The identity also names the shape describing that type, which is
/// what nested mapping lookups use.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeIdentity(String);

impl TypeIdentity {
    /// Create identity from a type name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Type name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shape describing values of this type
    #[inline]
    #[must_use]
    pub fn shape(&self) -> ShapeId {
        ShapeId::new(self.0.clone())
    }
}

impl Display for TypeIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Element type of a collection-typed field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementType {
    /// Element type identity
    pub ty: TypeIdentity,

    /// Element storage class
    pub storage: StorageClass,
}

impl ElementType {
    /// Value-class element
    #[inline]
    #[must_use]
    pub fn value(ty: impl Into<String>) -> Self {
        Self {
            ty: TypeIdentity::new(ty),
            storage: StorageClass::Value,
        }
    }

    /// Reference-class element
    #[inline]
    #[must_use]
    pub fn reference(ty: impl Into<String>) -> Self {
        Self {
            ty: TypeIdentity::new(ty),
            storage: StorageClass::Reference,
        }
    }
}

/// One field of a shape
///
/// Everything the host language expresses through attributes (ignore markers,
/// alternate source names) is carried as plain fields, populated once by the
/// introspector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldDescriptor {
    name: String,
    storage: StorageClass,
    ty: TypeIdentity,
    width: Option<StorageWidth>,
    readable: bool,
    writable: bool,
    ignored: bool,
    source_name: Option<String>,
    defaultable: bool,
    element: Option<ElementType>,
}

impl FieldDescriptor {
    /// Value-class field of the given width
    #[must_use]
    pub fn value(name: impl Into<String>, ty: impl Into<String>, width: StorageWidth) -> Self {
        Self {
            name: name.into(),
            storage: StorageClass::Value,
            ty: TypeIdentity::new(ty),
            width: Some(width),
            readable: true,
            writable: true,
            ignored: false,
            source_name: None,
            defaultable: true,
            element: None,
        }
    }

    /// Non-nullable reference-class field
    #[must_use]
    pub fn reference(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage: StorageClass::Reference,
            ty: TypeIdentity::new(ty),
            width: None,
            readable: true,
            writable: true,
            ignored: false,
            source_name: None,
            defaultable: false,
            element: None,
        }
    }

    /// Mark a reference as nullable (absent is a safe default)
    #[inline]
    #[must_use]
    pub fn nullable(mut self) -> Self {
        if self.storage.is_reference() {
            self.defaultable = true;
        }
        self
    }

    /// Override the defaultable flag
    #[inline]
    #[must_use]
    pub fn with_defaultable(mut self, defaultable: bool) -> Self {
        self.defaultable = defaultable;
        self
    }

    /// With readable flag
    #[inline]
    #[must_use]
    pub fn with_readable(mut self, readable: bool) -> Self {
        self.readable = readable;
        self
    }

    /// With writable flag
    #[inline]
    #[must_use]
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Mark as ignored by shape metadata
    #[inline]
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Declare an alternate source field name
    #[inline]
    #[must_use]
    pub fn with_source_name(mut self, source: impl Into<String>) -> Self {
        self.source_name = Some(source.into());
        self
    }

    /// Declare the field a collection of `element`
    #[inline]
    #[must_use]
    pub fn with_element(mut self, element: ElementType) -> Self {
        self.element = Some(element);
        self
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage class
    #[inline]
    #[must_use]
    pub fn storage(&self) -> StorageClass {
        self.storage
    }

    /// Type identity
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &TypeIdentity {
        &self.ty
    }

    /// Footprint (value class only)
    #[inline]
    #[must_use]
    pub fn width(&self) -> Option<StorageWidth> {
        self.width
    }

    /// Whether the field can be read
    #[inline]
    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.readable
    }

    /// Whether the field can be assigned
    #[inline]
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Whether shape metadata marks the field ignored
    #[inline]
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Declared alternate source name
    #[inline]
    #[must_use]
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Whether the storage has a safe zero value
    #[inline]
    #[must_use]
    pub fn is_defaultable(&self) -> bool {
        self.defaultable
    }

    /// Collection element, if the field is a collection
    #[inline]
    #[must_use]
    pub fn element(&self) -> Option<&ElementType> {
        self.element.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_field_defaults() {
        let f = FieldDescriptor::value("Id", "int", StorageWidth::Word);
        assert_eq!(f.storage(), StorageClass::Value);
        assert_eq!(f.width(), Some(StorageWidth::Word));
        assert!(f.is_readable() && f.is_writable());
        assert!(f.is_defaultable());
        assert!(!f.is_ignored());
    }

    #[test]
    fn reference_field_not_defaultable_until_nullable() {
        let f = FieldDescriptor::reference("Name", "string");
        assert!(!f.is_defaultable());
        assert!(f.width().is_none());
        assert!(f.nullable().is_defaultable());
    }

    #[test]
    fn nullable_is_noop_for_values() {
        let f = FieldDescriptor::value("Flag", "bool", StorageWidth::Byte)
            .with_defaultable(false)
            .nullable();
        assert!(!f.is_defaultable());
    }

    #[test]
    fn width_ordering_smallest_first() {
        assert!(StorageWidth::Byte < StorageWidth::Short);
        assert!(StorageWidth::Short < StorageWidth::Word);
        assert!(StorageWidth::Word < StorageWidth::DoubleWord);
        assert!(StorageWidth::DoubleWord < StorageWidth::Large);
    }

    #[test]
    fn type_identity_names_shape() {
        let ty = TypeIdentity::new("Address");
        assert_eq!(ty.shape().as_str(), "Address");
    }
}
