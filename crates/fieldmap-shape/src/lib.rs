//! fieldmap shapes
//!
//! The vocabulary every other fieldmap crate speaks in.
//!
//! # Core Concepts
//!
//! - [`FieldDescriptor`]: one typed, named field with its storage class
//! - [`FieldSet`]: the ordered, name-unique fields of a [`ShapeId`]
//! - [`ShapeCatalog`]: compute-once cache over a [`ShapeIntrospector`]
//! - [`ShapeTable`]: introspector over a fixed set of declared shapes
//! - [`compat`]: storage-class compatibility rules
//! - [`Fingerprint`]: Blake3 content digest for derived artifacts
//!
//! # Example
//!
//! ```rust
//! use fieldmap_shape::{FieldDescriptor, FieldSet, ShapeCatalog, ShapeId, StorageWidth};
//!
//! let catalog = ShapeCatalog::new(|shape: &ShapeId| {
//!     FieldSet::new(
//!         shape.clone(),
//!         [FieldDescriptor::value("Id", "int", StorageWidth::Word)],
//!     )
//!     .unwrap()
//! });
//!
//! let fields = catalog.fields(&ShapeId::new("Order"));
//! assert_eq!(fields.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod catalog;
pub mod compat;
mod field;
mod fingerprint;
mod shape;
mod table;

pub use catalog::{CatalogStats, ShapeCatalog, ShapeIntrospector};
pub use compat::{can_assign_direct, can_box_elements, can_box_generically};
pub use field::{ElementType, FieldDescriptor, StorageClass, StorageWidth, TypeIdentity};
pub use fingerprint::{Fingerprint, FingerprintBuilder};
pub use shape::{FieldSet, ShapeError, ShapeId};
pub use table::ShapeTable;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
