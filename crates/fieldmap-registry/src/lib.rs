//! fieldmap registry
//!
//! Where mappings are declared, and the diagnostic vocabulary shared by the
//! whole toolchain.
//!
//! # Core Concepts
//!
//! - [`MappingKey`]: directed (source, destination) shape pair
//! - [`FluentConfig`]: per-field directives of one mapping
//! - [`Provenance`]: where an entry was declared; decides duplicates
//! - [`MappingRegistry`]: concurrent registration, reverse derivation
//! - [`RegistrySnapshot`]: frozen, ordered view handed to plan compilation
//! - [`Diagnostic`]: one reported problem, routed through a [`DiagnosticSink`]
//!
//! # Example
//!
//! ```rust
//! use fieldmap_registry::{FluentConfig, MappingEntry, MappingKey, MappingRegistry, Provenance};
//!
//! let registry = MappingRegistry::new();
//! registry.add(MappingEntry::explicit(
//!     MappingKey::new("Order", "OrderDto"),
//!     FluentConfig::new().rename("Total", "GrandTotal").reverse(true),
//!     Provenance::new("orders.yaml", 0),
//! ));
//!
//! let snapshot = registry.snapshot();
//! assert_eq!(snapshot.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod diagnostic;
mod entry;
mod key;
mod registry;

pub use config::{FieldDirective, FluentConfig};
pub use diagnostic::{
    CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, Severity, TracingSink,
};
pub use entry::{EntryOrigin, MappingEntry};
pub use key::{ConfigOrigin, MappingKey, Provenance};
pub use registry::{MappingRegistry, Registration, RegistrySnapshot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
