//! fieldmap engine
//!
//! Turns registered mappings into resolution plans.
//!
//! # Core Concepts
//!
//! - [`Resolver`]: classifies every destination field of one mapping
//! - [`ResolutionPlan`]: classified fields plus emission order and diagnostics
//! - [`PlanMaterializer`]: deterministic ordering of plans
//! - [`PlanCache`]: plans keyed by the fingerprint of their inputs
//! - [`CompilationPass`]: resolves a whole registry, in parallel, with reuse
//! - [`EngineConfig`]: options, loadable from TOML
//!
//! # Example
//!
//! ```rust
//! use fieldmap_engine::prelude::*;
//!
//! let catalog = ShapeCatalog::new(|shape: &ShapeId| {
//!     FieldSet::new(
//!         shape.clone(),
//!         [FieldDescriptor::value("Id", "int", StorageWidth::Word)],
//!     )
//!     .unwrap()
//! });
//!
//! let registry = MappingRegistry::new();
//! registry.add(MappingEntry::explicit(
//!     MappingKey::new("Order", "OrderDto"),
//!     FluentConfig::new(),
//!     Provenance::new("example", 0),
//! ));
//!
//! let output = CompilationPass::default().run(&catalog, &registry.snapshot());
//! let plan = &output.plans()[0];
//! assert_eq!(plan.fields_by_destination()[0].kind, ResolutionKind::Direct("Id".into()));
//! assert!(!output.has_errors());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cache;
pub mod config;
mod materialize;
mod pass;
mod plan;
mod resolve;

pub use cache::{CacheStats, PlanCache};
pub use config::{ConfigError, EngineConfig};
pub use materialize::PlanMaterializer;
pub use pass::{CompilationPass, PassOutput};
pub use plan::{CollectionPath, NullGuard, PlannedField, ResolutionKind, ResolutionPlan};
pub use resolve::Resolver;

pub use fieldmap_registry::{
    CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, Severity, TracingSink,
};

/// Common imports for building and compiling mappings
pub mod prelude {
    pub use crate::{
        CollectionPath, CompilationPass, EngineConfig, NullGuard, PassOutput, PlanMaterializer,
        PlannedField, ResolutionKind, ResolutionPlan, Resolver,
    };
    pub use fieldmap_registry::{
        CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, FluentConfig, MappingEntry,
        MappingKey, MappingRegistry, Provenance, RegistrySnapshot, Severity, TracingSink,
    };
    pub use fieldmap_shape::{
        ElementType, FieldDescriptor, FieldSet, ShapeCatalog, ShapeId, ShapeIntrospector,
        StorageClass, StorageWidth,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
