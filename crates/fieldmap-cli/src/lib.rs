//! fieldmap command line
//!
//! Loads a manifest of shapes and mappings, compiles it and reports the
//! resulting plans or diagnostics.
//!
//! # Example
//!
//! ```rust
//! use fieldmap_cli::{compile, manifest::Manifest};
//! use fieldmap_engine::EngineConfig;
//!
//! let manifest = Manifest::from_yaml_str(
//!     "shapes: { A: [{ name: Id, type: int }], B: [{ name: Id, type: int }] }\n\
//!      mappings: [{ source: A, destination: B }]",
//! )
//! .unwrap();
//!
//! let output = compile(&manifest, EngineConfig::default()).unwrap();
//! assert_eq!(output.plans().len(), 1);
//! assert!(!output.has_errors());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod manifest;
pub mod render;

use fieldmap_engine::{CompilationPass, EngineConfig, PassOutput};
use fieldmap_registry::MappingRegistry;
use fieldmap_shape::ShapeCatalog;
use manifest::{Manifest, ManifestError};

/// Run one compilation pass over a manifest
///
/// # Errors
/// Returns error if the manifest's shapes or mappings are invalid
pub fn compile(manifest: &Manifest, config: EngineConfig) -> Result<PassOutput, ManifestError> {
    let catalog = ShapeCatalog::new(manifest.shape_table()?);
    let registry = MappingRegistry::new();
    manifest.register(&registry)?;
    Ok(CompilationPass::new(config).run(&catalog, &registry.snapshot()))
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
