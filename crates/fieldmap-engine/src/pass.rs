//! Compilation pass
//!
//! Resolves every mapping of a registry snapshot against a shape catalog,
//! in parallel when configured, reusing cached plans whose inputs did not
//! change since an earlier pass.

use crate::cache::PlanCache;
use crate::config::EngineConfig;
use crate::materialize::PlanMaterializer;
use crate::plan::ResolutionPlan;
use crate::resolve::Resolver;
use fieldmap_registry::{Diagnostic, DiagnosticSink, MappingEntry, RegistrySnapshot};
use fieldmap_shape::{ShapeCatalog, ShapeIntrospector};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

/// Drives plan compilation across passes
#[derive(Debug)]
pub struct CompilationPass {
    config: EngineConfig,
    resolver: Resolver,
    cache: PlanCache,
}

impl CompilationPass {
    /// Create pass driver from engine options
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            resolver: Resolver::new(&config),
            cache: PlanCache::new(config.plan_cache_capacity),
            config,
        }
    }

    /// Engine options
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Plan cache shared by every run
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &PlanCache {
        &self.cache
    }

    /// Resolve every mapping in `registry`
    #[tracing::instrument(
        skip_all,
        fields(mappings = registry.len(), parallel = self.config.parallel)
    )]
    pub fn run<I: ShapeIntrospector>(
        &self,
        catalog: &ShapeCatalog<I>,
        registry: &RegistrySnapshot,
    ) -> PassOutput {
        let entries: Vec<&MappingEntry> = registry.iter().collect();
        let resolve = |entry: &&MappingEntry| self.resolve(catalog, registry, entry);

        let results: Vec<(Arc<ResolutionPlan>, bool)> = if self.config.parallel {
            entries.par_iter().map(resolve).collect()
        } else {
            entries.iter().map(resolve).collect()
        };

        let cache_hits = results.iter().filter(|(_, hit)| *hit).count();
        let plans = PlanMaterializer::materialize(results.into_iter().map(|(plan, _)| plan));

        let mut diagnostics: Vec<Diagnostic> = registry.diagnostics().to_vec();
        diagnostics.extend(plans.iter().flat_map(|p| p.diagnostics().iter().cloned()));
        diagnostics.sort();

        let output = PassOutput {
            plans,
            diagnostics,
            cache_hits,
        };
        tracing::info!(
            plans = output.plans.len(),
            cache_hits,
            errors = output.escalations().len(),
            "compilation pass finished"
        );
        output
    }

    /// Resolve, then hand every diagnostic to `sink`
    pub fn run_with_sink<I: ShapeIntrospector>(
        &self,
        catalog: &ShapeCatalog<I>,
        registry: &RegistrySnapshot,
        sink: &dyn DiagnosticSink,
    ) -> PassOutput {
        let output = self.run(catalog, registry);
        output.report(sink);
        output
    }

    fn resolve<I: ShapeIntrospector>(
        &self,
        catalog: &ShapeCatalog<I>,
        registry: &RegistrySnapshot,
        entry: &MappingEntry,
    ) -> (Arc<ResolutionPlan>, bool) {
        let source = catalog.fields(&entry.key().source);
        let dest = catalog.fields(&entry.key().destination);

        match self.resolver.fingerprint(entry, &source, &dest, registry) {
            Ok(fingerprint) => self.cache.get_or_resolve(fingerprint, || {
                self.resolver
                    .resolve_with(entry, &source, &dest, registry, fingerprint)
            }),
            Err(err) => {
                tracing::warn!(key = %entry.key(), %err, "plan not cacheable");
                (Arc::new(self.resolver.resolve(entry, &source, &dest, registry)), false)
            }
        }
    }
}

impl Default for CompilationPass {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Result of one compilation pass
#[derive(Debug, Clone, Serialize)]
pub struct PassOutput {
    plans: Vec<Arc<ResolutionPlan>>,
    diagnostics: Vec<Diagnostic>,
    cache_hits: usize,
}

impl PassOutput {
    /// Plans sorted by mapping key
    #[inline]
    #[must_use]
    pub fn plans(&self) -> &[Arc<ResolutionPlan>] {
        &self.plans
    }

    /// Registry and plan diagnostics, sorted
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Plans served from the cache in this pass
    #[inline]
    #[must_use]
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    /// Diagnostics that should fail a build
    #[must_use]
    pub fn escalations(&self) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error()).collect()
    }

    /// Check if anything should fail a build
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Send every diagnostic to `sink`, in order
    pub fn report(&self, sink: &dyn DiagnosticSink) {
        for diagnostic in &self.diagnostics {
            sink.report(diagnostic);
        }
    }
}
