//! Memoizing shape catalog
//!
//! Provides [`ShapeCatalog`], a pass-scoped cache of [`FieldSet`]s over a
//! [`ShapeIntrospector`].
//!
//! Each shape gets a slot claimed with an atomic insert-if-absent on a
//! [`DashMap`]. The introspector then runs inside the slot's [`OnceLock`],
//! outside any shard lock, so:
//! - lookups of distinct shapes never wait on each other
//! - concurrent lookups of one shape observe a single computed field set

use crate::shape::{FieldSet, ShapeId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Source of field sets for shapes
///
/// Must be deterministic for a fixed shape within a pass.
pub trait ShapeIntrospector: Send + Sync {
    /// Produce the fields of `shape`
    fn introspect(&self, shape: &ShapeId) -> FieldSet;
}

impl<F> ShapeIntrospector for F
where
    F: Fn(&ShapeId) -> FieldSet + Send + Sync,
{
    fn introspect(&self, shape: &ShapeId) -> FieldSet {
        self(shape)
    }
}

type Slot = Arc<OnceLock<Arc<FieldSet>>>;

/// Catalog statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    /// Shapes with a slot in the catalog
    pub cached_shapes: usize,

    /// Introspector invocations so far
    pub introspections: u64,
}

/// Compute-once cache of shape fields
pub struct ShapeCatalog<I> {
    introspector: I,
    slots: DashMap<ShapeId, Slot>,
    introspections: AtomicU64,
}

impl<I: ShapeIntrospector> ShapeCatalog<I> {
    /// Create empty catalog over `introspector`
    #[inline]
    #[must_use]
    pub fn new(introspector: I) -> Self {
        Self {
            introspector,
            slots: DashMap::new(),
            introspections: AtomicU64::new(0),
        }
    }

    /// Fields of `shape`, introspecting on first request
    pub fn fields(&self, shape: &ShapeId) -> Arc<FieldSet> {
        let slot = self.slot(shape);
        Arc::clone(slot.get_or_init(|| {
            self.introspections.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%shape, "introspecting shape");
            Arc::new(self.introspector.introspect(shape))
        }))
    }

    /// Fields of `shape` if already computed
    #[must_use]
    pub fn cached(&self, shape: &ShapeId) -> Option<Arc<FieldSet>> {
        self.slots
            .get(shape)
            .and_then(|slot| slot.value().get().cloned())
    }

    // Shard lock is held only for the claim, never across introspection.
    fn slot(&self, shape: &ShapeId) -> Slot {
        if let Some(slot) = self.slots.get(shape) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(shape.clone()).or_default().value())
    }

    /// Drop every cached field set (end of pass)
    pub fn clear(&self) {
        self.slots.clear();
    }

    /// Catalog statistics
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            cached_shapes: self.slots.len(),
            introspections: self.introspections.load(Ordering::Relaxed),
        }
    }

    /// Underlying introspector
    #[inline]
    #[must_use]
    pub fn introspector(&self) -> &I {
        &self.introspector
    }
}

impl<I> std::fmt::Debug for ShapeCatalog<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeCatalog")
            .field("cached_shapes", &self.slots.len())
            .field("introspections", &self.introspections.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
