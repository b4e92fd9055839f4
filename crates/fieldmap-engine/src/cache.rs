//! Content-addressed plan cache using moka
//!
//! Plans are keyed by the fingerprint of their inputs, so a plan computed in
//! one pass is served to any later pass whose inputs are unchanged.

use crate::plan::ResolutionPlan;
use fieldmap_shape::Fingerprint;
use moka::sync::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Plans currently cached (approximate)
    pub entry_count: u64,

    /// Lookups served from the cache
    pub hits: u64,

    /// Lookups that resolved a new plan
    pub misses: u64,
}

/// Plan cache keyed by input fingerprint
#[derive(Debug)]
pub struct PlanCache {
    inner: Option<Cache<Fingerprint, Arc<ResolutionPlan>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PlanCache {
    /// Create cache holding up to `max_capacity` plans; 0 disables caching
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: (max_capacity > 0).then(|| Cache::new(max_capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached plan for `fingerprint`, or resolve and cache one
    ///
    /// Returns the plan and whether it came from the cache. Concurrent misses
    /// on one fingerprint resolve once.
    pub fn get_or_resolve<F>(
        &self,
        fingerprint: Fingerprint,
        resolve: F,
    ) -> (Arc<ResolutionPlan>, bool)
    where
        F: FnOnce() -> ResolutionPlan,
    {
        let Some(cache) = &self.inner else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return (Arc::new(resolve()), false);
        };

        if let Some(plan) = cache.get(&fingerprint) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return (plan, true);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        (cache.get_with(fingerprint, || Arc::new(resolve())), false)
    }

    /// Cached plan, if present
    #[must_use]
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<ResolutionPlan>> {
        self.inner.as_ref().and_then(|c| c.get(fingerprint))
    }

    /// Drop every cached plan
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.inner {
            cache.invalidate_all();
            cache.run_pending_tasks();
        }
    }

    /// Statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let entry_count = self.inner.as_ref().map_or(0, |c| {
            c.run_pending_tasks();
            c.entry_count()
        });
        CacheStats {
            entry_count,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for PlanCache {
    /// Cache with default capacity (10,000 plans)
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Resolver;
    use fieldmap_registry::{FluentConfig, MappingEntry, MappingKey, Provenance, RegistrySnapshot};
    use fieldmap_shape::FieldSet;

    fn plan() -> ResolutionPlan {
        let entry = MappingEntry::explicit(
            MappingKey::new("A", "B"),
            FluentConfig::new(),
            Provenance::new("t", 0),
        );
        Resolver::default().resolve(
            &entry,
            &FieldSet::empty("A"),
            &FieldSet::empty("B"),
            &RegistrySnapshot::default(),
        )
    }

    #[test]
    fn second_lookup_hits() {
        let cache = PlanCache::new(16);
        let fp = Fingerprint::compute(b"plan");

        let (first, hit) = cache.get_or_resolve(fp, plan);
        assert!(!hit);
        let (second, hit) = cache.get_or_resolve(fp, || unreachable!("cached"));
        assert!(hit);
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entry_count), (1, 1, 1));
    }

    #[test]
    fn zero_capacity_disables() {
        let cache = PlanCache::new(0);
        let fp = Fingerprint::compute(b"plan");
        assert!(!cache.get_or_resolve(fp, plan).1);
        assert!(!cache.get_or_resolve(fp, plan).1);
        assert!(cache.get(&fp).is_none());
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn invalidate_all_empties() {
        let cache = PlanCache::default();
        let fp = Fingerprint::compute(b"plan");
        let _ = cache.get_or_resolve(fp, plan);
        cache.invalidate_all();
        assert!(cache.get(&fp).is_none());
        assert_eq!(cache.stats().entry_count, 0);
    }
}
