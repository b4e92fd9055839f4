//! Deterministic plan ordering

use crate::plan::ResolutionPlan;
use std::borrow::Borrow;

/// Orders plans for emission
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanMaterializer;

impl PlanMaterializer {
    /// Sort plans by mapping key (source, then destination)
    ///
    /// The result depends only on the plans, never on the order or thread
    /// they were produced in. Plans sharing a key fall back to fingerprint.
    #[must_use]
    pub fn materialize<P, I>(plans: I) -> Vec<P>
    where
        P: Borrow<ResolutionPlan>,
        I: IntoIterator<Item = P>,
    {
        let mut plans: Vec<P> = plans.into_iter().collect();
        plans.sort_by(|a, b| {
            let (a, b) = (a.borrow(), b.borrow());
            a.key()
                .cmp(b.key())
                .then_with(|| a.fingerprint().cmp(&b.fingerprint()))
        });
        plans
    }
}
