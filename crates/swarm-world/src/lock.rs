//! The global collection lock.

use std::cell::RefCell;

use rustc_hash::FxHashSet;
use swarm_core::PoiId;

/// Process-wide set of points some follower has already claimed.
///
/// Append-only: entries are never removed during a run.  Leaders consult it
/// before queueing and before assigning; followers consult it on arrival and
/// claim before buffering, so at most one follower ever reports a given
/// point.
///
/// Interior mutability keeps the borrow story simple under the cooperative
/// scheduler.  `claim` is the check-then-insert step; a parallel re-hosting
/// of the agents would swap the `RefCell` for a lock or a concurrent set
/// with an atomic insert-if-absent and keep the same API.
#[derive(Debug, Default)]
pub struct CollectedSet {
    inner: RefCell<FxHashSet<PoiId>>,
}

impl CollectedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Has this point already been claimed by any follower?
    #[inline]
    pub fn contains(&self, poi: PoiId) -> bool {
        self.inner.borrow().contains(&poi)
    }

    /// Claim a point.  Returns `true` if this call inserted it, `false` if
    /// it was already claimed.
    #[inline]
    pub fn claim(&self, poi: PoiId) -> bool {
        self.inner.borrow_mut().insert(poi)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}
