//! Ownership sharing with foreign allocators
//!
//! A foreign allocator that lends out a buffer needs to know when it is
//! safe to free it. It exposes its reference count through [`ShareCounter`];
//! this crate only ever touches that count through [`ShareGuard`], a
//! scoped-acquisition wrapper that retains on construction and releases on
//! drop. There is deliberately no other way to mutate the count from this
//! side - mismatched retain/release pairs are unrepresentable.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Reference-count hook into a foreign allocator
///
/// The foreign side implements this over whatever counting mechanism it
/// already uses (an atomic, a host-language refcount, a pool slot). The
/// contract is the usual one: the allocation must stay alive while shares
/// are outstanding, and only the foreign allocator ever frees it.
///
/// `Send + Sync` is required because a multi-threaded host may drop the
/// last tensor view on any thread.
pub trait ShareCounter: Send + Sync + 'static {
    /// Add one share to the allocation's lifetime
    fn retain(&self);

    /// Return one share previously taken with `retain`
    fn release(&self);

    /// Current number of outstanding shares
    fn count(&self) -> usize;
}

/// Ready-made atomic share counter
///
/// For foreign allocators (and tests) that don't bring their own counting
/// mechanism. Starts at 1: the allocator's own share. The allocation is
/// free to die once the count returns to the baseline the allocator chose.
#[derive(Debug)]
pub struct AtomicShareCount {
    count: AtomicUsize,
}

impl AtomicShareCount {
    /// Create a counter holding the allocator's own share
    pub fn new() -> Self {
        Self {
            count: AtomicUsize::new(1),
        }
    }
}

impl Default for AtomicShareCount {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareCounter for AtomicShareCount {
    fn retain(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    fn release(&self) {
        let prev = self.count.fetch_sub(1, Ordering::AcqRel);
        // Underflow means the bookkeeping of a shared allocation is corrupt;
        // there is nothing sane to do but stop.
        assert!(
            prev > 0,
            "share count underflow: release without a matching retain"
        );
    }

    fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

/// Scoped share of a foreign allocation
///
/// Retains one share at construction and releases it exactly once on drop,
/// on every exit path. Storage built over a foreign buffer holds one of
/// these; no other code retains or releases.
pub(crate) struct ShareGuard {
    owner: Arc<dyn ShareCounter>,
}

impl ShareGuard {
    /// Take one share of the owner's allocation
    pub(crate) fn acquire(owner: Arc<dyn ShareCounter>) -> Self {
        owner.retain();
        Self { owner }
    }
}

impl Drop for ShareGuard {
    fn drop(&mut self) {
        self.owner.release();
    }
}

impl std::fmt::Debug for ShareGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareGuard")
            .field("shares", &self.owner.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_share_count_baseline() {
        let shares = AtomicShareCount::new();
        assert_eq!(shares.count(), 1);
    }

    #[test]
    fn test_retain_release() {
        let shares = AtomicShareCount::new();
        shares.retain();
        assert_eq!(shares.count(), 2);
        shares.release();
        assert_eq!(shares.count(), 1);
    }

    #[test]
    fn test_guard_scoped_acquisition() {
        let shares: Arc<AtomicShareCount> = Arc::new(AtomicShareCount::new());
        {
            let _guard = ShareGuard::acquire(shares.clone());
            assert_eq!(shares.count(), 2);
        }
        assert_eq!(shares.count(), 1);
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let shares: Arc<AtomicShareCount> = Arc::new(AtomicShareCount::new());
        let cloned = shares.clone();

        let result = std::panic::catch_unwind(move || {
            let _guard = ShareGuard::acquire(cloned);
            panic!("boom");
        });

        assert!(result.is_err());
        assert_eq!(shares.count(), 1);
    }

    #[test]
    #[should_panic(expected = "share count underflow")]
    fn test_underflow_panics() {
        let shares = AtomicShareCount::new();
        shares.release();
        shares.release();
    }
}
