//! Debug-only reentrancy detection for the map's probe sections.
//!
//! The map runs user code only through `K: Hash`/`Eq` while a bucket scan is
//! in flight. Re-entering the map from that code would observe a chain in
//! mid-mutation, so every public entry point holds one of these guards for
//! its duration. Debug builds panic on a nested entry; release builds compile
//! the whole guard to a no-op.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map flag; embed and guard entry points with
/// `let _g = self.reentrancy.enter();`.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    entered: Cell<bool>,
    // The map is single-threaded; keep !Send + !Sync.
    _not_send: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            entered: Cell::new(false),
            _not_send: PhantomData,
        }
    }

    /// Mark the map as busy until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> EnterGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.entered.replace(true),
                "reentrant call into the map during a bucket scan"
            );
            return EnterGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return EnterGuard { _lt: PhantomData };
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by [`DebugReentrancy::enter`].
pub(crate) struct EnterGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _lt: PhantomData<&'a ()>,
}

impl Drop for EnterGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.entered.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::DebugReentrancy;

    #[test]
    fn sequential_entries_are_fine() {
        let r = DebugReentrancy::new();
        drop(r.enter());
        drop(r.enter());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_in_debug() {
        let r = DebugReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _g1 = r.enter();
            let _g2 = r.enter();
        }));
        assert!(res.is_err(), "expected nested entry to panic in debug builds");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_entry_is_noop_in_release() {
        let r = DebugReentrancy::new();
        let _g1 = r.enter();
        let _g2 = r.enter();
    }
}
