//! Instrumentation hooks for structural changes to a
//! [`SkipList`][crate::SkipList].
//!
//! The list itself never prints or logs. Callers wishing to follow what
//! happens inside attach an [`Observer`]; [`LogObserver`] forwards every event
//! to the [`log`] facade so that any `log` backend can pick them up.

use log::{debug, trace};

/// Receives a notification after every successful mutation of a skiplist.
///
/// All methods default to doing nothing, so implementors only override the
/// events they care about.
pub trait Observer: Send + Sync {
    /// A new node was linked in.
    ///
    /// `forward` holds, for each level the node occupies, the key of the next
    /// node at that level (or `None` if the new node is the last one there).
    #[inline]
    fn inserted(&self, _key: i64, _height: usize, _forward: &[Option<i64>]) {}

    /// The value of an existing key was overwritten.
    #[inline]
    fn replaced(&self, _key: i64) {}

    /// A node was unlinked. `level` is the highest populated level of the list
    /// after the removal.
    #[inline]
    fn deleted(&self, _key: i64, _level: usize) {}
}

/// An [`Observer`] emitting every event as a [`log`] record.
///
/// Insertions are logged at `trace` level, as they are by far the most
/// frequent event; replacements and deletions at `debug` level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogObserver;

impl Observer for LogObserver {
    #[inline]
    fn inserted(&self, key: i64, height: usize, forward: &[Option<i64>]) {
        trace!("inserted key {key} at height {height}, next keys {forward:?}");
    }

    #[inline]
    fn replaced(&self, key: i64) {
        debug!("replaced value of key {key}");
    }

    #[inline]
    fn deleted(&self, key: i64, level: usize) {
        debug!("deleted key {key}, list level now {level}");
    }
}
