//! An ordered map from integer keys to string values, backed by a skiplist.

use std::{cmp, fmt, iter, mem};

use thiserror::Error;

use crate::{
    level_generator::{Geometric, LevelGenerator},
    observer::Observer,
    skipnode::{Arena, NodeId, SkipNode},
};

// ////////////////////////////////////////////////////////////////////////////
// Errors
// ////////////////////////////////////////////////////////////////////////////

/// Errors returned by the lookup and removal operations of a [`SkipList`].
///
/// Neither error indicates corruption: the list is left untouched and the
/// caller is free to carry on.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum SkipListError {
    /// The list holds no entries at all.
    #[error("skiplist is empty")]
    Empty,
    /// The list holds entries, but none with the requested key.
    #[error("skiplist node not found")]
    NotFound,
}

// ////////////////////////////////////////////////////////////////////////////
// SkipList
// ////////////////////////////////////////////////////////////////////////////

/// The skiplist stores key-value pairs such that the keys are unique and
/// always sorted, while providing expected `O(log(n))` lookup, insertion and
/// removal without any rebalancing.
///
/// Every entry lives on level 0, and each entry is additionally promoted to a
/// random number of higher levels as decided by the [`LevelGenerator`] `G`.
/// Lookups start on the highest populated level and drop down a level each
/// time the next key would overshoot the target.
///
/// The list performs no internal locking. Mutating operations take
/// `&mut self`, so sharing a list between threads requires wrapping it, for
/// instance in a [`RwLock`][std::sync::RwLock].
pub struct SkipList<G = Geometric> {
    arena: Arena,
    // Highest level currently holding at least one node, or 0 when empty.
    level: usize,
    len: usize,
    level_generator: G,
    observer: Option<Box<dyn Observer>>,
}

/// Per-level predecessors of a key, as captured by a single top-down descent.
///
/// Levels above the list's current level are left pointing at the head.
struct Update(Vec<NodeId>);

impl Update {
    fn at(&self, level: usize) -> NodeId {
        self.0.get(level).copied().unwrap_or(NodeId::HEAD)
    }
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl SkipList {
    /// Create a new skiplist with 5 levels and a promotion probability of one
    /// half.
    ///
    /// # Examples
    ///
    /// ```
    /// use levelmap::SkipList;
    ///
    /// let skiplist = SkipList::new();
    /// assert_eq!(skiplist.max_level(), 5);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_level_generator(Geometric::default())
    }

    /// Constructs a new, empty skiplist with the optimal number of levels for
    /// the intended capacity. Specifically, it uses `floor(log2(capacity))`
    /// number of levels, ensuring that only *a few* nodes occupy the highest
    /// level.
    ///
    /// # Examples
    ///
    /// ```
    /// use levelmap::SkipList;
    ///
    /// let mut skiplist = SkipList::with_capacity(100);
    /// assert_eq!(skiplist.max_level(), 6);
    /// skiplist.extend((0..100).map(|k| (k, k.to_string())));
    /// ```
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let levels = capacity
            .checked_ilog2()
            .and_then(|l| usize::try_from(l).ok())
            .map_or(1, |l| cmp::max(1, l));
        Self::with_level_generator(Geometric::with_total(levels))
    }
}

impl<G: LevelGenerator> SkipList<G> {
    /// Create a new skiplist drawing node heights from `level_generator`.
    ///
    /// The list has as many levels as the generator's
    /// [`total`][LevelGenerator::total], and never fewer than one.
    ///
    /// # Examples
    ///
    /// ```
    /// use levelmap::{Geometric, SkipList};
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let generator = Geometric::with_rng(8, 0.25, StdRng::seed_from_u64(7)).unwrap();
    /// let skiplist = SkipList::with_level_generator(generator);
    /// assert_eq!(skiplist.max_level(), 8);
    /// ```
    #[inline]
    pub fn with_level_generator(level_generator: G) -> Self {
        SkipList {
            arena: Arena::new(cmp::max(1, level_generator.total())),
            level: 0,
            len: 0,
            level_generator,
            observer: None,
        }
    }

    /// Attach an observer notified of every insertion, replacement and
    /// deletion.
    ///
    /// # Examples
    ///
    /// ```
    /// use levelmap::{LogObserver, SkipList};
    ///
    /// let mut skiplist = SkipList::new().with_observer(LogObserver);
    /// skiplist.insert(1, "one");
    /// ```
    #[inline]
    #[must_use]
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.set_observer(observer);
        self
    }

    /// Replace the current observer, if any.
    #[inline]
    pub fn set_observer(&mut self, observer: impl Observer + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Detach the current observer, if any.
    #[inline]
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Insert `value` under `key`.
    ///
    /// If the key is already present its value is overwritten and the previous
    /// value returned; the shape of the list is left untouched. Otherwise a
    /// new node is linked in at a randomly drawn height and `None` is
    /// returned. Insertion never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use levelmap::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// assert_eq!(skiplist.insert(1, "Hello"), None);
    /// assert_eq!(skiplist.insert(1, "World"), Some("Hello".to_owned()));
    /// assert_eq!(skiplist.len(), 1);
    /// ```
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "len is bounded by the number of nodes in memory"
    )]
    pub fn insert(&mut self, key: i64, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        let update = self.update_for(key);

        if let Some(existing) = self.matching(update.at(0), key) {
            let old = mem::replace(&mut self.arena.get_mut(existing).value, value);
            if let Some(observer) = &self.observer {
                observer.replaced(key);
            }
            return Some(old);
        }

        let height = cmp::min(self.level_generator.level(), self.top());
        // The update entries above the current level already point at the
        // head, so raising the level is all that is needed.
        if height > self.level {
            self.level = height;
        }

        let id = self.arena.alloc(SkipNode::new(key, value, height));
        for level in (0..=height).rev() {
            let prev = update.at(level);
            let next = self.arena.get(prev).next(level);
            self.arena.get_mut(id).set_next(level, next);
            self.arena.get_mut(prev).set_next(level, Some(id));
        }
        self.len += 1;

        if let Some(observer) = &self.observer {
            let forward: Vec<Option<i64>> = self
                .arena
                .get(id)
                .forward
                .iter()
                .map(|next| next.map(|next| self.arena.get(next).key))
                .collect();
            observer.inserted(key, height, &forward);
        }
        None
    }

    /// Remove `key` from the list, returning the value it held.
    ///
    /// # Errors
    ///
    /// [`SkipListError::Empty`] if the list holds no entries, and
    /// [`SkipListError::NotFound`] if it holds no entry for `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use levelmap::{SkipList, SkipListError};
    ///
    /// let mut skiplist = SkipList::new();
    /// assert_eq!(skiplist.delete(1), Err(SkipListError::Empty));
    ///
    /// skiplist.insert(1, "Hello");
    /// assert_eq!(skiplist.delete(2), Err(SkipListError::NotFound));
    /// assert_eq!(skiplist.delete(1), Ok("Hello".to_owned()));
    /// assert!(skiplist.is_empty());
    /// ```
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "the list is non-empty and the level is positive when decremented"
    )]
    pub fn delete(&mut self, key: i64) -> Result<String, SkipListError> {
        if self.is_empty() {
            return Err(SkipListError::Empty);
        }
        let update = self.update_for(key);
        let target = self
            .matching(update.at(0), key)
            .ok_or(SkipListError::NotFound)?;

        let height = self.arena.get(target).height();
        for level in 0..=height {
            let prev = update.at(level);
            if self.arena.get(prev).next(level) == Some(target) {
                let next = self.arena.get(target).next(level);
                self.arena.get_mut(prev).set_next(level, next);
            }
        }

        while self.level > 0 && self.arena.head().next(self.level).is_none() {
            self.level -= 1;
        }
        self.len -= 1;

        let node = self.arena.release(target);
        if let Some(observer) = &self.observer {
            observer.deleted(key, self.level);
        }
        Ok(node.value)
    }
}

impl<G> SkipList<G> {
    /// Look up the value stored under `key`.
    ///
    /// # Errors
    ///
    /// [`SkipListError::Empty`] if the list holds no entries, and
    /// [`SkipListError::NotFound`] if it holds no entry for `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use levelmap::{SkipList, SkipListError};
    ///
    /// let mut skiplist = SkipList::new();
    /// assert_eq!(skiplist.search(1), Err(SkipListError::Empty));
    ///
    /// skiplist.insert(1, "x");
    /// assert_eq!(skiplist.search(1), Ok("x"));
    /// assert_eq!(skiplist.search(2), Err(SkipListError::NotFound));
    /// ```
    #[inline]
    pub fn search(&self, key: i64) -> Result<&str, SkipListError> {
        if self.is_empty() {
            return Err(SkipListError::Empty);
        }
        let prev = self.descend(key, |_, _| {});
        self.matching(prev, key)
            .map(|id| self.arena.get(id).value.as_str())
            .ok_or(SkipListError::NotFound)
    }

    /// Whether the list holds an entry for `key`.
    ///
    /// # Errors
    ///
    /// [`SkipListError::Empty`] if the list holds no entries at all, so that
    /// callers can tell an empty list apart from a missing key. Use
    /// [`contains_key`][SkipList::contains_key] when that distinction does not
    /// matter.
    ///
    /// # Examples
    ///
    /// ```
    /// use levelmap::{SkipList, SkipListError};
    ///
    /// let mut skiplist = SkipList::new();
    /// assert_eq!(skiplist.contains(4), Err(SkipListError::Empty));
    ///
    /// skiplist.extend((0..10).map(|k| (k, k.to_string())));
    /// assert_eq!(skiplist.contains(4), Ok(true));
    /// assert_eq!(skiplist.contains(15), Ok(false));
    /// ```
    #[inline]
    pub fn contains(&self, key: i64) -> Result<bool, SkipListError> {
        if self.is_empty() {
            return Err(SkipListError::Empty);
        }
        Ok(self.contains_key(key))
    }

    /// Whether the list holds an entry for `key`, treating an empty list as
    /// simply not containing it.
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: i64) -> bool {
        let prev = self.descend(key, |_, _| {});
        self.matching(prev, key).is_some()
    }

    /// Returns the number of entries in the list.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes all entries. The level generator and observer are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use levelmap::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// skiplist.extend((0..10).map(|k| (k, k.to_string())));
    /// skiplist.clear();
    /// assert!(skiplist.is_empty());
    /// assert_eq!(skiplist.level(), 0);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.arena = Arena::new(self.max_level());
        self.level = 0;
        self.len = 0;
    }

    /// Highest level currently holding at least one entry, or 0 when empty.
    #[inline]
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Number of levels the list was created with.
    #[inline]
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.arena.head().forward.len()
    }

    /// Iterate over the entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use levelmap::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// skiplist.insert(2, "b");
    /// skiplist.insert(1, "a");
    /// let entries: Vec<_> = skiplist.iter().collect();
    /// assert_eq!(entries, vec![(1, "a"), (2, "b")]);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            arena: &self.arena,
            next: self.arena.head().next(0),
            size: self.len,
        }
    }

    /// Topmost valid level index.
    fn top(&self) -> usize {
        self.max_level().saturating_sub(1)
    }

    /// Walk from the head down to level 0, calling `visit` with the rightmost
    /// node whose key is strictly less than `key` on every level.
    ///
    /// Returns that node for level 0.
    fn descend<F>(&self, key: i64, mut visit: F) -> NodeId
    where
        F: FnMut(usize, NodeId),
    {
        let mut current = NodeId::HEAD;
        for level in (0..=self.level).rev() {
            while let Some(next) = self.arena.get(current).next(level) {
                if self.arena.get(next).key < key {
                    current = next;
                } else {
                    break;
                }
            }
            visit(level, current);
        }
        current
    }

    /// Capture the predecessors of `key` on every level.
    fn update_for(&self, key: i64) -> Update {
        let mut update = vec![NodeId::HEAD; self.max_level()];
        self.descend(key, |level, id| {
            if let Some(slot) = update.get_mut(level) {
                *slot = id;
            }
        });
        Update(update)
    }

    /// The node immediately after `prev` on level 0, if it holds `key`.
    fn matching(&self, prev: NodeId, key: i64) -> Option<NodeId> {
        self.arena
            .get(prev)
            .next(0)
            .filter(|&next| self.arena.get(next).key == key)
    }

    /// Panics if any of the structural invariants does not hold.
    #[cfg(test)]
    #[expect(clippy::panic, reason = "Test helper")]
    fn check(&self) {
        use std::collections::HashSet;

        let head = self.arena.head();
        assert!(self.level < self.max_level());

        let mut below: Option<HashSet<NodeId>> = None;
        let mut max_height = 0;
        for level in 0..self.max_level() {
            let mut seen = HashSet::new();
            let mut prev_key: Option<i64> = None;
            let mut cursor = head.next(level);
            while let Some(id) = cursor {
                let node = self.arena.get(id);
                assert!(
                    node.height() >= level,
                    "node {} linked above its height",
                    node.key
                );
                if let Some(prev_key) = prev_key {
                    assert!(prev_key < node.key, "level {level} is not strictly increasing");
                }
                if let Some(below) = &below {
                    assert!(
                        below.contains(&id),
                        "node {} on level {level} is missing from level {}",
                        node.key,
                        level - 1
                    );
                }
                max_height = cmp::max(max_height, node.height());
                prev_key = Some(node.key);
                seen.insert(id);
                cursor = node.next(level);
            }
            if level > self.level && !seen.is_empty() {
                panic!("level {level} is populated above the list level {}", self.level);
            }
            if level == 0 {
                assert_eq!(seen.len(), self.len, "level 0 does not hold every entry");
            }
            below = Some(seen);
        }
        assert_eq!(self.level, max_height, "list level is not the tallest node");
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl Default for SkipList {
    #[inline]
    fn default() -> SkipList {
        SkipList::new()
    }
}

impl<G, V> Extend<(i64, V)> for SkipList<G>
where
    G: LevelGenerator,
    V: Into<String>,
{
    #[inline]
    fn extend<I: iter::IntoIterator<Item = (i64, V)>>(&mut self, iterable: I) {
        for (key, value) in iterable {
            self.insert(key, value);
        }
    }
}

impl<V: Into<String>> iter::FromIterator<(i64, V)> for SkipList {
    #[inline]
    fn from_iter<I>(iter: I) -> SkipList
    where
        I: iter::IntoIterator<Item = (i64, V)>,
    {
        let mut skiplist = SkipList::new();
        skiplist.extend(iter);
        skiplist
    }
}

impl<'a, G> iter::IntoIterator for &'a SkipList<G> {
    type Item = (i64, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<G> fmt::Debug for SkipList<G> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;

        for (i, (k, v)) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "({k:?}, {v:?})")?;
        }
        write!(f, "]")
    }
}

impl<G> fmt::Display for SkipList<G> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;

        for (i, (k, v)) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "({k}, {v})")?;
        }
        write!(f, "]")
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Iterator
// ////////////////////////////////////////////////////////////////////////////

/// Iterator over the entries of a [`SkipList`] in ascending key order.
pub struct Iter<'a> {
    arena: &'a Arena,
    next: Option<NodeId>,
    size: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (i64, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.arena.get(self.next?);
        self.next = node.next(0);
        self.size = self.size.saturating_sub(1);
        Some((node.key, node.value.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.size, Some(self.size))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl iter::FusedIterator for Iter<'_> {}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::{
        collections::{BTreeMap, VecDeque},
        sync::{Arc, Mutex},
    };

    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
    use rstest::rstest;

    use super::{SkipList, SkipListError};
    use crate::{
        level_generator::{Geometric, LevelGenerator},
        observer::Observer,
    };

    /// Hands out a fixed sequence of heights, then level 0 forever.
    struct Scripted {
        total: usize,
        heights: VecDeque<usize>,
    }

    impl Scripted {
        fn new(total: usize, heights: impl IntoIterator<Item = usize>) -> Self {
            Scripted {
                total,
                heights: heights.into_iter().collect(),
            }
        }
    }

    impl LevelGenerator for Scripted {
        fn total(&self) -> usize {
            self.total
        }

        fn level(&mut self) -> usize {
            self.heights.pop_front().unwrap_or(0)
        }
    }

    fn seeded(seed: u64) -> SkipList<Geometric<StdRng>> {
        let generator = Geometric::with_rng(5, 0.5, StdRng::seed_from_u64(seed)).unwrap();
        SkipList::with_level_generator(generator)
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Inserted(i64, usize, Vec<Option<i64>>),
        Replaced(i64),
        Deleted(i64, usize),
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Event>>>);

    impl Observer for Recorder {
        fn inserted(&self, key: i64, height: usize, forward: &[Option<i64>]) {
            self.0
                .lock()
                .unwrap()
                .push(Event::Inserted(key, height, forward.to_vec()));
        }

        fn replaced(&self, key: i64) {
            self.0.lock().unwrap().push(Event::Replaced(key));
        }

        fn deleted(&self, key: i64, level: usize) {
            self.0.lock().unwrap().push(Event::Deleted(key, level));
        }
    }

    #[test]
    fn basic_small() -> Result<()> {
        let mut sl = SkipList::new();
        sl.check();
        assert_eq!(sl.delete(1), Err(SkipListError::Empty));
        sl.check();
        assert_eq!(sl.insert(1, "0"), None);
        sl.check();
        assert_eq!(sl.insert(1, "5"), Some("0".to_owned()));
        sl.check();
        assert_eq!(sl.delete(1)?, "5");
        sl.check();
        assert_eq!(sl.insert(1, "10"), None);
        sl.check();
        assert_eq!(sl.insert(2, "20"), None);
        sl.check();
        assert_eq!(sl.delete(1)?, "10");
        sl.check();
        assert_eq!(sl.delete(2)?, "20");
        sl.check();
        assert_eq!(sl.delete(1), Err(SkipListError::Empty));
        sl.check();
        Ok(())
    }

    #[test]
    fn basic_large() -> Result<()> {
        let size = 10_000;
        let mut sl = SkipList::with_capacity(size);
        assert!(sl.is_empty());

        for i in 0..size {
            let key = i64::try_from(i)?;
            assert_eq!(sl.insert(key, format!("{}", key * 10)), None);
            assert_eq!(sl.len(), i + 1);
        }
        sl.check();

        for i in 0..size {
            let key = i64::try_from(i)?;
            assert_eq!(sl.delete(key)?, format!("{}", key * 10));
            assert_eq!(sl.len(), size - i - 1);
        }
        sl.check();
        assert_eq!(sl.level(), 0);
        Ok(())
    }

    #[test]
    fn scenario_mixed_operations() -> Result<()> {
        let mut sl = SkipList::new();
        for (key, value) in [(10, "a"), (20, "b"), (5, "c"), (15, "d")] {
            assert_eq!(sl.insert(key, value), None);
        }
        sl.check();

        assert_eq!(sl.search(15)?, "d");
        assert_eq!(sl.delete(10)?, "a");
        sl.check();
        assert_eq!(sl.search(10), Err(SkipListError::NotFound));
        assert_eq!(sl.contains(5), Ok(true));
        assert_eq!(sl.len(), 3);

        insta::assert_snapshot!(sl.to_string(), @"[(5, c), (15, d), (20, b)]");
        insta::assert_snapshot!(format!("{sl:?}"), @r#"[(5, "c"), (15, "d"), (20, "b")]"#);
        Ok(())
    }

    #[test]
    fn scenario_empty_list() -> Result<()> {
        let mut sl = SkipList::new();
        assert_eq!(sl.search(1), Err(SkipListError::Empty));
        assert_eq!(sl.delete(1), Err(SkipListError::Empty));
        assert_eq!(sl.contains(1), Err(SkipListError::Empty));
        assert!(!sl.contains_key(1));

        assert_eq!(sl.insert(1, "x"), None);
        assert_eq!(sl.search(1)?, "x");
        Ok(())
    }

    #[test]
    fn error_messages() {
        assert_eq!(SkipListError::Empty.to_string(), "skiplist is empty");
        assert_eq!(SkipListError::NotFound.to_string(), "skiplist node not found");
    }

    #[test]
    fn update_keeps_shape() -> Result<()> {
        let mut sl = SkipList::with_level_generator(Scripted::new(5, [3, 1, 4]));
        sl.insert(1, "one");
        sl.insert(2, "two");
        assert_eq!(sl.level(), 3);

        // The overwrite must not consume a height from the generator.
        assert_eq!(sl.insert(1, "uno"), Some("one".to_owned()));
        assert_eq!(sl.level(), 3);
        assert_eq!(sl.len(), 2);
        assert_eq!(sl.search(1)?, "uno");

        sl.insert(3, "three");
        assert_eq!(sl.level(), 4);
        sl.check();
        Ok(())
    }

    #[test]
    fn missing_key_on_non_empty_list() {
        let mut sl: SkipList = [(1, "a"), (3, "c")].into_iter().collect();
        assert_eq!(sl.search(2), Err(SkipListError::NotFound));
        assert_eq!(sl.search(0), Err(SkipListError::NotFound));
        assert_eq!(sl.search(4), Err(SkipListError::NotFound));
        assert_eq!(sl.delete(2), Err(SkipListError::NotFound));
        assert_eq!(sl.contains(2), Ok(false));
        assert_eq!(sl.len(), 2);
        sl.check();
    }

    #[test]
    fn level_shrinks_to_next_populated_level() -> Result<()> {
        let mut sl = SkipList::with_level_generator(Scripted::new(5, [1, 4, 2, 0]));
        sl.extend([(10, "a"), (20, "b"), (30, "c"), (40, "d")]);
        assert_eq!(sl.level(), 4);
        sl.check();

        // 20 is the sole occupant of levels 3 and 4.
        assert_eq!(sl.delete(20)?, "b");
        assert_eq!(sl.level(), 2);
        sl.check();

        assert_eq!(sl.delete(30)?, "c");
        assert_eq!(sl.level(), 1);
        sl.check();

        // Deleting a node below the top level leaves the level alone.
        assert_eq!(sl.delete(40)?, "d");
        assert_eq!(sl.level(), 1);

        assert_eq!(sl.delete(10)?, "a");
        assert_eq!(sl.level(), 0);
        sl.check();
        Ok(())
    }

    #[test]
    fn out_of_range_heights_are_clamped() {
        let mut sl = SkipList::with_level_generator(Scripted::new(3, [7, 100]));
        sl.insert(1, "a");
        sl.insert(2, "b");
        assert_eq!(sl.level(), 2);
        assert_eq!(sl.max_level(), 3);
        sl.check();
    }

    #[test]
    fn deletion_removes_from_every_level() -> Result<()> {
        let mut sl = SkipList::with_level_generator(Scripted::new(4, [3, 3, 3]));
        sl.extend([(1, "a"), (2, "b"), (3, "c")]);
        assert_eq!(sl.delete(2)?, "b");
        sl.check();
        assert_eq!(sl.search(2), Err(SkipListError::NotFound));
        assert_eq!(sl.contains(2), Ok(false));
        assert_eq!(sl.level(), 3);

        for level in 0..=3 {
            let mut keys = Vec::new();
            let mut cursor = sl.arena.head().next(level);
            while let Some(id) = cursor {
                keys.push(sl.arena.get(id).key);
                cursor = sl.arena.get(id).next(level);
            }
            assert_eq!(keys, vec![1, 3], "level {level}");
        }
        Ok(())
    }

    #[test]
    fn freed_slots_are_reused() -> Result<()> {
        let mut sl = SkipList::new();
        sl.extend((0..10).map(|k| (k, k.to_string())));
        assert_eq!(sl.arena.slots(), 10);
        for k in 0..5 {
            sl.delete(k)?;
        }
        sl.extend((100..105).map(|k| (k, k.to_string())));
        assert_eq!(sl.arena.slots(), 10);
        assert_eq!(sl.len(), 10);
        sl.check();
        Ok(())
    }

    #[test]
    fn clear() {
        // Clearing needs no level generator bound.
        fn reset<G>(sl: &mut SkipList<G>) {
            sl.clear();
        }

        let mut sl: SkipList = (0..100).map(|x| (x, x.to_string())).collect();
        assert_eq!(sl.len(), 100);
        reset(&mut sl);
        sl.check();
        assert!(sl.is_empty());
        assert_eq!(sl.level(), 0);
        assert_eq!(sl.max_level(), 5);
        assert_eq!(sl.search(1), Err(SkipListError::Empty));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(3, 1)]
    #[case(4, 2)]
    #[case(100, 6)]
    #[case(1 << 20, 20)]
    fn with_capacity_levels(#[case] capacity: usize, #[case] levels: usize) {
        assert_eq!(SkipList::with_capacity(capacity).max_level(), levels);
    }

    #[test]
    fn iter() {
        let size = 1000;
        let mut keys: Vec<i64> = (0..size).collect();
        keys.shuffle(&mut StdRng::seed_from_u64(0x1234_abcd));
        let sl: SkipList = keys.iter().map(|&k| (k, format!("v{k}"))).collect();

        let iter = sl.iter();
        assert_eq!(iter.len(), 1000);
        for (expected, (key, value)) in (0..size).zip(&sl) {
            assert_eq!(key, expected);
            assert_eq!(value, format!("v{expected}"));
        }
        assert_eq!(sl.iter().count(), 1000);
    }

    #[test]
    fn observer_events() -> Result<()> {
        let recorder = Recorder::default();
        let mut sl = SkipList::with_level_generator(Scripted::new(5, [2, 0]))
            .with_observer(recorder.clone());

        sl.insert(20, "b");
        sl.insert(10, "a");
        sl.insert(10, "A");
        sl.delete(20)?;
        let _ = sl.delete(99);

        sl.clear_observer();
        sl.insert(30, "c");

        let events = recorder.0.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                Event::Inserted(20, 2, vec![None, None, None]),
                Event::Inserted(10, 0, vec![Some(20)]),
                Event::Replaced(10),
                Event::Deleted(20, 0),
            ]
        );
        Ok(())
    }

    #[rstest]
    fn against_btreemap(#[values(0, 1, 2, 3)] seed: u64) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sl = seeded(seed);
        let mut reference = BTreeMap::new();
        let mut inserts = 0_usize;
        let mut deletes = 0_usize;

        for step in 0..5_000 {
            let key = rng.random_range(-200..200_i64);
            match rng.random_range(0..4) {
                0 | 1 => {
                    let value = format!("{step}");
                    let old = sl.insert(key, value.clone());
                    if old.is_none() {
                        inserts += 1;
                    }
                    assert_eq!(old, reference.insert(key, value));
                }
                2 => match reference.remove(&key) {
                    Some(value) => {
                        assert_eq!(sl.delete(key)?, value);
                        deletes += 1;
                    }
                    None if reference.is_empty() => {
                        assert_eq!(sl.delete(key), Err(SkipListError::Empty));
                    }
                    None => assert_eq!(sl.delete(key), Err(SkipListError::NotFound)),
                },
                _ => match reference.get(&key) {
                    Some(value) => assert_eq!(sl.search(key)?, value.as_str()),
                    None => assert!(sl.search(key).is_err()),
                },
            }
            assert_eq!(sl.len(), inserts - deletes);
            if step % 500 == 0 {
                sl.check();
            }
        }
        sl.check();

        let entries: Vec<(i64, &str)> = sl.iter().collect();
        let expected: Vec<(i64, &str)> =
            reference.iter().map(|(&k, v)| (k, v.as_str())).collect();
        assert_eq!(entries, expected);
        Ok(())
    }
}
