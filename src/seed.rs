//! Bulk population of a [`SkipList`] with random, duplicate-free keys.
//!
//! Seeding goes through the ordinary [`insert`][SkipList::insert] path; the
//! list has no special knowledge of it.

use std::collections::HashSet;

use rand::Rng;
use thiserror::Error;

use crate::{level_generator::LevelGenerator, skiplist::SkipList};

/// Errors that can occur when configuring a [`Seeder`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum SeedError {
    /// Keys are drawn from `1..=max_key`, which must not be empty.
    #[error("max_key must be at least 1.")]
    NonPositiveMax,
    /// There are not enough distinct keys in `1..=max_key`.
    #[error("cannot draw {count} distinct keys from 1..={max_key}.")]
    CountExceedsRange {
        /// Number of keys requested.
        count: usize,
        /// Largest key that may be drawn.
        max_key: i64,
    },
}

/// Inserts `count` distinct keys drawn uniformly from `1..=max_key`, each with
/// the value `"Data {key}"`.
///
/// # Examples
///
/// ```
/// use levelmap::{Seeder, SkipList};
///
/// let mut skiplist = SkipList::new();
/// let size = Seeder::new(50, 100).unwrap().seed(&mut skiplist);
/// assert_eq!(size, 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seeder {
    count: usize,
    max_key: i64,
}

impl Seeder {
    /// Create a seeder drawing `count` keys out of `1..=max_key`.
    ///
    /// # Errors
    ///
    /// `max_key` must be positive and the range must hold at least `count`
    /// keys.
    #[inline]
    pub fn new(count: usize, max_key: i64) -> Result<Self, SeedError> {
        if max_key < 1 {
            return Err(SeedError::NonPositiveMax);
        }
        if i64::try_from(count).ok().is_none_or(|count| count > max_key) {
            return Err(SeedError::CountExceedsRange { count, max_key });
        }
        Ok(Seeder { count, max_key })
    }

    /// Number of keys inserted per run.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Largest key that may be drawn.
    #[inline]
    #[must_use]
    pub fn max_key(&self) -> i64 {
        self.max_key
    }

    /// Seed `skiplist` using the thread-local random number generator.
    ///
    /// Returns the size of the list afterwards.
    #[inline]
    pub fn seed<G: LevelGenerator>(&self, skiplist: &mut SkipList<G>) -> usize {
        self.seed_with(skiplist, &mut rand::rng())
    }

    /// Seed `skiplist` drawing keys from `rng`.
    ///
    /// Keys already present in the list have their value overwritten, so the
    /// list only grows by the number of keys that were new to it. Returns the
    /// size of the list afterwards.
    pub fn seed_with<G, R>(&self, skiplist: &mut SkipList<G>, rng: &mut R) -> usize
    where
        G: LevelGenerator,
        R: Rng + ?Sized,
    {
        for key in self.sample(rng) {
            skiplist.insert(key, format!("Data {key}"));
        }
        skiplist.len()
    }

    /// Draw `count` distinct keys from `1..=max_key` with Floyd's algorithm,
    /// in time and space proportional to `count` regardless of the range.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "count <= max_key is checked on construction"
    )]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<i64> {
        let mut keys = Vec::with_capacity(self.count);
        let Some(span) = i64::try_from(self.count).ok().and_then(|c| c.checked_sub(1)) else {
            return keys;
        };
        let mut chosen = HashSet::with_capacity(self.count);
        for upper in (self.max_key - span)..=self.max_key {
            let candidate = rng.random_range(1..=upper);
            let key = if chosen.contains(&candidate) {
                upper
            } else {
                candidate
            };
            chosen.insert(key);
            keys.push(key);
        }
        keys
    }
}

impl Default for Seeder {
    /// 500 keys out of `1..=2000`.
    #[inline]
    fn default() -> Self {
        Seeder {
            count: 500,
            max_key: 2000,
        }
    }
}
