//! Skiplists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level `$n > 0$` will contain a random subset of the nodes on level `$n - 1$`.
//!
//! Most commonly, a geometric distribution is used whereby the chance that a
//! node occupies level `$n$` is `$p$` times the chance of occupying level
//! `$n-1$` (with `$0 < p < 1$`).
//!
//! The generator is a parameter of the [`SkipList`][crate::SkipList] so that
//! the source of randomness can be swapped out, for instance for a seeded
//! generator in tests where the shape of the list must be reproducible.

pub mod geometric;

pub use geometric::{Geometric, GeometricError};

/// Upon the insertion of a new node in the list, the node is replicated to high
/// levels with a certain probability as determined by a [`LevelGenerator`].
pub trait LevelGenerator {
    /// The total number of levels that are assumed to exist.
    #[must_use]
    fn total(&self) -> usize;

    /// Generate a random level for a new node in the range `$[0, \text{total})$`.
    ///
    /// This function should _never_ return a level greater or equal to
    /// [`total`][LevelGenerator::total]. The skiplist clamps any such value
    /// regardless.
    #[must_use]
    fn level(&mut self) -> usize;
}
