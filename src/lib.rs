//! A skiplist is a way of storing elements in such a way that elements can be
//! efficiently accessed, inserted and removed, all in `O(log(n))` on average.
//!
//! Conceptually, a skiplist resembles something like:
//!
//! ```text
//! <head> ----------> [2] --------------------------------------------------> [9] ---------->
//! <head> ----------> [2] ------------------------------------[7] ----------> [9] ---------->
//! <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] ->
//! <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] ->
//! ```
//!
//! where each node `[x]` has references to nodes further down the list,
//! allowing the algorithm to effectively skip ahead.
//!
//! This crate provides [`SkipList`], an ordered map from `i64` keys to
//! `String` values. Nodes are held in an arena and linked by index, the height
//! of each new node is drawn from a pluggable [`LevelGenerator`], and
//! structural changes can be followed through an [`Observer`].
//!
//! ```
//! use levelmap::{SkipList, SkipListError};
//!
//! let mut skiplist = SkipList::new();
//! for (key, value) in [(10, "a"), (20, "b"), (5, "c"), (15, "d")] {
//!     skiplist.insert(key, value);
//! }
//!
//! assert_eq!(skiplist.search(15), Ok("d"));
//! assert_eq!(skiplist.delete(10), Ok("a".to_owned()));
//! assert_eq!(skiplist.search(10), Err(SkipListError::NotFound));
//! assert_eq!(skiplist.contains(5), Ok(true));
//! assert_eq!(skiplist.len(), 3);
//! ```

pub mod level_generator;
pub mod observer;
pub mod seed;
mod skiplist;
mod skipnode;

pub use crate::{
    level_generator::{Geometric, GeometricError, LevelGenerator},
    observer::{LogObserver, Observer},
    seed::{SeedError, Seeder},
    skiplist::{Iter, SkipList, SkipListError},
};
