//! Geometric level generator.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use thiserror::Error;

use crate::level_generator::LevelGenerator;

/// Number of levels used when none is specified.
pub(crate) const DEFAULT_TOTAL: usize = 5;

/// Promotion probability used when none is specified.
pub(crate) const DEFAULT_P: f64 = 0.5;

#[derive(Error, Debug, PartialEq, Eq)]
/// Errors that can occur when creating a [`Geometric`] level generator.
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum GeometricError {
    /// The maximum number of levels must be non-zero.
    #[error("max must be non-zero.")]
    ZeroMax,
    /// The maximum number of levels must be less than `i32::MAX`.
    #[error("max must be less than i32::MAX.")]
    MaxTooLarge,
    /// The probability `$p$` must be in the range `$(0, 1)$`.
    #[error("p must be in (0, 1).")]
    InvalidProbability,
}

/// A level generator using a geometric distribution.
///
/// Each new node starts at level 0 and is promoted one level at a time, each
/// promotion being an independent coin flip that succeeds with probability
/// `$p$`. The first failed flip stops the promotion, as does reaching the top
/// level. The resulting level is geometrically distributed, capped at
/// `$\text{total} - 1$`.
///
/// The random number generator defaults to a [`SmallRng`] seeded from the
/// thread-local generator, but any [`Rng`] can be supplied through
/// [`with_rng`][Geometric::with_rng].
#[derive(Debug)]
pub struct Geometric<R = SmallRng> {
    /// The total number of levels that are assumed to exist.
    total: usize,
    /// The probability that a node is present in the next level.
    p: f64,
    /// The random number generator.
    rng: R,
}

impl Geometric {
    /// Create a new geometric level generator with `total` number of levels,
    /// and `p` as the probability that a given node is present in the next
    /// level.
    ///
    /// # Errors
    ///
    /// `p` must be strictly between 0 and 1, and `total` must be at least 1
    /// and fit in an `i32`.
    #[inline]
    pub fn new(total: usize, p: f64) -> Result<Self, GeometricError> {
        Self::with_rng(total, p, SmallRng::from_rng(&mut rand::rng()))
    }

    /// Generator with `total` levels and a promotion probability of one half.
    ///
    /// A zero `total` is raised to a single level.
    #[inline]
    pub(crate) fn with_total(total: usize) -> Self {
        Geometric {
            total: total.max(1),
            p: DEFAULT_P,
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }
}

impl<R: Rng> Geometric<R> {
    /// Create a new geometric level generator drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Same as [`Geometric::new`].
    #[inline]
    pub fn with_rng(total: usize, p: f64, rng: R) -> Result<Self, GeometricError> {
        if total == 0 {
            return Err(GeometricError::ZeroMax);
        }
        if i32::try_from(total).is_err() {
            return Err(GeometricError::MaxTooLarge);
        }
        if !(0.0 < p && p < 1.0) {
            return Err(GeometricError::InvalidProbability);
        }
        Ok(Geometric { total, p, rng })
    }

    /// The probability that a node is promoted to the next level.
    #[must_use]
    #[inline]
    pub fn probability(&self) -> f64 {
        self.p
    }
}

impl Default for Geometric {
    /// Five levels with a promotion probability of one half.
    #[inline]
    fn default() -> Self {
        Self::with_total(DEFAULT_TOTAL)
    }
}

impl<R: Rng> LevelGenerator for Geometric<R> {
    #[inline]
    fn total(&self) -> usize {
        self.total
    }

    #[inline]
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "h is bounded by total - 1"
    )]
    fn level(&mut self) -> usize {
        let mut h = 0;
        while h + 1 < self.total && self.rng.random::<f64>() < self.p {
            h += 1;
        }
        h
    }
}
