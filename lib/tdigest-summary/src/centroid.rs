//! Weighted centroid representation.

use crate::common::float_eq;

/// A weighted point summarizing a cluster of observations.
///
/// Centroids handed out by [`Summary`][crate::Summary] are copies: mutating one has no effect on the summary it came
/// from. Lookups that find nothing return [`Centroid::INVALID`] rather than an error, so callers must check
/// [`is_valid`][Centroid::is_valid] (or convert with [`valid`][Centroid::valid]) before trusting the mean or count.
#[derive(Clone, Copy, Debug)]
pub struct Centroid {
    /// Mean of all observations merged into this centroid.
    mean: f64,

    /// Total weight of all observations merged into this centroid.
    count: u64,

    /// Position within the summary at the time this copy was taken.
    index: usize,
}

impl Centroid {
    /// The "no such centroid" sentinel: NaN mean and zero count.
    pub const INVALID: Centroid = Centroid {
        mean: f64::NAN,
        count: 0,
        index: 0,
    };

    /// Creates a new centroid with the given mean and count.
    pub const fn new(mean: f64, count: u64) -> Self {
        Self { mean, count, index: 0 }
    }

    pub(crate) const fn at_index(mean: f64, count: u64, index: usize) -> Self {
        Self { mean, count, index }
    }

    /// Returns the mean of the centroid.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Returns the count, or weight, of the centroid.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the position this centroid occupied in its summary when it was looked up.
    ///
    /// This is only a hint: any later mutation of the summary can move the centroid elsewhere.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if the mean is not NaN and the count is non-zero.
    pub fn is_valid(&self) -> bool {
        !self.mean.is_nan() && self.count > 0
    }

    /// Returns `Some(self)` if the centroid is valid, or `None` if it is the invalid sentinel.
    pub fn valid(self) -> Option<Self> {
        if self.is_valid() {
            Some(self)
        } else {
            None
        }
    }

    /// Merges `weight` observations at value `x` into this centroid.
    ///
    /// The weight is applied first and the mean is then recentered against the updated count, which keeps the running
    /// mean stable even once the accumulated count is very large. Callers must ensure `weight` is non-zero.
    ///
    /// The count saturates at `u64::MAX`. Merging at the centroid's own mean never moves it, including when the mean is
    /// infinite.
    pub fn update(&mut self, x: f64, weight: u64) {
        self.count = self.count.saturating_add(weight);

        // `inf - inf` is NaN, so an exact match must skip recentering rather than rely on it being a no-op.
        if x != self.mean {
            self.mean += weight as f64 * (x - self.mean) / self.count as f64;
        }
    }
}

impl Default for Centroid {
    fn default() -> Self {
        Self::INVALID
    }
}

impl PartialEq for Centroid {
    fn eq(&self, other: &Self) -> bool {
        // The index is a lookup-time hint and not part of a centroid's identity.
        self.count == other.count && float_eq(self.mean, other.mean)
    }
}
