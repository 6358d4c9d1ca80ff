//! Sorted centroid storage.

use ordered_float::OrderedFloat;
use rand::Rng;
use tracing::{debug, trace};

use crate::common::float_eq;
use crate::config::SummaryBuilder;
use crate::error::{MismatchedLengthsSnafu, NanMeanSnafu, SummaryError, UnorderedSnafu, ZeroWeightSnafu};
use crate::Centroid;

/// An ordered collection of centroids.
///
/// Centroids are stored as two index-aligned vectors, one of means and one of counts, with the means kept strictly
/// ascending. Adding a point whose mean already exists merges it into that centroid rather than creating a duplicate,
/// so the number of centroids only ever grows by one per distinct mean.
///
/// ## Shuffling
///
/// Merging one summary into another in ascending order is a pathological case for t-digest compression, so
/// [`shuffle`][Summary::shuffle] can randomly permute the centroids beforehand. While shuffled, the ordering invariant
/// does not hold, and any ordered lookup ([`find_index`][Summary::find_index], [`add`][Summary::add], the neighbor
/// queries, [`min`][Summary::min]/[`max`][Summary::max]) produces meaningless results until
/// [`unshuffle`][Summary::unshuffle] is called, and searching panics in debug builds. Positional access and iteration
/// remain usable.
///
/// ## Concurrency
///
/// A summary carries no internal synchronization. Callers sharing one between threads must serialize mutation
/// themselves.
#[derive(Clone, Debug)]
pub struct Summary {
    /// Centroid means, strictly ascending outside of the shuffled state.
    means: Vec<f64>,

    /// Centroid counts, aligned with `means`.
    counts: Vec<u64>,

    /// Length below which lookups scan linearly.
    linear_search_threshold: usize,

    /// Whether the centroids have been shuffled and not yet re-sorted.
    shuffled: bool,
}

impl Summary {
    /// Creates an empty summary with the default configuration.
    pub fn new() -> Self {
        SummaryBuilder::default().build()
    }

    /// Creates an empty summary with space reserved for `capacity` centroids.
    ///
    /// The capacity is only a hint, and the summary grows beyond it as needed.
    pub fn with_capacity(capacity: usize) -> Self {
        SummaryBuilder::default().with_capacity(capacity).build()
    }

    /// Returns a builder for configuring a summary.
    pub fn builder() -> SummaryBuilder {
        SummaryBuilder::default()
    }

    pub(crate) fn from_builder(capacity: usize, linear_search_threshold: usize) -> Self {
        Self {
            means: Vec::with_capacity(capacity),
            counts: Vec::with_capacity(capacity),
            linear_search_threshold,
            shuffled: false,
        }
    }

    /// Rebuilds a summary from its means and counts, as previously read through [`means`][Summary::means] and
    /// [`counts`][Summary::counts].
    ///
    /// ## Errors
    ///
    /// Returns an error if the two sequences have differing lengths, if any mean is NaN, if any count is zero, or if
    /// the means are not strictly ascending.
    pub fn from_parts(means: Vec<f64>, counts: Vec<u64>) -> Result<Self, SummaryError> {
        if means.len() != counts.len() {
            return MismatchedLengthsSnafu {
                means: means.len(),
                counts: counts.len(),
            }
            .fail();
        }

        for (index, (&mean, &count)) in means.iter().zip(&counts).enumerate() {
            if mean.is_nan() {
                return NanMeanSnafu.fail();
            }

            if count == 0 {
                return ZeroWeightSnafu { mean }.fail();
            }

            if index > 0 && means[index - 1] >= mean {
                return UnorderedSnafu { index }.fail();
            }
        }

        trace!(centroids = means.len(), "Rebuilt summary from parts.");

        let mut summary = Self::new();
        summary.means = means;
        summary.counts = counts;
        Ok(summary)
    }

    /// Returns the number of centroids in the summary.
    pub fn len(&self) -> usize {
        self.means.len()
    }

    /// Returns `true` if the summary contains no centroids.
    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    /// Returns the number of centroids the summary can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.means.capacity().min(self.counts.capacity())
    }

    /// Returns `true` if the summary has been shuffled and not yet re-sorted.
    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Returns the centroid means.
    ///
    /// Outside of the shuffled state, these are strictly ascending.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Returns the centroid counts, aligned with [`means`][Summary::means].
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Removes all centroids from the summary, keeping its allocated capacity.
    pub fn clear(&mut self) {
        self.means.clear();
        self.counts.clear();
        self.shuffled = false;
    }

    /// Adds `weight` observations at `mean` to the summary.
    ///
    /// If a centroid with exactly this mean already exists, the observations are merged into it. Otherwise, a new
    /// centroid is inserted at the position that keeps the means ascending.
    ///
    /// ## Errors
    ///
    /// Returns an error if `mean` is NaN or `weight` is zero. The summary is left unmodified in either case.
    pub fn add(&mut self, mean: f64, weight: u64) -> Result<(), SummaryError> {
        if mean.is_nan() {
            debug!(weight, "Rejected centroid with NaN mean.");
            return NanMeanSnafu.fail();
        }

        if weight == 0 {
            debug!(mean, "Rejected centroid with zero weight.");
            return ZeroWeightSnafu { mean }.fail();
        }

        let idx = self.find_index(mean);
        if self.mean_at_index_is(idx, mean) {
            self.update_at(idx, mean, weight);
        } else {
            self.means.insert(idx, mean);
            self.counts.insert(idx, weight);
        }

        Ok(())
    }

    /// Returns the centroid whose mean is exactly `x`, or [`Centroid::INVALID`] if there is none.
    pub fn find(&self, x: f64) -> Centroid {
        let idx = self.find_index(x);
        if self.mean_at_index_is(idx, x) {
            self.at(idx)
        } else {
            Centroid::INVALID
        }
    }

    /// Returns the index of the first centroid whose mean is greater than or equal to `x`.
    ///
    /// If every mean is smaller than `x` (or `x` is NaN), the length of the summary is returned.
    pub fn find_index(&self, x: f64) -> usize {
        debug_assert!(!self.shuffled, "ordered lookups are not valid while the summary is shuffled");

        if self.means.len() < self.linear_search_threshold {
            linear_find_index(&self.means, x)
        } else {
            binary_find_index(&self.means, x)
        }
    }

    /// Returns the centroid at `index`, or [`Centroid::INVALID`] if `index` is out of bounds.
    pub fn at(&self, index: usize) -> Centroid {
        if index < self.means.len() {
            Centroid::at_index(self.means[index], self.counts[index], index)
        } else {
            Centroid::INVALID
        }
    }

    /// Returns the centroid with the smallest mean, or [`Centroid::INVALID`] if the summary is empty.
    pub fn min(&self) -> Centroid {
        self.at(0)
    }

    /// Returns the centroid with the largest mean, or [`Centroid::INVALID`] if the summary is empty.
    pub fn max(&self) -> Centroid {
        match self.means.len() {
            0 => Centroid::INVALID,
            len => self.at(len - 1),
        }
    }

    /// Returns an iterator over copies of the centroids, in ascending order of mean.
    pub fn iter(&self) -> impl Iterator<Item = Centroid> + '_ {
        self.means
            .iter()
            .zip(&self.counts)
            .enumerate()
            .map(|(index, (&mean, &count))| Centroid::at_index(mean, count, index))
    }

    /// Visits each centroid in ascending order of mean.
    ///
    /// Iteration stops early as soon as `f` returns `false`.
    pub fn iterate<F>(&self, mut f: F)
    where
        F: FnMut(Centroid) -> bool,
    {
        for centroid in self.iter() {
            if !f(centroid) {
                break;
            }
        }
    }

    /// Returns the centroids immediately after and immediately before the insertion point of `mean`.
    ///
    /// The insertion point is [`find_index(mean)`][Summary::find_index]: the successor is the centroid one past it,
    /// and the predecessor is the centroid one before it. Either is [`Centroid::INVALID`] when it would fall outside
    /// the summary.
    pub fn successor_and_predecessor(&self, mean: f64) -> (Centroid, Centroid) {
        let idx = self.find_index(mean);
        let predecessor = match idx.checked_sub(1) {
            Some(prev) => self.at(prev),
            None => Centroid::INVALID,
        };

        (self.at(idx + 1), predecessor)
    }

    /// Returns the ceiling and floor centroids of `mean`.
    ///
    /// The ceiling is the centroid with the smallest mean greater than or equal to `mean`, and the floor is the one
    /// with the largest mean less than or equal to it. When a centroid with exactly this mean exists, it is both the
    /// ceiling and the floor. Either side is [`Centroid::INVALID`] when no such centroid exists.
    pub fn ceiling_and_floor(&self, mean: f64) -> (Centroid, Centroid) {
        let idx = self.find_index(mean);

        // Greater than every centroid.
        if idx == self.len() {
            return (Centroid::INVALID, self.max());
        }

        let item = self.at(idx);
        if item.is_valid() && item.mean() == mean {
            return (item, item);
        }

        // Smaller than every centroid.
        if idx == 0 {
            return (self.min(), Centroid::INVALID);
        }

        (item, self.at(idx - 1))
    }

    /// Returns the sum of the counts of every centroid before `idx`.
    ///
    /// An `idx` past the end of the summary sums every centroid. The sum saturates at `u64::MAX`.
    pub fn sum_until_index(&self, idx: usize) -> u64 {
        let end = idx.min(self.counts.len());
        sum_counts(&self.counts[..end])
    }

    /// Returns the sum of the counts of every centroid, saturating at `u64::MAX`.
    pub fn total_weight(&self) -> u64 {
        sum_counts(&self.counts)
    }

    /// Randomly permutes the centroids using the thread-local random number generator.
    ///
    /// The summary is left in the shuffled state: see the [type-level documentation][Summary] for what that allows.
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::rng());
    }

    /// Randomly permutes the centroids using the given random number generator.
    ///
    /// The summary is left in the shuffled state: see the [type-level documentation][Summary] for what that allows.
    pub fn shuffle_with<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for i in (1..self.means.len()).rev() {
            let j = rng.random_range(0..=i);
            self.swap(i, j);
        }

        self.shuffled = true;
        trace!(centroids = self.means.len(), "Shuffled summary.");
    }

    /// Re-sorts the centroids by mean, leaving the shuffled state.
    pub fn unshuffle(&mut self) {
        // Sorting pairs keeps each count attached to its mean, at the cost of one scratch allocation per call. This
        // only runs once per bulk merge, not per insertion.
        let mut centroids = self
            .means
            .iter()
            .copied()
            .zip(self.counts.iter().copied())
            .collect::<Vec<_>>();
        centroids.sort_by_key(|(mean, _)| OrderedFloat(*mean));

        for (i, (mean, count)) in centroids.into_iter().enumerate() {
            self.means[i] = mean;
            self.counts[i] = count;
        }

        self.shuffled = false;
        trace!(centroids = self.means.len(), "Unshuffled summary.");
    }

    fn mean_at_index_is(&self, index: usize, mean: f64) -> bool {
        index < self.means.len() && self.means[index] == mean
    }

    fn update_at(&mut self, index: usize, x: f64, weight: u64) {
        let mut centroid = self.at(index);
        let old_mean = centroid.mean();
        centroid.update(x, weight);

        self.means[index] = centroid.mean();
        self.counts[index] = centroid.count();

        if centroid.mean() > old_mean {
            self.adjust_right(index);
        } else if centroid.mean() < old_mean {
            self.adjust_left(index);
        }
    }

    /// Bubbles the centroid at `index` to the right until it is no larger than its right neighbor.
    fn adjust_right(&mut self, index: usize) {
        let mut i = index + 1;
        while i < self.means.len() && self.means[i - 1] > self.means[i] {
            self.swap(i - 1, i);
            i += 1;
        }
    }

    /// Bubbles the centroid at `index` to the left until it is no smaller than its left neighbor.
    fn adjust_left(&mut self, index: usize) {
        let mut i = index;
        while i > 0 && self.means[i - 1] > self.means[i] {
            self.swap(i - 1, i);
            i -= 1;
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.means.swap(i, j);
        self.counts.swap(i, j);
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Summary {
    fn eq(&self, other: &Self) -> bool {
        // The search threshold only affects performance, so it plays no part in equality.
        self.shuffled == other.shuffled
            && self.counts == other.counts
            && self.means.len() == other.means.len()
            && self.means.iter().zip(&other.means).all(|(l, r)| float_eq(*l, *r))
    }
}

fn sum_counts(counts: &[u64]) -> u64 {
    counts.iter().fold(0, |acc, count| acc.saturating_add(*count))
}

fn linear_find_index(means: &[f64], x: f64) -> usize {
    means.iter().position(|mean| *mean >= x).unwrap_or(means.len())
}

// Phrased as a negated `>=` so that a NaN query lands past the end, exactly as it does in the linear scan.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
fn binary_find_index(means: &[f64], x: f64) -> usize {
    means.partition_point(|mean| !(*mean >= x))
}
