use serde::Deserialize;

use crate::Summary;

/// Default number of centroids below which [`Summary::find_index`] scans linearly instead of binary searching.
///
/// Scanning a short, contiguous slice of means is faster than the bookkeeping of a binary search, and both strategies
/// always produce the same index, so this only affects performance.
pub const DEFAULT_LINEAR_SEARCH_THRESHOLD: usize = 250;

const fn default_capacity() -> usize {
    0
}

const fn default_linear_search_threshold() -> usize {
    DEFAULT_LINEAR_SEARCH_THRESHOLD
}

/// A builder for [`Summary`].
///
/// The builder can be configured directly, or deserialized as part of a larger configuration:
///
/// ```
/// use tdigest_summary::SummaryBuilder;
///
/// let summary = SummaryBuilder::default()
///     .with_capacity(128)
///     .with_linear_search_threshold(64)
///     .build();
/// assert!(summary.is_empty());
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct SummaryBuilder {
    /// Number of centroids to reserve space for up front.
    ///
    /// This is only a hint: summaries grow past it as needed.
    ///
    /// Defaults to 0.
    #[serde(default = "default_capacity")]
    capacity: usize,

    /// Number of centroids at which lookups switch from a linear scan to a binary search.
    ///
    /// Defaults to 250.
    #[serde(default = "default_linear_search_threshold")]
    linear_search_threshold: usize,
}

impl SummaryBuilder {
    /// Sets the initial capacity, in centroids, of the summary.
    ///
    /// Defaults to 0.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the number of centroids at which lookups switch from a linear scan to a binary search.
    ///
    /// A threshold of zero always uses binary search.
    ///
    /// Defaults to 250.
    pub fn with_linear_search_threshold(mut self, threshold: usize) -> Self {
        self.linear_search_threshold = threshold;
        self
    }

    /// Builds the summary.
    pub fn build(self) -> Summary {
        Summary::from_builder(self.capacity, self.linear_search_threshold)
    }
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            linear_search_threshold: default_linear_search_threshold(),
        }
    }
}
