use snafu::Snafu;

/// Errors that can occur when modifying or building a summary.
#[derive(Clone, Copy, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SummaryError {
    /// The centroid mean was NaN.
    #[snafu(display("Centroid mean must not be NaN."))]
    NanMean,

    /// The centroid weight was zero.
    #[snafu(display("Centroid weight must be greater than zero (mean: {}).", mean))]
    ZeroWeight {
        /// Mean of the rejected centroid.
        mean: f64,
    },

    /// The means and counts given to rebuild a summary had differing lengths.
    #[snafu(display("Means and counts have differing lengths ({} means, {} counts).", means, counts))]
    MismatchedLengths {
        /// Number of means given.
        means: usize,

        /// Number of counts given.
        counts: usize,
    },

    /// The means given to rebuild a summary were not strictly ascending.
    #[snafu(display("Means must be strictly ascending, but the mean at index {} is out of order.", index))]
    Unordered {
        /// Index of the first mean that is not greater than its predecessor.
        index: usize,
    },
}
