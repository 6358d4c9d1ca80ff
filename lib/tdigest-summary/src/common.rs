use float_cmp::ApproxEqRatio as _;

/// Returns `true` if two centroid means are equal, or close enough to differ only by floating-point noise.
///
/// NaN is the mean of [`Centroid::INVALID`][crate::Centroid::INVALID], so NaN compares equal to NaN here: lookups that
/// find nothing can then be asserted against the sentinel directly. Exactly equal values, infinities included, match
/// before the ratio check, which only tolerates a relative difference of 0.000001%.
pub(crate) fn float_eq(l_value: f64, r_value: f64) -> bool {
    const RATIO_ERROR: f64 = 0.00000001;

    (l_value.is_nan() && r_value.is_nan()) || l_value == r_value || l_value.approx_eq_ratio(&r_value, RATIO_ERROR)
}
