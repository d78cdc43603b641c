//! Piecewise-linear resampling of 1D signals.

use num_traits::Float;

/// Interpolates a 1D signal linearly at new sampling points.
///
/// For every query point the left knot is found with a left-sided binary search on `old_x`
/// and clamped to `[0, old_x.len() - 2]`, so queries outside the knot range extend the first
/// or last segment. The slope denominator is padded with `F::epsilon()`, which keeps repeated
/// x-values from dividing by zero.
///
/// # Arguments
/// * `old_x` - Sorted knot positions (same length as `old_y`)
/// * `old_y` - Knot values
/// * `new_x` - Positions where the signal should be evaluated
///
/// # Panics
/// Panics if fewer than two knots are given or the knot slices differ in length.
pub fn interp1d<F: Float>(old_x: &[F], old_y: &[F], new_x: &[F]) -> Vec<F> {
    assert!(old_x.len() >= 2, "interp1d requires at least two knots");
    assert_eq!(old_x.len(), old_y.len(), "knot x/y lengths differ");

    let eps = F::epsilon();
    let last_segment = old_x.len() - 2;

    new_x
        .iter()
        .map(|&x| {
            // searchsorted gives the insertion point; the left neighbour sits one before it.
            let idx = old_x
                .partition_point(|&knot| knot < x)
                .saturating_sub(1)
                .min(last_segment);
            let slope = (old_y[idx + 1] - old_y[idx]) / (eps + (old_x[idx + 1] - old_x[idx]));
            old_y[idx] + slope * (x - old_x[idx])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::*;

    use super::*;

    #[test]
    fn interp1d_is_exact_at_knots() {
        let x = [0.0_f64, 1.0, 2.5, 4.0, 7.0];
        let y = [0.0_f64, 0.2, 0.9, 0.4, 1.0];

        let resampled = interp1d(&x, &y, &x);

        for (value, expected) in resampled.iter().zip(y) {
            assert_relative_eq!(*value, expected, epsilon = 1e-9);
        }
    }

    #[rstest]
    #[case(0.5, 0.0, 1.0)]
    #[case(1.25, 1.0, 3.0)]
    #[case(2.75, 3.0, 4.0)]
    fn interp1d_stays_between_neighbouring_knots(
        #[case] query: f64,
        #[case] lower: f64,
        #[case] upper: f64,
    ) {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 3.0, 4.0];

        let value = interp1d(&x, &y, &[query])[0];

        assert!(value >= lower && value <= upper, "{value} not in [{lower}, {upper}]");
    }

    #[test]
    fn interp1d_midpoint_is_linear() {
        let value = interp1d(&[0.0_f32, 2.0], &[1.0, 3.0], &[1.0])[0];
        assert_relative_eq!(value, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn interp1d_extends_edge_segments() {
        let x = [1.0, 2.0, 3.0];
        let y = [10.0, 20.0, 30.0];

        let values = interp1d(&x, &y, &[0.0, 4.0]);

        assert_relative_eq!(values[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(values[1], 40.0, epsilon = 1e-6);
    }

    #[test]
    fn interp1d_handles_repeated_knots() {
        let x = [0.0, 1.0, 1.0, 2.0];
        let y = [0.0, 0.5, 0.5, 1.0];

        let values = interp1d(&x, &y, &[0.5, 1.0, 1.5]);

        assert!(values.iter().all(|v| v.is_finite()));
        assert_relative_eq!(values[0], 0.25, epsilon = 1e-9);
        assert_relative_eq!(values[2], 0.75, epsilon = 1e-9);
    }

    #[test]
    #[should_panic(expected = "at least two knots")]
    fn interp1d_rejects_single_knot() {
        interp1d(&[0.0], &[1.0], &[0.0]);
    }
}
