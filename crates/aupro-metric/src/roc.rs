//! ROC curve and area primitives.
//!
//! The per-region analysis evaluates many ROC curves over the same scores with different
//! positive classes. [`RankedScores`] sorts the scores once and reuses that ranking for
//! every curve, since only the labels change between calls.

use crate::error::{AuproError, AuproResult};

/// False/true positive rates at each distinct score threshold.
///
/// The first point is always `(0, 0)` with a threshold one above the highest score, so
/// that every curve starts at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    /// False positive rate per threshold, non-decreasing.
    pub fpr: Vec<f64>,
    /// True positive rate per threshold, non-decreasing.
    pub tpr: Vec<f64>,
    /// Score threshold of each point, decreasing.
    pub thresholds: Vec<f32>,
}

impl RocCurve {
    /// Number of points on the curve.
    pub fn len(&self) -> usize {
        self.fpr.len()
    }

    /// Whether the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.fpr.is_empty()
    }
}

/// Scores sorted in descending order together with the end of every tie run.
#[derive(Debug, Clone)]
pub struct RankedScores<'a> {
    scores: &'a [f32],
    order: Vec<usize>,
    run_ends: Vec<usize>,
}

impl<'a> RankedScores<'a> {
    /// Ranks `scores` from highest to lowest.
    pub fn new(scores: &'a [f32]) -> Self {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_unstable_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let run_ends = (0..order.len())
            .filter(|&pos| {
                pos + 1 == order.len() || scores[order[pos]] != scores[order[pos + 1]]
            })
            .collect();

        Self {
            scores,
            order,
            run_ends,
        }
    }

    /// Number of ranked scores.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether there are no scores.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of distinct score values.
    pub fn num_thresholds(&self) -> usize {
        self.run_ends.len()
    }

    /// Builds the ROC curve for the positive class selected by `is_positive`.
    ///
    /// `is_positive` receives indices into the original score slice. When `fpr_limit` is
    /// given the curve stops before the first point whose fpr exceeds it; since fpr never
    /// decreases this is exactly the set of points with `fpr <= fpr_limit`.
    ///
    /// A class without members yields an all-zero rate, matching the usual convention of
    /// reporting zero instead of dividing by zero.
    pub fn roc<F>(&self, is_positive: F, fpr_limit: Option<f64>) -> RocCurve
    where
        F: Fn(usize) -> bool,
    {
        let total = self.order.len();
        let positives = (0..total).filter(|&i| is_positive(i)).count();
        let negatives = total - positives;

        let top = self
            .order
            .first()
            .map_or(f32::INFINITY, |&i| self.scores[i] + 1.0);

        let mut fpr = Vec::with_capacity(self.run_ends.len() + 1);
        let mut tpr = Vec::with_capacity(self.run_ends.len() + 1);
        let mut thresholds = Vec::with_capacity(self.run_ends.len() + 1);
        fpr.push(0.0);
        tpr.push(0.0);
        thresholds.push(top);

        let mut true_positives = 0usize;
        let mut start = 0usize;
        for &end in &self.run_ends {
            true_positives += self.order[start..=end]
                .iter()
                .filter(|&&i| is_positive(i))
                .count();
            start = end + 1;

            let false_positives = end + 1 - true_positives;
            let false_positive_rate = rate(false_positives, negatives);
            if fpr_limit.is_some_and(|limit| false_positive_rate > limit) {
                break;
            }

            fpr.push(false_positive_rate);
            tpr.push(rate(true_positives, positives));
            thresholds.push(self.scores[self.order[end]]);
        }

        RocCurve {
            fpr,
            tpr,
            thresholds,
        }
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Computes the full ROC curve of `scores` against binary `targets`.
///
/// # Panics
/// Panics if the slices differ in length.
pub fn roc(scores: &[f32], targets: &[bool]) -> RocCurve {
    assert_eq!(scores.len(), targets.len(), "scores/targets lengths differ");
    RankedScores::new(scores).roc(|i| targets[i], None)
}

/// Area under a curve by the trapezoidal rule.
///
/// `x` may be non-decreasing or non-increasing; a decreasing axis yields the same positive
/// area as its reversal. An axis that changes direction is rejected.
///
/// # Panics
/// Panics if the slices differ in length.
pub fn auc(x: &[f64], y: &[f64]) -> AuproResult<f64> {
    assert_eq!(x.len(), y.len(), "x/y lengths differ");

    let steps = || x.windows(2).map(|w| w[1] - w[0]);
    let direction = if steps().any(|dx| dx < 0.0) {
        if steps().all(|dx| dx <= 0.0) {
            -1.0
        } else {
            return Err(AuproError::NonMonotonic);
        }
    } else {
        1.0
    };

    let area: f64 = x
        .windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[0] + ys[1]) / 2.0)
        .sum();

    Ok(direction * area)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::*;

    use super::*;

    #[test]
    fn roc_known_curve_points() {
        let scores = [0.9, 0.8, 0.7, 0.6, 0.5];
        let targets = [true, false, true, false, false];

        let curve = roc(&scores, &targets);

        assert_eq!(curve.len(), 6);
        let expected_fpr = [0.0, 0.0, 1.0 / 3.0, 1.0 / 3.0, 2.0 / 3.0, 1.0];
        let expected_tpr = [0.0, 0.5, 0.5, 1.0, 1.0, 1.0];
        for i in 0..curve.len() {
            assert_relative_eq!(curve.fpr[i], expected_fpr[i], epsilon = 1e-12);
            assert_relative_eq!(curve.tpr[i], expected_tpr[i], epsilon = 1e-12);
        }
        assert_relative_eq!(curve.thresholds[0], 1.9, epsilon = 1e-6);
    }

    #[test]
    fn roc_merges_tied_scores() {
        let scores = [0.5, 0.5, 0.2, 0.2];
        let targets = [true, false, true, false];

        let ranked = RankedScores::new(&scores);
        assert_eq!(ranked.num_thresholds(), 2);

        let curve = ranked.roc(|i| targets[i], None);
        assert_eq!(curve.fpr, vec![0.0, 0.5, 1.0]);
        assert_eq!(curve.tpr, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn roc_without_negatives_has_zero_fpr() {
        let scores = [0.3, 0.1];
        let curve = roc(&scores, &[true, true]);

        assert!(curve.fpr.iter().all(|&f| f == 0.0));
        assert_eq!(curve.tpr.last().copied(), Some(1.0));
    }

    #[test]
    fn roc_without_positives_has_zero_tpr() {
        let scores = [0.3, 0.1];
        let curve = roc(&scores, &[false, false]);

        assert!(curve.tpr.iter().all(|&t| t == 0.0));
        assert_eq!(curve.fpr.last().copied(), Some(1.0));
    }

    #[rstest]
    #[case(0.0, 2)]
    #[case(0.25, 2)]
    #[case(0.5, 4)]
    #[case(1.0, 6)]
    fn roc_stops_at_fpr_limit(#[case] limit: f64, #[case] expected_len: usize) {
        let scores = [0.9, 0.8, 0.7, 0.6, 0.5];
        let targets = [true, false, true, false, false];

        let curve = RankedScores::new(&scores).roc(|i| targets[i], Some(limit));

        assert_eq!(curve.len(), expected_len);
        assert!(curve.fpr.iter().all(|&f| f <= limit));
    }

    #[test]
    fn ranked_scores_are_reusable_across_classes() {
        let scores = [0.9, 0.1, 0.8, 0.2];
        let ranked = RankedScores::new(&scores);

        let first = ranked.roc(|i| i == 0, None);
        let second = ranked.roc(|i| i == 1, None);

        assert_eq!(first.tpr[1], 1.0);
        assert_eq!(second.tpr[1], 0.0);
        assert_eq!(second.tpr.last().copied(), Some(1.0));
    }

    #[test]
    fn auc_of_perfect_ranking_is_one() {
        let curve = roc(&[0.9, 0.8, 0.2, 0.1], &[true, true, false, false]);
        assert_relative_eq!(auc(&curve.fpr, &curve.tpr).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn auc_accepts_decreasing_axis() {
        let area = auc(&[1.0, 0.5, 0.0], &[1.0, 0.5, 0.0]).unwrap();
        assert_relative_eq!(area, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn auc_rejects_non_monotonic_axis() {
        assert_eq!(
            auc(&[0.0, 1.0, 0.5], &[0.0, 1.0, 1.0]),
            Err(AuproError::NonMonotonic)
        );
    }
}
