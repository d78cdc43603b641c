//! Error types for the AUPRO metric.

use thiserror::Error;

/// The error type for AUPRO accumulation and computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuproError {
    /// Error for when the accumulated targets leave the `[0, 1]` interval.
    #[error("targets must lie in the interval [0, 1], but found interval was [{min}, {max}]")]
    InputRange {
        /// Smallest target value observed.
        min: f64,
        /// Largest target value observed.
        max: f64,
    },

    /// Error for when a prediction batch and its target batch disagree in shape.
    #[error("prediction shape {predictions:?} does not match target shape {targets:?}")]
    ShapeMismatch {
        /// Shape of the prediction tensor.
        predictions: Vec<usize>,
        /// Shape of the target tensor.
        targets: Vec<usize>,
    },

    /// Error for when a `[batch, channel, height, width]` input has more than one channel.
    #[error("invalid channel count: expected 1, got {actual}")]
    InvalidChannels {
        /// The channel count that was provided.
        actual: usize,
    },

    /// Error for when `compute` is called before any `update`.
    #[error("no predictions or targets have been accumulated")]
    EmptyState,

    /// Error for when the global ROC curve has fewer than two points under the fpr limit.
    #[error(
        "PRO curve is degenerate: {points} point(s) with fpr <= {fpr_limit}, at least 2 are required"
    )]
    DegenerateCurve {
        /// Number of usable curve points.
        points: usize,
        /// The configured false positive rate limit.
        fpr_limit: f64,
    },

    /// Error for when the averaged PRO curve never leaves `fpr = 0`, so it cannot be normalized.
    #[error("PRO curve ends at fpr 0 under fpr_limit {fpr_limit}; the area cannot be normalized")]
    ZeroFprEndpoint {
        /// The configured false positive rate limit.
        fpr_limit: f64,
    },

    /// Error for when a labeler returns a label map of the wrong size.
    #[error("label map has {actual} entries, expected {expected}")]
    LabelMapSize {
        /// Number of pixels in the labeled image.
        expected: usize,
        /// Number of labels returned.
        actual: usize,
    },

    /// Error for when the targets contain no foreground region at all.
    #[error("targets contain no anomalous region to evaluate")]
    NoRegions,

    /// Error for when the configured fpr limit lies outside `(0, 1]`.
    #[error("fpr_limit must lie in (0, 1], got {fpr_limit}")]
    InvalidFprLimit {
        /// The rejected limit.
        fpr_limit: f64,
    },

    /// Error for when the x-axis of an area computation is neither increasing nor decreasing.
    #[error("x values are neither increasing nor decreasing")]
    NonMonotonic,

    /// Error for when tensor data cannot be read back to the host.
    #[error("failed to convert tensor to data: {reason}")]
    TensorConversion {
        /// Description of the conversion failure.
        reason: String,
    },

    /// Error for when a curve renderer fails to produce a figure.
    #[error("failed to render figure: {reason}")]
    Render {
        /// Description of the rendering failure.
        reason: String,
    },
}

/// A specialized `Result` type for AUPRO operations.
pub type AuproResult<T> = Result<T, AuproError>;
