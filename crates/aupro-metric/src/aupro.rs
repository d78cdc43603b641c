//! AUPRO (Area Under Per-Region Overlap) metric.
//!
//! Every connected anomalous region in the ground truth gets its own ROC curve, treating the
//! region as the positive class against all pixels. The overlap of a region with the
//! thresholded prediction is exactly that curve's tpr, so averaging the per-region curves
//! gives the PRO curve. Region curves have different lengths; each one is resampled onto a
//! shared grid whose length is the number of global ROC points below the fpr limit. The
//! score is the area under the averaged curve, normalized by its final fpr.

use std::collections::BTreeSet;

use burn::{
    prelude::*,
    tensor::{backend::Backend, DType},
};

use crate::{
    error::{AuproError, AuproResult},
    interp::interp1d,
    labeling::{ComponentLabeler, ImageprocLabeler, RegionConnectivity},
    plot::{CurvePlot, CurveRenderer, LegendLocation},
    roc::{auc, RankedScores, RocCurve},
};

/// Default upper bound of the integrated false positive rate.
pub const DEFAULT_FPR_LIMIT: f64 = 0.3;

/// Target values at or above this are anomalous.
const FOREGROUND_THRESHOLD: f32 = 0.5;

/// Title and logging key of the PRO figure.
pub const PRO_TITLE: &str = "PRO";

// --- AUPRO Metric ---

/// Configuration for the AUPRO metric.
#[derive(Config, Debug)]
pub struct AuproMetricConfig {
    /// Largest global false positive rate included in the area, in `(0, 1]`.
    #[config(default = 0.3)]
    pub fpr_limit: f64,
    /// Adjacency used to split the ground truth into regions.
    #[config(default = "RegionConnectivity::Eight")]
    pub connectivity: RegionConnectivity,
}

impl AuproMetricConfig {
    /// Builds the metric.
    ///
    /// # Errors
    ///
    /// Returns [`AuproError::InvalidFprLimit`] if `fpr_limit` is outside `(0, 1]`.
    pub fn init<B: Backend>(&self) -> AuproResult<AuproMetric<B>> {
        if !(self.fpr_limit > 0.0 && self.fpr_limit <= 1.0) {
            return Err(AuproError::InvalidFprLimit {
                fpr_limit: self.fpr_limit,
            });
        }

        Ok(AuproMetric {
            predictions: Vec::new(),
            targets: Vec::new(),
            fpr_limit: self.fpr_limit,
            labeler: ImageprocLabeler::new(&self.connectivity),
        })
    }
}

/// Averaged per-region overlap curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ProCurve {
    /// Averaged global false positive rate.
    pub fpr: Vec<f64>,
    /// Averaged per-region true positive rate (overlap).
    pub tpr: Vec<f64>,
}

/// Accumulating AUPRO metric.
///
/// Batches are buffered by [`update`](Self::update) and only evaluated by
/// [`compute`](Self::compute). Buffers from other workers are combined with
/// [`merge`](Self::merge), which concatenates them; the result does not depend on the order
/// regions are visited in.
#[derive(Debug, Clone)]
pub struct AuproMetric<B: Backend, L = ImageprocLabeler> {
    predictions: Vec<Tensor<B, 3>>,
    targets: Vec<Tensor<B, 3>>,
    fpr_limit: f64,
    labeler: L,
}

impl<B: Backend> Default for AuproMetric<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> AuproMetric<B> {
    /// Creates a metric with `fpr_limit = 0.3` and 8-connected regions.
    pub fn new() -> Self {
        Self {
            predictions: Vec::new(),
            targets: Vec::new(),
            fpr_limit: DEFAULT_FPR_LIMIT,
            labeler: ImageprocLabeler::default(),
        }
    }
}

impl<B: Backend, L: ComponentLabeler> AuproMetric<B, L> {
    /// Replaces the connected-component algorithm, keeping any buffered batches.
    pub fn with_labeler<L2: ComponentLabeler>(self, labeler: L2) -> AuproMetric<B, L2> {
        AuproMetric {
            predictions: self.predictions,
            targets: self.targets,
            fpr_limit: self.fpr_limit,
            labeler,
        }
    }

    /// The configured false positive rate limit.
    pub fn fpr_limit(&self) -> f64 {
        self.fpr_limit
    }

    /// Number of buffered batches.
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    /// Whether no batch has been buffered.
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Buffers one batch.
    ///
    /// # Arguments
    /// * `predictions` - Anomaly scores with shape `[batch_size, height, width]`
    /// * `targets` - Binary ground truth with the same shape
    ///
    /// # Errors
    ///
    /// Returns [`AuproError::ShapeMismatch`] if the shapes differ; nothing is buffered then.
    pub fn update(&mut self, predictions: Tensor<B, 3>, targets: Tensor<B, 3>) -> AuproResult<()> {
        let (pred_dims, target_dims) = (predictions.dims(), targets.dims());
        if pred_dims != target_dims {
            return Err(AuproError::ShapeMismatch {
                predictions: pred_dims.to_vec(),
                targets: target_dims.to_vec(),
            });
        }

        self.predictions.push(predictions);
        self.targets.push(targets);
        Ok(())
    }

    /// Buffers one batch in `[batch_size, 1, height, width]` layout.
    ///
    /// # Errors
    ///
    /// Returns [`AuproError::ShapeMismatch`] if the shapes differ and
    /// [`AuproError::InvalidChannels`] if there is more than one channel.
    pub fn update_4d(
        &mut self,
        predictions: Tensor<B, 4>,
        targets: Tensor<B, 4>,
    ) -> AuproResult<()> {
        let (pred_dims, target_dims) = (predictions.dims(), targets.dims());
        if pred_dims != target_dims {
            return Err(AuproError::ShapeMismatch {
                predictions: pred_dims.to_vec(),
                targets: target_dims.to_vec(),
            });
        }
        if pred_dims[1] != 1 {
            return Err(AuproError::InvalidChannels {
                actual: pred_dims[1],
            });
        }

        self.update(predictions.squeeze::<3>(1), targets.squeeze::<3>(1))
    }

    /// Appends the batches buffered by `other` after this metric's batches.
    pub fn merge(&mut self, other: Self) {
        self.predictions.extend(other.predictions);
        self.targets.extend(other.targets);
    }

    /// Drops every buffered batch.
    pub fn reset(&mut self) {
        self.predictions.clear();
        self.targets.clear();
    }

    /// Computes the averaged per-region overlap curve up to the fpr limit.
    ///
    /// # Errors
    ///
    /// * [`AuproError::EmptyState`] if nothing has been buffered
    /// * [`AuproError::InputRange`] if a target value lies outside `[0, 1]`
    /// * [`AuproError::NoRegions`] if no target pixel is anomalous
    /// * [`AuproError::DegenerateCurve`] if fewer than two global ROC points lie under the limit
    /// * [`AuproError::LabelMapSize`] if the labeler returns a map of the wrong size
    pub fn compute_curve(&self) -> AuproResult<ProCurve> {
        let pixels = self.gather()?;

        let regions: BTreeSet<u32> = pixels.labels.iter().copied().filter(|&l| l != 0).collect();
        if regions.is_empty() {
            return Err(AuproError::NoRegions);
        }

        let ranked = RankedScores::new(&pixels.scores);
        let output_size = ranked
            .roc(|i| pixels.foreground[i], Some(self.fpr_limit))
            .len();
        if output_size < 2 {
            return Err(AuproError::DegenerateCurve {
                points: output_size,
                fpr_limit: self.fpr_limit,
            });
        }

        tracing::debug!(
            output_size,
            regions = regions.len(),
            pixels = pixels.scores.len(),
            "computing PRO curve"
        );

        let mut fpr = vec![0.0; output_size];
        let mut tpr = vec![0.0; output_size];
        for &region in &regions {
            let curve = ranked.roc(|i| pixels.labels[i] == region, Some(self.fpr_limit));
            let (region_fpr, region_tpr) = resample(&curve, output_size);
            for (acc, value) in fpr.iter_mut().zip(region_fpr) {
                *acc += value;
            }
            for (acc, value) in tpr.iter_mut().zip(region_tpr) {
                *acc += value;
            }
        }

        let count = regions.len() as f64;
        fpr.iter_mut().for_each(|v| *v /= count);
        tpr.iter_mut().for_each(|v| *v /= count);

        Ok(ProCurve { fpr, tpr })
    }

    /// Computes the AUPRO score in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Same as [`compute_curve`](Self::compute_curve), plus
    /// [`AuproError::ZeroFprEndpoint`] when the averaged curve never leaves `fpr = 0`.
    pub fn compute(&self) -> AuproResult<f64> {
        let curve = self.compute_curve()?;
        self.score(&curve)
    }

    /// Renders the PRO curve and its score.
    ///
    /// Returns the figure together with its title, `"PRO"`, for use as a logging key.
    ///
    /// # Errors
    ///
    /// Same as [`compute`](Self::compute), plus whatever the renderer reports.
    pub fn generate_figure<R: CurveRenderer>(
        &self,
        renderer: &R,
    ) -> AuproResult<(R::Figure, &'static str)> {
        let curve = self.compute_curve()?;
        let score = self.score(&curve)?;

        let plot = CurvePlot {
            x: curve.fpr,
            y: curve.tpr,
            auc: score,
            xlim: (0.0, self.fpr_limit),
            ylim: (0.0, 1.0),
            xlabel: "Global FPR".to_owned(),
            ylabel: "Averaged Per-Region TPR".to_owned(),
            legend_location: LegendLocation::LowerRight,
            title: PRO_TITLE.to_owned(),
        };

        let figure = renderer.render(&plot)?;
        Ok((figure, PRO_TITLE))
    }

    fn score(&self, curve: &ProCurve) -> AuproResult<f64> {
        let area = auc(&curve.fpr, &curve.tpr)?;
        let end = curve.fpr.last().copied().unwrap_or(0.0);
        if end <= 0.0 {
            return Err(AuproError::ZeroFprEndpoint {
                fpr_limit: self.fpr_limit,
            });
        }

        let aupro = area / end;
        tracing::debug!(aupro, fpr_end = end, "computed AUPRO");
        Ok(aupro)
    }

    /// Reads every buffered batch back and labels the ground-truth regions.
    ///
    /// Labels are offset per image so that regions stay distinct across the whole set.
    fn gather(&self) -> AuproResult<Pixels> {
        if self.is_empty() {
            return Err(AuproError::EmptyState);
        }

        let targets = self
            .targets
            .iter()
            .map(|t| tensor_to_vec(t.clone()))
            .collect::<AuproResult<Vec<_>>>()?;

        let (min, max) = targets.iter().flatten().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), &v| (lo.min(f64::from(v)), hi.max(f64::from(v))),
        );
        if min < 0.0 || max > 1.0 {
            return Err(AuproError::InputRange { min, max });
        }

        let mut pixels = Pixels::default();
        let mut offset = 0u32;
        for (predictions, target) in self.predictions.iter().zip(targets) {
            let [_, height, width] = predictions.dims();
            let image_size = height * width;
            if image_size == 0 {
                continue;
            }

            pixels.scores.extend(tensor_to_vec(predictions.clone())?);

            let mask: Vec<bool> = target
                .into_iter()
                .map(|v| v >= FOREGROUND_THRESHOLD)
                .collect();
            for image in mask.chunks(image_size) {
                let labels = self.labeler.label(image, height, width);
                if labels.len() != image_size {
                    return Err(AuproError::LabelMapSize {
                        expected: image_size,
                        actual: labels.len(),
                    });
                }
                let max_label = labels.iter().copied().max().unwrap_or(0);
                pixels
                    .labels
                    .extend(labels.into_iter().map(|l| if l == 0 { 0 } else { l + offset }));
                offset += max_label;
            }
            pixels.foreground.extend(mask);
        }

        if pixels.scores.is_empty() {
            return Err(AuproError::EmptyState);
        }
        Ok(pixels)
    }
}

/// Flattened host copy of the buffered batches.
#[derive(Debug, Default)]
struct Pixels {
    scores: Vec<f32>,
    foreground: Vec<bool>,
    labels: Vec<u32>,
}

/// Resamples a truncated region curve onto `0..output_size`.
///
/// Retained point `i` of `n` is placed at `i / (n - 1) * (output_size - 1)`. A curve with a
/// single retained point (the region is only reached beyond the fpr limit) stays flat at
/// that point.
fn resample(curve: &RocCurve, output_size: usize) -> (Vec<f64>, Vec<f64>) {
    let retained = curve.len();
    if retained < 2 {
        return (
            vec![curve.fpr[0]; output_size],
            vec![curve.tpr[0]; output_size],
        );
    }

    let last = (retained - 1) as f64;
    let span = (output_size - 1) as f64;
    let positions: Vec<f64> = (0..retained).map(|i| i as f64 / last * span).collect();
    let grid: Vec<f64> = (0..output_size).map(|i| i as f64).collect();

    (
        interp1d(&positions, &curve.fpr, &grid),
        interp1d(&positions, &curve.tpr, &grid),
    )
}

fn tensor_to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> AuproResult<Vec<f32>> {
    tensor
        .into_data()
        .convert_dtype(DType::F32)
        .to_vec::<f32>()
        .map_err(|e| AuproError::TensorConversion {
            reason: format!("{e:?}"),
        })
}
