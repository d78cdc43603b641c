//! # AUPRO Metric
//!
//! Area Under the Per-Region Overlap curve for anomaly segmentation, implemented in Rust
//! using the Burn framework.
//!
//! Pixel-level AUROC rewards large anomalies: a model that finds one big defect and misses
//! every small one still scores well. AUPRO weights each connected anomalous region equally
//! instead, and only integrates the part of the curve up to a false positive rate limit
//! (0.3 by default), which is where a usable detector operates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aupro_metric::{AuproMetricConfig, RasterCurveRenderer};
//! use burn::prelude::*;
//!
//! # fn example<B: Backend>() -> aupro_metric::AuproResult<()> {
//! let mut metric = AuproMetricConfig::new().with_fpr_limit(0.3).init::<B>()?;
//!
//! // [batch, height, width] anomaly maps and binary masks
//! let predictions = Tensor::<B, 3>::zeros([1, 256, 256], &Default::default());
//! let targets = Tensor::<B, 3>::zeros([1, 256, 256], &Default::default());
//! metric.update(predictions, targets)?;
//!
//! println!("AUPRO: {}", metric.compute()?);
//! let (figure, title) = metric.generate_figure(&RasterCurveRenderer::default())?;
//! figure.save(format!("{title}.png"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`roc`]: ROC curve and trapezoidal area primitives
//! - [`interp`]: piecewise-linear resampling used to align region curves
//! - [`labeling`]: connected-component labeling behind [`ComponentLabeler`]
//! - [`plot`]: curve figures behind [`CurveRenderer`]
//! - [`aupro`]: the accumulating metric
//!
//! With the `train` feature, [`AuproMetric`] also implements Burn's `Metric` and `Numeric`
//! traits and takes [`AuproInput`] batches from a learner.

pub mod aupro;
pub mod error;
pub mod input;
pub mod interp;
pub mod labeling;
pub mod plot;
pub mod roc;
#[cfg(feature = "train")]
pub mod train;

// Re-export main types and traits
pub use aupro::{AuproMetric, AuproMetricConfig, ProCurve, DEFAULT_FPR_LIMIT, PRO_TITLE};
pub use error::{AuproError, AuproResult};
pub use input::AuproInput;
pub use interp::interp1d;
pub use labeling::{ComponentLabeler, ImageprocLabeler, RegionConnectivity};
pub use plot::{
    downsample, CurvePlot, CurveRenderer, LegendLocation, RasterCurveRenderer, RasterFigure,
};
pub use roc::{auc, roc, RankedScores, RocCurve};
