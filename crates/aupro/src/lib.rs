//! AUPRO evaluation for anomaly segmentation maps.
//!
//! This crate ties the image loader and the metric together and hosts the `aupro`
//! command-line evaluator.

pub mod backend;
pub mod eval;

#[doc(inline)]
pub use aupro_metric as metric;
#[doc(inline)]
pub use aupro_util as util;
pub use backend::{create_device, SelectedBackend, SelectedDevice, BACKEND_NAME};
pub use eval::{load_metric_config, run_evaluation, EvalConfig, EvalReport};
