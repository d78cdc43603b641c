//! Input structures for the AUPRO metric.

use burn::{prelude::*, tensor::backend::Backend};
use derive_new::new;

/// AUPRO metric input.
#[derive(new, Debug, Clone)]
pub struct AuproInput<B: Backend> {
    /// Anomaly scores with shape `[batch_size, 1, height, width]`.
    pub predictions: Tensor<B, 4>,
    /// Binary ground truth with shape `[batch_size, 1, height, width]`.
    pub targets: Tensor<B, 4>,
}
