//! Burn learner integration for [`AuproMetric`].
//!
//! AUPRO is not a per-batch average, so `update` only buffers the batch and reports how
//! many batches are held; the score itself is produced by [`Numeric::value`] at the end of
//! an epoch.

use burn::{
    tensor::backend::Backend,
    train::metric::{Metric, MetricEntry, MetricMetadata, Numeric},
};

use crate::{aupro::AuproMetric, input::AuproInput, labeling::ComponentLabeler};

impl<B: Backend, L> Metric for AuproMetric<B, L>
where
    L: ComponentLabeler + Send + Sync + 'static,
{
    type Input = AuproInput<B>;

    fn name(&self) -> String {
        "AUPRO".to_string()
    }

    fn update(&mut self, item: &Self::Input, _metadata: &MetricMetadata) -> MetricEntry {
        if let Err(err) = self.update_4d(item.predictions.clone(), item.targets.clone()) {
            tracing::warn!(error = %err, "skipping AUPRO batch");
        }

        let buffered = self.len();
        MetricEntry::new(
            self.name(),
            format!("{buffered} batch(es) buffered"),
            buffered.to_string(),
        )
    }

    fn clear(&mut self) {
        self.reset();
    }
}

impl<B: Backend, L> Numeric for AuproMetric<B, L>
where
    L: ComponentLabeler + Send + Sync + 'static,
{
    fn value(&self) -> f64 {
        self.compute().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "AUPRO could not be computed");
            f64::NAN
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use burn::{backend::NdArray, data::dataloader::Progress, prelude::*};

    use super::*;

    type TestBackend = NdArray;

    fn batch(predictions: &[f32], targets: &[f32]) -> AuproInput<TestBackend> {
        let device = Default::default();
        AuproInput::new(
            Tensor::<TestBackend, 1>::from_floats(predictions, &device).reshape([1, 1, 2, 4]),
            Tensor::<TestBackend, 1>::from_floats(targets, &device).reshape([1, 1, 2, 4]),
        )
    }

    fn metadata() -> MetricMetadata {
        MetricMetadata {
            progress: Progress {
                items_processed: 1,
                items_total: 1,
            },
            epoch: 0,
            epoch_total: 1,
            iteration: 0,
            lr: None,
        }
    }

    #[test]
    fn learner_updates_buffer_and_value_scores() {
        let mut metric = AuproMetric::<TestBackend>::new();
        let metadata = metadata();

        // the inherent `update` takes raw tensors, so go through the trait
        let entry = Metric::update(
            &mut metric,
            &batch(
                &[0.9, 0.8, 0.1, 0.2, 0.7, 0.3, 0.4, 0.0],
                &[1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            ),
            &metadata,
        );

        assert_eq!(entry.name, "AUPRO");
        assert_eq!(entry.serialize, "1");
        assert_relative_eq!(metric.value(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn clear_leaves_value_undefined() {
        let mut metric = AuproMetric::<TestBackend>::new();
        let metadata = metadata();
        Metric::update(&mut metric, &batch(&[0.5; 8], &[1.0; 8]), &metadata);

        metric.clear();

        assert!(metric.is_empty());
        assert!(metric.value().is_nan());
    }
}
