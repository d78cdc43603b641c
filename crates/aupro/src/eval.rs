use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use aupro_metric::{AuproMetricConfig, RasterCurveRenderer};
use aupro_util::{is_supported_image_format, read_anomaly_map, read_mask};
use burn::{config::Config, tensor::backend::Backend};
use walkdir::WalkDir;

/// Evaluation configuration.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Directory of anomaly maps, searched recursively.
    pub predictions_dir: PathBuf,
    /// Directory of ground-truth masks, mirroring the prediction layout.
    pub masks_dir: PathBuf,
    /// Suffix appended to a prediction's stem in its mask file name (e.g. `"_mask"`).
    pub mask_suffix: String,
    /// Metric settings.
    pub metric: AuproMetricConfig,
    /// Where to write the PRO figure, if anywhere.
    pub figure_path: Option<PathBuf>,
}

impl EvalConfig {
    /// Creates a new evaluation configuration.
    pub fn new(
        predictions_dir: impl Into<PathBuf>,
        masks_dir: impl Into<PathBuf>,
        metric: AuproMetricConfig,
    ) -> Self {
        Self {
            predictions_dir: predictions_dir.into(),
            masks_dir: masks_dir.into(),
            mask_suffix: String::new(),
            metric,
            figure_path: None,
        }
    }

    #[must_use]
    pub fn with_mask_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.mask_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn with_figure(mut self, path: impl Into<PathBuf>) -> Self {
        self.figure_path = Some(path.into());
        self
    }
}

/// Resolves the metric settings: defaults, then the JSON file if given, then `fpr_limit`.
///
/// # Errors
///
/// Returns an error if the file does not exist or cannot be parsed.
pub fn load_metric_config(
    config_path: Option<&Path>,
    fpr_limit: Option<f64>,
) -> Result<AuproMetricConfig> {
    let config = match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            tracing::info!(path = %path.display(), "loading metric configuration");
            AuproMetricConfig::load(path)?
        }
        None => AuproMetricConfig::new(),
    };

    Ok(match fpr_limit {
        Some(limit) => config.with_fpr_limit(limit),
        None => config,
    })
}

/// Outcome of an evaluation run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    pub aupro: f64,
    /// Number of prediction/mask pairs that were scored.
    pub pairs: usize,
    pub figure_path: Option<PathBuf>,
}

/// Scores every anomaly map against the mask with the same relative stem.
///
/// Predictions without a mask are skipped with a warning.
///
/// # Errors
///
/// Returns an error if a directory cannot be walked, no pair is found, an image fails to
/// load, or the metric cannot be computed.
pub fn run_evaluation<B: Backend>(config: &EvalConfig, device: &B::Device) -> Result<EvalReport> {
    tracing::info!(
        predictions = %config.predictions_dir.display(),
        masks = %config.masks_dir.display(),
        fpr_limit = config.metric.fpr_limit,
        "running evaluation",
    );

    let predictions = collect_images(&config.predictions_dir, "")?;
    let mut masks = collect_images(&config.masks_dir, &config.mask_suffix)?;

    let mut metric = config.metric.init::<B>()?;
    let mut pairs = 0usize;
    for (key, prediction_path) in predictions {
        let Some(mask_path) = masks.remove(&key) else {
            tracing::warn!(prediction = %prediction_path.display(), "no matching mask, skipping");
            continue;
        };

        let prediction = read_anomaly_map::<B, _>(&prediction_path, device)?;
        let mask = read_mask::<B, _>(&mask_path, device)?;
        metric.update(prediction, mask).with_context(|| {
            format!(
                "cannot pair '{}' with '{}'",
                prediction_path.display(),
                mask_path.display()
            )
        })?;
        pairs += 1;
    }

    if pairs == 0 {
        anyhow::bail!(
            "No prediction in {} has a matching mask in {}",
            config.predictions_dir.display(),
            config.masks_dir.display()
        );
    }
    if !masks.is_empty() {
        tracing::warn!(count = masks.len(), "masks without a prediction were ignored");
    }

    let aupro = metric.compute()?;
    tracing::info!(aupro, pairs, "evaluation completed");

    if let Some(path) = &config.figure_path {
        let (figure, title) = metric.generate_figure(&RasterCurveRenderer::default())?;
        figure.save(path)?;
        tracing::info!(path = %path.display(), title, "saved figure");
    }

    Ok(EvalReport {
        aupro,
        pairs,
        figure_path: config.figure_path.clone(),
    })
}

/// Maps `relative/dir/stem` (with `suffix` removed from the stem) to each image path.
fn collect_images(root: &Path, suffix: &str) -> Result<BTreeMap<String, PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("Directory does not exist: {}", root.display());
    }

    let mut images = BTreeMap::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_supported_image_format(path) {
            continue;
        }

        if let Some(key) = stem_key(root, path, suffix) {
            images.insert(key, path.to_path_buf());
        }
    }

    Ok(images)
}

fn stem_key(root: &Path, path: &Path, suffix: &str) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let stem = stem.strip_suffix(suffix).unwrap_or(stem);
    let parent = path.parent()?.strip_prefix(root).ok()?;

    Some(parent.join(stem).to_string_lossy().into_owned())
}
