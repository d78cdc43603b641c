use std::path::PathBuf;

use anyhow::Result;
use aupro::{
    create_device, load_metric_config, run_evaluation, EvalConfig, SelectedBackend, BACKEND_NAME,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aupro")]
#[command(about = "AUPRO: Area Under the Per-Region Overlap curve for anomaly segmentation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score anomaly maps against ground-truth masks
    Eval {
        /// Directory of anomaly maps
        #[arg(short, long)]
        predictions: PathBuf,

        /// Directory of ground-truth masks with the same layout
        #[arg(short, long)]
        masks: PathBuf,

        /// Largest false positive rate to integrate up to (overrides the config file)
        #[arg(long)]
        fpr_limit: Option<f64>,

        /// Metric configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Suffix of mask file stems, e.g. "_mask" for "000_mask.png"
        #[arg(long, default_value = "")]
        mask_suffix: String,

        /// Write the PRO curve to this image file
        #[arg(short, long)]
        figure: Option<PathBuf>,
    },

    /// Show backend information
    Info,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let device = create_device();

    match cli.command {
        Commands::Eval {
            predictions,
            masks,
            fpr_limit,
            config,
            mask_suffix,
            figure,
        } => {
            let metric_config = load_metric_config(config.as_deref(), fpr_limit)?;

            let mut eval_config =
                EvalConfig::new(predictions, masks, metric_config).with_mask_suffix(mask_suffix);
            if let Some(path) = figure {
                eval_config = eval_config.with_figure(path);
            }

            tracing::info!(backend = BACKEND_NAME, "starting evaluation");
            let report = run_evaluation::<SelectedBackend>(&eval_config, &device)?;

            println!("AUPRO: {:.4} ({} pairs)", report.aupro, report.pairs);
            Ok(())
        }

        Commands::Info => {
            println!("AUPRO Information:");
            println!("  Backend: {}", BACKEND_NAME);
            println!("  Device: {device:?}");
            Ok(())
        }
    }
}
