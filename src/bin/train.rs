//! Train the gesture classifier from a JSONL dataset
//!
//! Usage: cargo run --bin train -- --dataset dataset.jsonl --epochs 25

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use gesture_trainer::{
    export_model, load_jsonl, train, GestureNet, LabelVocabulary, ModelConfig, PipelineError,
    RunConfig,
};

#[derive(Parser, Debug)]
#[command(name = "train", about = "Train the gesture-sequence classifier")]
struct Args {
    /// Path to the JSONL training dataset
    #[arg(long, default_value = "dataset.jsonl")]
    dataset: PathBuf,

    /// Timesteps per sample; shorter or longer sequences are skipped
    #[arg(long, default_value_t = 30)]
    sequence_length: usize,

    /// Upper bound on training epochs
    #[arg(long, default_value_t = 25)]
    epochs: usize,

    /// Mini-batch size
    #[arg(long, default_value_t = 32)]
    batch_size: usize,

    /// Directory the trained model is exported into
    #[arg(long, default_value = "exports")]
    exports_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    run(&args)?;
    Ok(())
}

fn run(args: &Args) -> Result<(), PipelineError> {
    let vocab = LabelVocabulary::gestures();
    let dataset = load_jsonl(&args.dataset, args.sequence_length, &vocab)?;

    // The feature width is whatever the dataset carries; only the sequence
    // length is fixed up front.
    let config = ModelConfig::new(dataset.sequence_length(), dataset.feature_dim());
    let model = GestureNet::new(config)?;
    info!("\n{}", model.summary());

    let run = RunConfig {
        epochs: args.epochs,
        batch_size: args.batch_size,
        ..Default::default()
    };
    let report = train(model, &dataset, &run)?;
    info!(
        "Best epoch {} with val_accuracy={:.4}",
        report.best_epoch + 1,
        report.best_val_accuracy
    );

    let path = export_model(&report.model, &args.exports_dir)?;
    println!("Model exported to {}", path.display());

    Ok(())
}
