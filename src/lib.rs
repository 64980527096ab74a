//! # Gesture Trainer
//!
//! Offline training pipeline for a gesture-sequence classifier: load labeled
//! landmark sequences from JSONL, fit a small temporal convolutional network,
//! and export the trained model as a reloadable artifact.
//!
//! ## Modules
//!
//! - `data` - JSONL loading, label vocabulary, dataset tensors and batching
//! - `model` - Network topology, layers and the Adam optimizer
//! - `training` - Fit loop, metrics and early stopping
//! - `export` - Model persistence and reload

pub mod data;
pub mod export;
pub mod model;
pub mod training;

pub use data::{load_jsonl, GestureDataset, LabelVocabulary};
pub use export::{export_model, load_model};
pub use model::{GestureNet, ModelConfig};
pub use training::{train, RunConfig, TrainingReport};

use thiserror::Error;

/// Top-level error for the whole pipeline, one variant per stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] data::DatasetError),
    #[error(transparent)]
    Model(#[from] model::ModelError),
    #[error(transparent)]
    Training(#[from] training::TrainingError),
    #[error(transparent)]
    Export(#[from] export::ExportError),
}
