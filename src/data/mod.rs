//! Data Module
//!
//! Dataset ingestion and preparation:
//! - JSONL record loading with validation and filtering
//! - Label vocabulary mapping class names to dense indices
//! - Tensor pair assembly, validation split and mini-batching

mod dataset;
mod loader;
mod vocab;

pub use dataset::{DatasetView, GestureDataset};
pub use loader::{load_jsonl, DatasetError};
pub use vocab::LabelVocabulary;
