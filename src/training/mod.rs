//! Training: fit loop, metrics and early stopping
//!
//! `trainer` owns the epoch loop and checkpointing, `early_stopping` is the
//! pure stop policy it consults, and `metrics` holds the loss and accuracy
//! computations shared between training and validation.

pub mod early_stopping;
pub mod metrics;
pub mod trainer;

pub use early_stopping::{EarlyStopping, StopDecision};
pub use metrics::{accuracy, categorical_cross_entropy};
pub use trainer::{
    train, EpochMetrics, FitOutcome, RunConfig, TrainingError, TrainingHistory, TrainingReport,
};
