//! Training orchestrator
//!
//! Runs the fit loop: trailing validation split, per-epoch shuffling into
//! mini-batches, Adam updates, early stopping on validation accuracy with
//! best-checkpoint restore, and structured progress logging. Any failure
//! inside the loop is fatal to the run; nothing is retried.

use thiserror::Error;
use tracing::{info, warn};

use super::early_stopping::{EarlyStopping, StopDecision};
use super::metrics::{accuracy, categorical_cross_entropy};
use crate::data::GestureDataset;
use crate::model::{GestureNet, ModelOptimizer};

/// Fatal failures of a training run.
#[derive(Debug, Error)]
pub enum TrainingError {
    /// The run configuration cannot produce a valid fit loop.
    #[error("invalid training configuration: {0}")]
    InvalidConfig(&'static str),
    /// The dataset shape does not match the model's input shape.
    #[error(
        "model expects input ({expected_len}, {expected_dim}), dataset provides ({actual_len}, {actual_dim})"
    )]
    ShapeMismatch {
        expected_len: usize,
        expected_dim: usize,
        actual_len: usize,
        actual_dim: usize,
    },
    /// The validation split left nothing to train or validate on.
    #[error(
        "not enough samples to fit: {samples} total, {train} train / {validation} validation"
    )]
    InsufficientData {
        samples: usize,
        train: usize,
        validation: usize,
    },
    /// The loss became non-finite; the model is unusable.
    #[error("non-finite training loss at epoch {epoch}")]
    NumericalInstability { epoch: usize },
}

/// Run configuration for one fit.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Upper bound on training epochs.
    pub epochs: usize,
    /// Mini-batch size for gradient updates.
    pub batch_size: usize,
    /// Trailing fraction of samples held out for validation.
    pub validation_fraction: f32,
    /// Adam learning rate.
    pub learning_rate: f32,
    /// Early-stopping patience on validation accuracy.
    pub patience: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            epochs: 25,
            batch_size: 32,
            validation_fraction: 0.2,
            learning_rate: 1e-3,
            patience: 5,
        }
    }
}

impl RunConfig {
    fn validate(&self) -> Result<(), TrainingError> {
        if self.epochs == 0 {
            return Err(TrainingError::InvalidConfig("epochs must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(TrainingError::InvalidConfig("batch_size must be > 0"));
        }
        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(TrainingError::InvalidConfig(
                "validation_fraction must be in [0, 1)",
            ));
        }
        if self.patience == 0 {
            return Err(TrainingError::InvalidConfig("patience must be > 0"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainingError::InvalidConfig("learning_rate must be > 0"));
        }
        Ok(())
    }
}

/// Metrics recorded for one epoch.
#[derive(Debug, Clone, Copy)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f32,
    pub accuracy: f32,
    pub val_loss: f32,
    pub val_accuracy: f32,
}

/// Ordered per-epoch metrics, read-only after the fit loop ends.
#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    /// Number of epochs actually run.
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// True before the first epoch completes.
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Metrics of the last completed epoch.
    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    /// All recorded epochs, in order.
    pub fn epochs(&self) -> &[EpochMetrics] {
        &self.epochs
    }
}

/// Terminal state of the fit loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    /// The no-improvement window closed at this (zero-based) epoch.
    EarlyStopped { epoch: usize },
    /// The configured epoch budget elapsed.
    Exhausted,
}

/// Result of a completed training run. The model carries the weights of the
/// best-observed epoch in both terminal states.
#[derive(Debug)]
pub struct TrainingReport {
    pub model: GestureNet,
    pub history: TrainingHistory,
    pub outcome: FitOutcome,
    pub best_epoch: usize,
    pub best_val_accuracy: f32,
}

/// Fit `model` on `dataset` under `config`.
pub fn train(
    mut model: GestureNet,
    dataset: &GestureDataset,
    config: &RunConfig,
) -> Result<TrainingReport, TrainingError> {
    config.validate()?;

    if model.config.sequence_length != dataset.sequence_length()
        || model.config.feature_dim != dataset.feature_dim()
    {
        return Err(TrainingError::ShapeMismatch {
            expected_len: model.config.sequence_length,
            expected_dim: model.config.feature_dim,
            actual_len: dataset.sequence_length(),
            actual_dim: dataset.feature_dim(),
        });
    }

    let (mut train_split, val_split) = dataset.split_validation(config.validation_fraction);
    if train_split.is_empty() || val_split.is_empty() {
        return Err(TrainingError::InsufficientData {
            samples: dataset.len(),
            train: train_split.len(),
            validation: val_split.len(),
        });
    }

    info!(
        "Training started: epochs={}, batch_size={}, validation_fraction={}, lr={}, patience={}, train_samples={}, val_samples={}",
        config.epochs,
        config.batch_size,
        config.validation_fraction,
        config.learning_rate,
        config.patience,
        train_split.len(),
        val_split.len(),
    );

    let mut optimizer = ModelOptimizer::new(config.learning_rate);
    let mut monitor = EarlyStopping::new(config.patience);
    let mut best = model.clone();
    let mut history = TrainingHistory::default();
    let mut outcome = FitOutcome::Exhausted;

    let (val_x, val_y) = val_split.full_batch();
    let mut rng = rand::thread_rng();

    for epoch in 0..config.epochs {
        train_split.shuffle(&mut rng);

        let mut loss_sum = 0.0f32;
        let mut correct_weighted = 0.0f32;
        let mut batch_count = 0usize;
        let mut sample_count = 0usize;

        for (batch_x, batch_y) in train_split.batches(config.batch_size) {
            let probs = model.forward(&batch_x, true);
            loss_sum += categorical_cross_entropy(&probs, &batch_y);
            correct_weighted += accuracy(&probs, &batch_y) * batch_y.nrows() as f32;
            sample_count += batch_y.nrows();
            batch_count += 1;

            let grads = model.backward(&probs, &batch_y);
            optimizer.step(&mut model, &grads);
        }

        let train_loss = loss_sum / batch_count as f32;
        let train_acc = correct_weighted / sample_count as f32;

        if !train_loss.is_finite() {
            return Err(TrainingError::NumericalInstability { epoch });
        }

        let val_probs = model.forward(&val_x, false);
        let val_loss = categorical_cross_entropy(&val_probs, &val_y);
        let val_acc = accuracy(&val_probs, &val_y);

        history.epochs.push(EpochMetrics {
            epoch,
            loss: train_loss,
            accuracy: train_acc,
            val_loss,
            val_accuracy: val_acc,
        });

        info!(
            "Epoch {}/{}: loss={:.4}, acc={:.4}, val_loss={:.4}, val_acc={:.4}",
            epoch + 1,
            config.epochs,
            train_loss,
            train_acc,
            val_loss,
            val_acc
        );

        match monitor.observe(epoch, val_acc) {
            StopDecision::Improved => {
                best = model.clone();
            }
            StopDecision::Wait => {}
            StopDecision::Stop => {
                warn!(
                    "Early stopping at epoch {}: no val_accuracy improvement for {} epochs",
                    epoch + 1,
                    config.patience
                );
                outcome = FitOutcome::EarlyStopped { epoch };
                break;
            }
        }
    }

    // Both terminal states keep the best-observed weights, so the exported
    // artifact does not depend on where the loop happened to end.
    model = best;

    let last = history.last().copied().unwrap_or(EpochMetrics {
        epoch: 0,
        loss: 0.0,
        accuracy: 0.0,
        val_loss: 0.0,
        val_accuracy: 0.0,
    });
    info!(
        "Training finished after {} epochs | acc={:.4} | val_acc={:.4} | best_epoch={}",
        history.len(),
        last.accuracy,
        last.val_accuracy,
        monitor.best_epoch() + 1,
    );

    Ok(TrainingReport {
        model,
        history,
        outcome,
        best_epoch: monitor.best_epoch(),
        best_val_accuracy: monitor.best_value(),
    })
}
