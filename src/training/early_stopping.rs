//! Early-stopping policy
//!
//! A pure function of the per-epoch validation-accuracy stream: it tracks
//! the best observed value and signals a stop once `patience` consecutive
//! epochs fail to improve on it. Checkpointing and weight restoration are
//! the trainer's job; this type only decides.

/// Decision after observing one epoch's validation accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    /// New best value; the caller should checkpoint the model.
    Improved,
    /// No improvement, but the patience budget is not exhausted.
    Wait,
    /// Patience exhausted; the caller should stop and restore the best
    /// checkpoint.
    Stop,
}

/// Patience-based monitor over a maximized metric.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best_value: f32,
    best_epoch: usize,
    epochs_without_improvement: usize,
}

impl EarlyStopping {
    /// Monitor with the given patience window.
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_value: f32::NEG_INFINITY,
            best_epoch: 0,
            epochs_without_improvement: 0,
        }
    }

    /// Observe one epoch's metric value. Epochs are zero-based.
    pub fn observe(&mut self, epoch: usize, value: f32) -> StopDecision {
        if value > self.best_value {
            self.best_value = value;
            self.best_epoch = epoch;
            self.epochs_without_improvement = 0;
            return StopDecision::Improved;
        }

        self.epochs_without_improvement += 1;
        if self.epochs_without_improvement >= self.patience {
            StopDecision::Stop
        } else {
            StopDecision::Wait
        }
    }

    /// Epoch of the best observed value.
    pub fn best_epoch(&self) -> usize {
        self.best_epoch
    }

    /// Best observed value.
    pub fn best_value(&self) -> f32 {
        self.best_value
    }
}
