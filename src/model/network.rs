//! The gesture classifier network
//!
//! Fixed topology: two same-padded temporal convolutions (32 then 64
//! filters, kernel 3, relu), global average pooling over the time axis, and
//! a dense softmax head. Same padding plus global pooling makes the
//! classifier translation-invariant in time and keeps the parameter count
//! independent of the sequence length.

use ndarray::{Array1, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use super::config::{ModelConfig, ModelError};
use super::layers::{DenseLayer, TemporalConv};

/// Per-parameter gradients for one backward pass.
#[derive(Debug)]
pub struct Gradients {
    pub conv1_weights: Array2<f32>,
    pub conv1_bias: Array1<f32>,
    pub conv2_weights: Array2<f32>,
    pub conv2_bias: Array1<f32>,
    pub output_weights: Array2<f32>,
    pub output_bias: Array1<f32>,
}

/// Temporal-convolution gesture classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureNet {
    pub config: ModelConfig,
    pub conv1: TemporalConv,
    pub conv2: TemporalConv,
    pub output: DenseLayer,
}

impl GestureNet {
    /// Build an untrained network. Fails fast on unusable dimensions,
    /// before any tensor is allocated.
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        config.validate()?;

        let conv1 = TemporalConv::new(config.feature_dim, config.conv1_filters, config.kernel_size);
        let conv2 = TemporalConv::new(
            config.conv1_filters,
            config.conv2_filters,
            config.kernel_size,
        );
        let output = DenseLayer::new(config.conv2_filters, config.num_classes);

        Ok(Self {
            config,
            conv1,
            conv2,
            output,
        })
    }

    /// Forward pass: `(B, T, D)` inputs to `(B, C)` class probabilities.
    pub fn forward(&mut self, input: &Array3<f32>, training: bool) -> Array2<f32> {
        let (_, seq_len, feature_dim) = input.dim();
        assert_eq!(seq_len, self.config.sequence_length, "sequence length mismatch");
        assert_eq!(feature_dim, self.config.feature_dim, "feature dim mismatch");

        let h = self.conv1.forward(input, training);
        let h = self.conv2.forward(&h, training);

        // Global average pooling over the time axis: (B, T, C) -> (B, C).
        let pooled = h.mean_axis(Axis(1)).expect("non-empty time axis");

        let logits = self.output.forward(&pooled, training);
        softmax_rows(&logits)
    }

    /// Class probabilities for a batch, in inference mode.
    pub fn predict_proba(&mut self, input: &Array3<f32>) -> Array2<f32> {
        self.forward(input, false)
    }

    /// Backward pass for the categorical cross-entropy objective, fused with
    /// the softmax: the logit gradient is `(probs - targets) / batch`.
    /// Requires a prior `forward` in training mode.
    pub fn backward(&mut self, probs: &Array2<f32>, targets: &Array2<f32>) -> Gradients {
        let batch = probs.nrows() as f32;
        let delta = (probs - targets) / batch;

        let (grad_pooled, output_weights, output_bias) = self.output.backward(&delta);

        // Pooling spreads each channel gradient evenly across timesteps.
        let seq_len = self.config.sequence_length;
        let (batch_size, channels) = grad_pooled.dim();
        let mut grad_h = Array3::zeros((batch_size, seq_len, channels));
        for b in 0..batch_size {
            for c in 0..channels {
                let g = grad_pooled[[b, c]] / seq_len as f32;
                for t in 0..seq_len {
                    grad_h[[b, t, c]] = g;
                }
            }
        }

        let (grad_h1, conv2_weights, conv2_bias) = self.conv2.backward(&grad_h);
        let (_, conv1_weights, conv1_bias) = self.conv1.backward(&grad_h1);

        Gradients {
            conv1_weights,
            conv1_bias,
            conv2_weights,
            conv2_bias,
            output_weights,
            output_bias,
        }
    }

    /// Total trainable parameter count.
    pub fn num_parameters(&self) -> usize {
        self.conv1.num_parameters() + self.conv2.num_parameters() + self.output.num_parameters()
    }

    /// Human-readable architecture summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str("GestureNet\n");
        s.push_str(&format!(
            "  input:  ({}, {})\n",
            self.config.sequence_length, self.config.feature_dim
        ));
        s.push_str(&format!(
            "  conv1:  {} filters, kernel {}, same padding, relu\n",
            self.config.conv1_filters, self.config.kernel_size
        ));
        s.push_str(&format!(
            "  conv2:  {} filters, kernel {}, same padding, relu\n",
            self.config.conv2_filters, self.config.kernel_size
        ));
        s.push_str(&format!(
            "  pool:   global average over {} timesteps\n",
            self.config.sequence_length
        ));
        s.push_str(&format!(
            "  output: dense({}), softmax\n",
            self.config.num_classes
        ));
        s.push_str(&format!("  parameters: {}\n", self.num_parameters()));
        s
    }
}

/// Row-wise numerically stable softmax.
pub fn softmax_rows(logits: &Array2<f32>) -> Array2<f32> {
    let mut probs = logits.clone();
    for mut row in probs.rows_mut() {
        let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    probs
}
