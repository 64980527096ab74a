//! Network layers: same-padded temporal convolution and dense projection
//!
//! Layers operate channels-last, matching the dataset layout: convolution
//! inputs are `(batch, seq_len, channels)`. Each layer caches the values its
//! backward pass needs when run in training mode; caches are cleared on
//! clone and never serialized.

use ndarray::{Array1, Array2, Array3, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use serde::{Deserialize, Serialize};

/// 1D convolution over the time axis with same-length zero padding and a
/// rectified-linear activation.
#[derive(Debug, Serialize, Deserialize)]
pub struct TemporalConv {
    /// Weights laid out `[out_channels, in_channels * kernel_size]`; the
    /// column for input channel `ic` and kernel offset `k` is `ic * K + k`.
    pub weights: Array2<f32>,
    /// Bias per output channel.
    pub bias: Array1<f32>,
    pub in_channels: usize,
    pub out_channels: usize,
    pub kernel_size: usize,

    #[serde(skip)]
    last_input: Option<Array3<f32>>,
    #[serde(skip)]
    last_z: Option<Array3<f32>>,
}

impl TemporalConv {
    /// Create a layer with Xavier-uniform initialized weights.
    pub fn new(in_channels: usize, out_channels: usize, kernel_size: usize) -> Self {
        let fan_in = in_channels * kernel_size;
        let limit = (6.0 / (fan_in + out_channels) as f32).sqrt();
        let weights = Array2::random((out_channels, fan_in), Uniform::new(-limit, limit));
        let bias = Array1::zeros(out_channels);

        Self {
            weights,
            bias,
            in_channels,
            out_channels,
            kernel_size,
            last_input: None,
            last_z: None,
        }
    }

    fn padding(&self) -> usize {
        (self.kernel_size - 1) / 2
    }

    /// Forward pass: `(B, T, in_channels)` to `(B, T, out_channels)`.
    pub fn forward(&mut self, input: &Array3<f32>, training: bool) -> Array3<f32> {
        let (batch, seq_len, in_channels) = input.dim();
        assert_eq!(in_channels, self.in_channels, "input channels mismatch");

        let pad = self.padding();
        let mut z = Array3::zeros((batch, seq_len, self.out_channels));

        for b in 0..batch {
            for t in 0..seq_len {
                for oc in 0..self.out_channels {
                    let mut sum = self.bias[oc];
                    for k in 0..self.kernel_size {
                        // Same padding: positions outside the sequence read zero.
                        let Some(ti) = (t + k).checked_sub(pad) else {
                            continue;
                        };
                        if ti >= seq_len {
                            continue;
                        }
                        for ic in 0..self.in_channels {
                            sum += self.weights[[oc, ic * self.kernel_size + k]]
                                * input[[b, ti, ic]];
                        }
                    }
                    z[[b, t, oc]] = sum;
                }
            }
        }

        if training {
            self.last_input = Some(input.clone());
            self.last_z = Some(z.clone());
        }

        z.mapv(|v| v.max(0.0))
    }

    /// Backward pass for the output gradient of the rectified activation.
    /// Returns `(input_gradient, weight_gradient, bias_gradient)`.
    pub fn backward(&self, grad_output: &Array3<f32>) -> (Array3<f32>, Array2<f32>, Array1<f32>) {
        let input = self
            .last_input
            .as_ref()
            .expect("forward(training) must run before backward");
        let z = self
            .last_z
            .as_ref()
            .expect("forward(training) must run before backward");

        let (batch, seq_len, _) = input.dim();
        let pad = self.padding();

        let mut grad_input = Array3::zeros(input.dim());
        let mut grad_weights = Array2::zeros(self.weights.dim());
        let mut grad_bias = Array1::zeros(self.out_channels);

        for b in 0..batch {
            for t in 0..seq_len {
                for oc in 0..self.out_channels {
                    if z[[b, t, oc]] <= 0.0 {
                        continue;
                    }
                    let delta = grad_output[[b, t, oc]];
                    if delta == 0.0 {
                        continue;
                    }
                    grad_bias[oc] += delta;
                    for k in 0..self.kernel_size {
                        let Some(ti) = (t + k).checked_sub(pad) else {
                            continue;
                        };
                        if ti >= seq_len {
                            continue;
                        }
                        for ic in 0..self.in_channels {
                            let col = ic * self.kernel_size + k;
                            grad_weights[[oc, col]] += delta * input[[b, ti, ic]];
                            grad_input[[b, ti, ic]] += delta * self.weights[[oc, col]];
                        }
                    }
                }
            }
        }

        (grad_input, grad_weights, grad_bias)
    }

    /// Trainable parameter count.
    pub fn num_parameters(&self) -> usize {
        self.weights.len() + self.bias.len()
    }
}

impl Clone for TemporalConv {
    fn clone(&self) -> Self {
        Self {
            weights: self.weights.clone(),
            bias: self.bias.clone(),
            in_channels: self.in_channels,
            out_channels: self.out_channels,
            kernel_size: self.kernel_size,
            last_input: None,
            last_z: None,
        }
    }
}

/// Fully connected projection without activation; the network applies
/// softmax fused with the cross-entropy gradient.
#[derive(Debug, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Weight matrix `(input_size, output_size)`.
    pub weights: Array2<f32>,
    /// Bias vector `(output_size)`.
    pub bias: Array1<f32>,
    pub input_size: usize,
    pub output_size: usize,

    #[serde(skip)]
    last_input: Option<Array2<f32>>,
}

impl DenseLayer {
    /// Create a layer with Xavier-uniform initialized weights.
    pub fn new(input_size: usize, output_size: usize) -> Self {
        let limit = (6.0 / (input_size + output_size) as f32).sqrt();
        let weights = Array2::random((input_size, output_size), Uniform::new(-limit, limit));
        let bias = Array1::zeros(output_size);

        Self {
            weights,
            bias,
            input_size,
            output_size,
            last_input: None,
        }
    }

    /// Forward pass: `(B, input_size)` to `(B, output_size)` logits.
    pub fn forward(&mut self, input: &Array2<f32>, training: bool) -> Array2<f32> {
        let mut z = input.dot(&self.weights);
        for mut row in z.rows_mut() {
            row += &self.bias;
        }
        if training {
            self.last_input = Some(input.clone());
        }
        z
    }

    /// Backward pass for the logit gradient.
    /// Returns `(input_gradient, weight_gradient, bias_gradient)`.
    pub fn backward(&self, grad_logits: &Array2<f32>) -> (Array2<f32>, Array2<f32>, Array1<f32>) {
        let input = self
            .last_input
            .as_ref()
            .expect("forward(training) must run before backward");

        let grad_weights = input.t().dot(grad_logits);
        let grad_bias = grad_logits.sum_axis(Axis(0));
        let grad_input = grad_logits.dot(&self.weights.t());

        (grad_input, grad_weights, grad_bias)
    }

    /// Trainable parameter count.
    pub fn num_parameters(&self) -> usize {
        self.weights.len() + self.bias.len()
    }
}

impl Clone for DenseLayer {
    fn clone(&self) -> Self {
        Self {
            weights: self.weights.clone(),
            bias: self.bias.clone(),
            input_size: self.input_size,
            output_size: self.output_size,
            last_input: None,
        }
    }
}
