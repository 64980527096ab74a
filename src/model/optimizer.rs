//! Adam optimizer
//!
//! Adaptive moment estimation over the network's six parameter tensors.
//! Optimizer state lives outside the model so checkpoints stay plain values.

use ndarray::{Array1, Array2};

use super::network::{GestureNet, Gradients};

/// Adam state for one layer (a weight matrix and a bias vector).
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    t: i32,
    m_w: Option<Array2<f32>>,
    v_w: Option<Array2<f32>>,
    m_b: Option<Array1<f32>>,
    v_b: Option<Array1<f32>>,
}

impl Adam {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 0,
            m_w: None,
            v_w: None,
            m_b: None,
            v_b: None,
        }
    }

    /// One update step for the layer's weights and bias.
    pub fn update(
        &mut self,
        weights: &mut Array2<f32>,
        bias: &mut Array1<f32>,
        grad_weights: &Array2<f32>,
        grad_bias: &Array1<f32>,
    ) {
        self.t += 1;
        let bc1 = 1.0 - self.beta1.powi(self.t);
        let bc2 = 1.0 - self.beta2.powi(self.t);

        let m = self.m_w.get_or_insert_with(|| Array2::zeros(weights.dim()));
        let v = self.v_w.get_or_insert_with(|| Array2::zeros(weights.dim()));
        *m = &*m * self.beta1 + grad_weights * (1.0 - self.beta1);
        *v = &*v * self.beta2 + &(grad_weights * grad_weights) * (1.0 - self.beta2);
        let m_hat = &*m / bc1;
        let v_hat = &*v / bc2;
        *weights =
            &*weights - &(&m_hat * self.learning_rate / &(v_hat.mapv(f32::sqrt) + self.epsilon));

        let m = self.m_b.get_or_insert_with(|| Array1::zeros(bias.len()));
        let v = self.v_b.get_or_insert_with(|| Array1::zeros(bias.len()));
        *m = &*m * self.beta1 + grad_bias * (1.0 - self.beta1);
        *v = &*v * self.beta2 + &(grad_bias * grad_bias) * (1.0 - self.beta2);
        let m_hat = &*m / bc1;
        let v_hat = &*v / bc2;
        *bias = &*bias - &(&m_hat * self.learning_rate / &(v_hat.mapv(f32::sqrt) + self.epsilon));
    }

    /// Drop accumulated moments, e.g. for a fresh run.
    pub fn reset(&mut self) {
        self.t = 0;
        self.m_w = None;
        self.v_w = None;
        self.m_b = None;
        self.v_b = None;
    }
}

/// Adam state for the whole network, one instance per layer.
#[derive(Debug, Clone)]
pub struct ModelOptimizer {
    conv1: Adam,
    conv2: Adam,
    output: Adam,
}

impl ModelOptimizer {
    pub fn new(learning_rate: f32) -> Self {
        Self {
            conv1: Adam::new(learning_rate),
            conv2: Adam::new(learning_rate),
            output: Adam::new(learning_rate),
        }
    }

    /// Apply one gradient step to every layer.
    pub fn step(&mut self, model: &mut GestureNet, grads: &Gradients) {
        self.conv1.update(
            &mut model.conv1.weights,
            &mut model.conv1.bias,
            &grads.conv1_weights,
            &grads.conv1_bias,
        );
        self.conv2.update(
            &mut model.conv2.weights,
            &mut model.conv2.bias,
            &grads.conv2_weights,
            &grads.conv2_bias,
        );
        self.output.update(
            &mut model.output.weights,
            &mut model.output.bias,
            &grads.output_weights,
            &grads.output_bias,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adam_moves_against_gradient() {
        let mut optimizer = Adam::new(0.001);
        let mut weights = Array2::ones((3, 2));
        let mut bias = Array1::ones(2);
        let grad_w = Array2::ones((3, 2));
        let grad_b = Array1::ones(2);

        for _ in 0..10 {
            optimizer.update(&mut weights, &mut bias, &grad_w, &grad_b);
        }

        assert!(weights[[0, 0]] < 1.0);
        assert!(bias[0] < 1.0);
    }

    #[test]
    fn test_first_step_size_is_learning_rate() {
        // With constant unit gradients the bias-corrected first step is
        // exactly lr / (1 + eps).
        let mut optimizer = Adam::new(0.01);
        let mut weights = Array2::zeros((1, 1));
        let mut bias = Array1::zeros(1);
        let grad_w = Array2::ones((1, 1));
        let grad_b = Array1::ones(1);

        optimizer.update(&mut weights, &mut bias, &grad_w, &grad_b);
        assert!((weights[[0, 0]] + 0.01).abs() < 1e-4);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut optimizer = Adam::new(0.001);
        let mut weights = Array2::ones((1, 1));
        let mut bias = Array1::ones(1);
        optimizer.update(&mut weights, &mut bias, &Array2::ones((1, 1)), &Array1::ones(1));

        optimizer.reset();
        assert_eq!(optimizer.t, 0);
        assert!(optimizer.m_w.is_none());
    }
}
