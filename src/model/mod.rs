//! Model Module
//!
//! The fixed-topology gesture classifier:
//! - Architecture configuration with fail-fast validation
//! - Temporal convolution and dense layers with hand-rolled backprop
//! - The assembled network and its Adam optimizer

mod config;
mod layers;
mod network;
mod optimizer;

pub use config::{ModelConfig, ModelError};
pub use layers::{DenseLayer, TemporalConv};
pub use network::{softmax_rows, GestureNet, Gradients};
pub use optimizer::{Adam, ModelOptimizer};
