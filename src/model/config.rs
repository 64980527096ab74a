//! Model configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing a model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A dimension argument was zero or otherwise unusable.
    #[error("invalid model dimension: {name} = {value}")]
    InvalidDimension { name: &'static str, value: usize },
}

/// Architecture of the gesture classifier.
///
/// The topology is fixed by the capture protocol; only the input shape
/// varies between capture sessions. Filter counts and the kernel width are
/// kept in the config so the exported artifact fully describes the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Timesteps per sample.
    pub sequence_length: usize,
    /// Numeric channels per timestep.
    pub feature_dim: usize,
    /// Output classes.
    pub num_classes: usize,
    /// Filters in the first temporal convolution.
    pub conv1_filters: usize,
    /// Filters in the second temporal convolution.
    pub conv2_filters: usize,
    /// Convolution kernel width (odd, for same-length padding).
    pub kernel_size: usize,
}

impl ModelConfig {
    /// Configuration for the fixed gesture topology with a given input shape.
    pub fn new(sequence_length: usize, feature_dim: usize) -> Self {
        Self {
            sequence_length,
            feature_dim,
            num_classes: 3,
            conv1_filters: 32,
            conv2_filters: 64,
            kernel_size: 3,
        }
    }

    /// Reject unusable dimensions before any tensor is allocated.
    pub fn validate(&self) -> Result<(), ModelError> {
        let checks = [
            ("sequence_length", self.sequence_length),
            ("feature_dim", self.feature_dim),
            ("num_classes", self.num_classes),
            ("conv1_filters", self.conv1_filters),
            ("conv2_filters", self.conv2_filters),
            ("kernel_size", self.kernel_size),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(ModelError::InvalidDimension { name, value });
            }
        }
        if self.kernel_size % 2 == 0 {
            return Err(ModelError::InvalidDimension {
                name: "kernel_size",
                value: self.kernel_size,
            });
        }
        Ok(())
    }
}
