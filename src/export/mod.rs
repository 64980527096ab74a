//! Model export and reload
//!
//! Persists a trained network as a single JSON artifact holding both the
//! architecture configuration and the weights, so a reload needs no side
//! channel to rebuild the model. Exports are idempotent: re-running training
//! overwrites the previous artifact in place.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::model::GestureNet;

/// File name of the exported model inside the exports directory.
pub const ARTIFACT_NAME: &str = "gesture_model.json";

/// Failures while writing or reading a model artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model serialization failed for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Write `model` to `exports_dir/gesture_model.json`, creating the directory
/// chain if needed. Returns the path of the written artifact.
pub fn export_model(model: &GestureNet, exports_dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(exports_dir).map_err(|source| ExportError::Io {
        path: exports_dir.to_path_buf(),
        source,
    })?;

    let path = exports_dir.join(ARTIFACT_NAME);
    let file = File::create(&path).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::to_writer(BufWriter::new(file), model).map_err(|source| {
        ExportError::Serialize {
            path: path.clone(),
            source,
        }
    })?;

    info!("Model exported to {}", path.display());
    Ok(path)
}

/// Reload a model artifact written by [`export_model`].
pub fn load_model(path: &Path) -> Result<GestureNet, ExportError> {
    let file = File::open(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ExportError::Serialize {
        path: path.to_path_buf(),
        source,
    })
}
