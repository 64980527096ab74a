//! JSONL dataset ingestion
//!
//! Reads one JSON record per line, validates and filters it, and assembles
//! the `(X, Y)` tensor pair used by the training loop. Filtering never aborts
//! a load: malformed lines are counted and skipped, out-of-vocabulary labels
//! and shape mismatches are excluded silently. Only a dataset with zero
//! surviving records is an error.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::dataset::GestureDataset;
use super::vocab::LabelVocabulary;

/// Errors produced while loading a dataset file.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be opened or read.
    #[error("failed to read dataset file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// No record survived filtering; training must not proceed.
    #[error(
        "dataset {path} is empty or no records match the expected shape \
         ({lines} lines read, {skipped_malformed} malformed)"
    )]
    Empty {
        path: PathBuf,
        lines: usize,
        skipped_malformed: usize,
    },
}

/// One line of the record source, before validation.
#[derive(Debug, Deserialize)]
struct RawRecord {
    label: String,
    sequence: Vec<Vec<f32>>,
}

/// Load a JSONL gesture dataset.
///
/// A record is kept only when its label is in `vocab`, its sequence has
/// exactly `sequence_length` timesteps, and every timestep has the feature
/// width established by the first surviving record. Surviving samples keep
/// file order.
pub fn load_jsonl(
    path: impl AsRef<Path>,
    sequence_length: usize,
    vocab: &LabelVocabulary,
) -> Result<GestureDataset, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut sequences: Vec<Vec<Vec<f32>>> = Vec::new();
    let mut labels: Vec<usize> = Vec::new();
    let mut feature_dim = 0usize;
    let mut skipped_malformed = 0usize;
    let mut lines_read = 0usize;

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        lines_read += 1;

        // The capture tool sometimes writes a UTF-8 byte-order marker.
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }

        let record: RawRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(err) => {
                debug!("line {}: malformed record skipped: {}", line_number + 1, err);
                skipped_malformed += 1;
                continue;
            }
        };

        let Some(label) = vocab.index_of(&record.label) else {
            continue;
        };
        if record.sequence.len() != sequence_length {
            continue;
        }

        let width = record.sequence.first().map(|step| step.len()).unwrap_or(0);
        if width == 0 || record.sequence.iter().any(|step| step.len() != width) {
            continue;
        }
        if feature_dim == 0 {
            feature_dim = width;
        } else if width != feature_dim {
            continue;
        }

        sequences.push(record.sequence);
        labels.push(label);
    }

    if sequences.is_empty() {
        return Err(DatasetError::Empty {
            path: path.to_path_buf(),
            lines: lines_read,
            skipped_malformed,
        });
    }

    let dataset = GestureDataset::from_samples(
        sequences,
        labels,
        feature_dim,
        vocab.clone(),
        skipped_malformed,
    );

    // Scrapeable summary: downstream tooling keys on these fields.
    info!(
        "Dataset loaded: samples={}, shape=({}, {}, {}), class_counts={}, skipped_malformed={}",
        dataset.len(),
        dataset.len(),
        dataset.sequence_length(),
        dataset.feature_dim(),
        format_class_counts(&dataset),
        dataset.skipped_malformed,
    );

    Ok(dataset)
}

fn format_class_counts(dataset: &GestureDataset) -> String {
    let pairs: Vec<String> = dataset
        .class_counts
        .iter()
        .enumerate()
        .map(|(index, count)| {
            let name = dataset.vocab.name_of(index).unwrap_or("?");
            format!("{}: {}", name, count)
        })
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dataset(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    fn record(label: &str, steps: usize, value: f32) -> String {
        let step: Vec<f32> = vec![value, value];
        let sequence: Vec<Vec<f32>> = vec![step; steps];
        format!(
            r#"{{"label": "{}", "sequence": {}}}"#,
            label,
            serde_json::to_string(&sequence).unwrap()
        )
    }

    #[test]
    fn test_valid_records_kept_in_file_order() {
        let file = write_dataset(&[
            &record("neutral", 4, 0.0),
            &record("pinch", 4, 1.0),
            &record("open_palm", 4, 2.0),
        ]);

        let dataset = load_jsonl(file.path(), 4, &LabelVocabulary::gestures()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.x[[0, 0, 0]], 0.0);
        assert_eq!(dataset.x[[1, 0, 0]], 1.0);
        assert_eq!(dataset.x[[2, 0, 0]], 2.0);
        assert_eq!(dataset.y[[1, 2]], 1.0); // pinch -> class 2
    }

    #[test]
    fn test_malformed_lines_counted_not_fatal() {
        let file = write_dataset(&[
            &record("neutral", 4, 0.0),
            "not json at all",
            r#"{"label": "pinch""#,
            &record("pinch", 4, 1.0),
        ]);

        let dataset = load_jsonl(file.path(), 4, &LabelVocabulary::gestures()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.skipped_malformed, 2);
    }

    #[test]
    fn test_unknown_label_excluded_silently() {
        let file = write_dataset(&[
            &record("fist", 4, 0.0),
            &record("neutral", 4, 1.0),
        ]);

        let dataset = load_jsonl(file.path(), 4, &LabelVocabulary::gestures()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.skipped_malformed, 0);
    }

    #[test]
    fn test_sequence_length_mismatch_excluded() {
        let file = write_dataset(&[
            &record("neutral", 3, 0.0),
            &record("neutral", 4, 1.0),
            &record("neutral", 5, 2.0),
        ]);

        let dataset = load_jsonl(file.path(), 4, &LabelVocabulary::gestures()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.x[[0, 0, 0]], 1.0);
    }

    #[test]
    fn test_ragged_feature_width_excluded() {
        let file = write_dataset(&[
            &record("neutral", 4, 0.0),
            r#"{"label": "neutral", "sequence": [[1.0, 2.0], [3.0], [4.0, 5.0], [6.0, 7.0]]}"#,
            r#"{"label": "neutral", "sequence": [[1.0], [2.0], [3.0], [4.0]]}"#,
        ]);

        let dataset = load_jsonl(file.path(), 4, &LabelVocabulary::gestures()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.feature_dim(), 2);
    }

    #[test]
    fn test_bom_and_blank_lines() {
        let content = format!(
            "\u{feff}{}\n\n   \n{}\n",
            record("neutral", 4, 0.0),
            record("pinch", 4, 1.0)
        );
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let dataset = load_jsonl(file.path(), 4, &LabelVocabulary::gestures()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.skipped_malformed, 0);
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let file = write_dataset(&[
            "garbage",
            &record("fist", 4, 0.0),
            &record("neutral", 7, 0.0),
        ]);

        let err = load_jsonl(file.path(), 4, &LabelVocabulary::gestures()).unwrap_err();
        match err {
            DatasetError::Empty {
                lines,
                skipped_malformed,
                ..
            } => {
                assert_eq!(lines, 3);
                assert_eq!(skipped_malformed, 1);
            }
            other => panic!("expected Empty, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_jsonl("/nonexistent/dataset.jsonl", 4, &LabelVocabulary::gestures())
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn test_custom_vocabulary_injection() {
        let file = write_dataset(&[
            &record("wave", 4, 0.0),
            &record("neutral", 4, 1.0),
        ]);

        let vocab = LabelVocabulary::new(["wave"]);
        let dataset = load_jsonl(file.path(), 4, &vocab).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.num_classes(), 1);
    }
}
