//! End-to-end pipeline test: load a mixed-quality JSONL file, train the
//! classifier, export the artifact and reload it.

use std::io::Write;

use gesture_trainer::{
    export_model, load_jsonl, load_model, train, GestureNet, LabelVocabulary, ModelConfig,
    RunConfig,
};

const SEQUENCE_LENGTH: usize = 4;

fn record(label: &str, steps: usize, value: f32) -> String {
    let sequence: Vec<Vec<f32>> = (0..steps)
        .map(|t| vec![value + 0.1 * t as f32, value - 0.1 * t as f32])
        .collect();
    format!(
        r#"{{"label": "{}", "sequence": {}}}"#,
        label,
        serde_json::to_string(&sequence).unwrap()
    )
}

/// Two clean samples per class, two with the wrong sequence length, one
/// malformed line and one out-of-vocabulary label.
fn write_mixed_dataset(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("dataset.jsonl");
    let mut file = std::fs::File::create(&path).unwrap();
    for line in [
        record("neutral", SEQUENCE_LENGTH, 0.0),
        record("open_palm", SEQUENCE_LENGTH, 2.0),
        record("pinch", SEQUENCE_LENGTH, 4.0),
        record("neutral", 3, 0.0),
        "{broken".to_string(),
        record("neutral", SEQUENCE_LENGTH, 0.2),
        record("fist", SEQUENCE_LENGTH, 1.0),
        record("open_palm", SEQUENCE_LENGTH, 2.2),
        record("pinch", 9, 4.0),
        record("pinch", SEQUENCE_LENGTH, 4.2),
    ] {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

#[test]
fn test_load_filters_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_mixed_dataset(dir.path());

    let dataset = load_jsonl(&path, SEQUENCE_LENGTH, &LabelVocabulary::gestures()).unwrap();

    assert_eq!(dataset.x.shape(), &[6, SEQUENCE_LENGTH, 2]);
    assert_eq!(dataset.y.shape(), &[6, 3]);
    assert_eq!(dataset.skipped_malformed, 1);
    assert_eq!(dataset.class_counts, vec![2, 2, 2]);
}

#[test]
fn test_train_export_reload() {
    let dir = tempfile::tempdir().unwrap();

    // Same well-separated classes as the mixed file, but enough samples for
    // a trailing validation split.
    let path = dir.path().join("dataset.jsonl");
    let mut file = std::fs::File::create(&path).unwrap();
    let labels = ["neutral", "open_palm", "pinch"];
    for i in 0..30 {
        let label = labels[i % 3];
        let level = (i % 3) as f32 * 2.0 + 0.01 * i as f32;
        writeln!(file, "{}", record(label, SEQUENCE_LENGTH, level)).unwrap();
    }
    drop(file);

    let dataset = load_jsonl(&path, SEQUENCE_LENGTH, &LabelVocabulary::gestures()).unwrap();
    let model = GestureNet::new(ModelConfig::new(
        dataset.sequence_length(),
        dataset.feature_dim(),
    ))
    .unwrap();

    let config = RunConfig {
        epochs: 10,
        batch_size: 8,
        learning_rate: 0.01,
        ..Default::default()
    };
    let report = train(model, &dataset, &config).unwrap();
    assert!(!report.history.is_empty());

    let exports = dir.path().join("exports");
    let artifact = export_model(&report.model, &exports).unwrap();
    assert!(artifact.ends_with("gesture_model.json"));

    let mut trained = report.model;
    let mut reloaded = load_model(&artifact).unwrap();
    let probs_before = trained.predict_proba(&dataset.x);
    let probs_after = reloaded.predict_proba(&dataset.x);
    assert_eq!(probs_before, probs_after);

    // Exporting again over the existing artifact must succeed.
    let again = export_model(&reloaded, &exports).unwrap();
    assert_eq!(again, artifact);
}
