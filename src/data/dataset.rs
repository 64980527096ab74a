//! Dataset tensor pair and mini-batch iteration

use ndarray::{Array2, Array3, Axis};
use rand::seq::SliceRandom;

use super::vocab::LabelVocabulary;

/// Loaded training data: inputs, one-hot targets and per-class bookkeeping.
///
/// `x` has shape `(num_samples, sequence_length, feature_dim)`, `y` has shape
/// `(num_samples, num_classes)`. Samples keep the order they had in the
/// source file.
#[derive(Debug, Clone)]
pub struct GestureDataset {
    /// Input tensor `(N, T, D)`.
    pub x: Array3<f32>,
    /// One-hot target tensor `(N, C)`.
    pub y: Array2<f32>,
    /// Vocabulary the labels were encoded against.
    pub vocab: LabelVocabulary,
    /// Per-class sample counts, indexed by class.
    pub class_counts: Vec<usize>,
    /// Lines that failed to parse during loading.
    pub skipped_malformed: usize,
}

impl GestureDataset {
    /// Build the tensor pair from filtered samples.
    pub(crate) fn from_samples(
        sequences: Vec<Vec<Vec<f32>>>,
        labels: Vec<usize>,
        feature_dim: usize,
        vocab: LabelVocabulary,
        skipped_malformed: usize,
    ) -> Self {
        let num_samples = sequences.len();
        let sequence_length = sequences.first().map(|s| s.len()).unwrap_or(0);

        let mut x = Array3::zeros((num_samples, sequence_length, feature_dim));
        for (i, sequence) in sequences.iter().enumerate() {
            for (t, step) in sequence.iter().enumerate() {
                for (d, &value) in step.iter().enumerate() {
                    x[[i, t, d]] = value;
                }
            }
        }

        let mut class_counts = vec![0usize; vocab.len()];
        let mut y = Array2::zeros((num_samples, vocab.len()));
        for (i, &label) in labels.iter().enumerate() {
            y[[i, label]] = 1.0;
            class_counts[label] += 1;
        }

        Self {
            x,
            y,
            vocab,
            class_counts,
            skipped_malformed,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.shape()[0]
    }

    /// True when the dataset holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timesteps per sample.
    pub fn sequence_length(&self) -> usize {
        self.x.shape()[1]
    }

    /// Numeric channels per timestep, read off the loaded tensor.
    pub fn feature_dim(&self) -> usize {
        self.x.shape()[2]
    }

    /// Number of classes in the target tensor.
    pub fn num_classes(&self) -> usize {
        self.y.shape()[1]
    }

    /// Split off the trailing `fraction` of samples for validation.
    ///
    /// The split is positional: training keeps the leading
    /// `floor(n * (1 - fraction))` samples, validation takes the rest, with
    /// no re-shuffling before the cut.
    pub fn split_validation(&self, fraction: f32) -> (DatasetView<'_>, DatasetView<'_>) {
        let n = self.len();
        let train_len = ((n as f32 * (1.0 - fraction)).floor() as usize).min(n);

        let train_indices: Vec<usize> = (0..train_len).collect();
        let val_indices: Vec<usize> = (train_len..n).collect();

        (
            DatasetView::new(self, train_indices),
            DatasetView::new(self, val_indices),
        )
    }
}

/// A borrowed subset of a dataset, addressed by sample indices.
#[derive(Debug)]
pub struct DatasetView<'a> {
    dataset: &'a GestureDataset,
    indices: Vec<usize>,
}

impl<'a> DatasetView<'a> {
    fn new(dataset: &'a GestureDataset, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    /// Number of samples in the view.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when the view holds no samples.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Reorder the view's samples in place.
    pub fn shuffle<R: rand::Rng>(&mut self, rng: &mut R) {
        self.indices.shuffle(rng);
    }

    /// Materialize the whole view as one batch.
    pub fn full_batch(&self) -> (Array3<f32>, Array2<f32>) {
        self.batch_at(&self.indices)
    }

    /// Iterate over mini-batches of at most `batch_size` samples, in the
    /// view's current order.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = (Array3<f32>, Array2<f32>)> + '_ {
        self.indices
            .chunks(batch_size.max(1))
            .map(move |chunk| self.batch_at(chunk))
    }

    fn batch_at(&self, indices: &[usize]) -> (Array3<f32>, Array2<f32>) {
        (
            self.dataset.x.select(Axis(0), indices),
            self.dataset.y.select(Axis(0), indices),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_dataset(n: usize) -> GestureDataset {
        let sequences: Vec<Vec<Vec<f32>>> = (0..n)
            .map(|i| vec![vec![i as f32, 0.0]; 4])
            .collect();
        let labels: Vec<usize> = (0..n).map(|i| i % 3).collect();
        GestureDataset::from_samples(sequences, labels, 2, LabelVocabulary::gestures(), 0)
    }

    #[test]
    fn test_tensor_shapes() {
        let dataset = toy_dataset(9);
        assert_eq!(dataset.x.shape(), &[9, 4, 2]);
        assert_eq!(dataset.y.shape(), &[9, 3]);
        assert_eq!(dataset.sequence_length(), 4);
        assert_eq!(dataset.feature_dim(), 2);
    }

    #[test]
    fn test_one_hot_encoding() {
        let dataset = toy_dataset(3);
        for i in 0..3 {
            let row = dataset.y.row(i);
            assert_eq!(row.sum(), 1.0);
            assert_eq!(row[i % 3], 1.0);
        }
        assert_eq!(dataset.class_counts, vec![1, 1, 1]);
    }

    #[test]
    fn test_trailing_validation_split() {
        let dataset = toy_dataset(10);
        let (train, val) = dataset.split_validation(0.2);
        assert_eq!(train.len(), 8);
        assert_eq!(val.len(), 2);

        // The validation view must hold the last samples, in file order.
        let (vx, _) = val.full_batch();
        assert_eq!(vx[[0, 0, 0]], 8.0);
        assert_eq!(vx[[1, 0, 0]], 9.0);
    }

    #[test]
    fn test_split_rounds_train_count_down() {
        // 7 samples at 0.2: training keeps floor(5.6) = 5, the other 2
        // validate. Rounding the held-out count down instead would validate
        // on a single sample.
        let dataset = toy_dataset(7);
        let (train, val) = dataset.split_validation(0.2);
        assert_eq!(train.len(), 5);
        assert_eq!(val.len(), 2);

        let (vx, _) = val.full_batch();
        assert_eq!(vx[[0, 0, 0]], 5.0);
        assert_eq!(vx[[1, 0, 0]], 6.0);
    }

    #[test]
    fn test_split_fraction_above_one_holds_out_everything() {
        let dataset = toy_dataset(5);
        let (train, val) = dataset.split_validation(1.5);
        assert!(train.is_empty());
        assert_eq!(val.len(), 5);
    }

    #[test]
    fn test_batches_cover_all_samples() {
        let dataset = toy_dataset(10);
        let (train, _) = dataset.split_validation(0.0);
        let total: usize = train.batches(3).map(|(x, _)| x.shape()[0]).sum();
        assert_eq!(total, 10);

        let sizes: Vec<usize> = train.batches(3).map(|(x, _)| x.shape()[0]).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
    }

    #[test]
    fn test_shuffle_preserves_membership() {
        let dataset = toy_dataset(10);
        let (mut train, _) = dataset.split_validation(0.0);
        train.shuffle(&mut rand::thread_rng());

        let (x, _) = train.full_batch();
        let mut firsts: Vec<i64> = (0..10).map(|i| x[[i, 0, 0]] as i64).collect();
        firsts.sort_unstable();
        assert_eq!(firsts, (0..10).collect::<Vec<i64>>());
    }
}
