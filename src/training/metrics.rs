//! Loss and accuracy metrics

use ndarray::Array2;

/// Mean categorical cross-entropy between predicted probabilities and
/// one-hot targets, averaged over the batch.
pub fn categorical_cross_entropy(probs: &Array2<f32>, targets: &Array2<f32>) -> f32 {
    let epsilon = 1e-7;
    let clamped = probs.mapv(|p| p.clamp(epsilon, 1.0 - epsilon));
    -(targets * &clamped.mapv(f32::ln)).sum() / targets.nrows() as f32
}

/// Fraction of samples whose predicted class matches the target class.
pub fn accuracy(probs: &Array2<f32>, targets: &Array2<f32>) -> f32 {
    let n = probs.nrows();
    if n == 0 {
        return 0.0;
    }

    let correct = probs
        .rows()
        .into_iter()
        .zip(targets.rows())
        .filter(|(p, t)| argmax(p) == argmax(t))
        .count();
    correct as f32 / n as f32
}

fn argmax(row: &ndarray::ArrayView1<f32>) -> usize {
    row.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(index, _)| index)
        .unwrap_or(0)
}
