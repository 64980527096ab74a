//! Label vocabulary for gesture classes
//!
//! The vocabulary is an immutable value injected into the dataset loader, so
//! tests and alternative capture protocols can run pipelines with different
//! class sets side by side.

use serde::{Deserialize, Serialize};

/// Ordered mapping from gesture class names to dense indices 0..N.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelVocabulary {
    names: Vec<String>,
}

impl LabelVocabulary {
    /// Create a vocabulary from an ordered list of class names.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The fixed production vocabulary: neutral, open_palm, pinch.
    pub fn gestures() -> Self {
        Self::new(["neutral", "open_palm", "pinch"])
    }

    /// Dense index for a class name, `None` if the label is out of vocabulary.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.names.iter().position(|n| n == label)
    }

    /// Class name at an index.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if the vocabulary has no classes.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Ordered class names.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_vocabulary_order() {
        let vocab = LabelVocabulary::gestures();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.index_of("neutral"), Some(0));
        assert_eq!(vocab.index_of("open_palm"), Some(1));
        assert_eq!(vocab.index_of("pinch"), Some(2));
    }

    #[test]
    fn test_unknown_label() {
        let vocab = LabelVocabulary::gestures();
        assert_eq!(vocab.index_of("fist"), None);
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocab = LabelVocabulary::new(["wave", "point"]);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.index_of("point"), Some(1));
        assert_eq!(vocab.name_of(0), Some("wave"));
    }
}
