//! Helpers for integration tests.

use std::sync::Mutex;

use skill_matcher::errors::EmbeddingError;
use skill_matcher::processing::embedding::EmbeddingProvider;

/// Deterministic stand-in for a text model: each known skill owns one
/// dimension, and a text embeds to the sum of its skills' one-hot vectors.
/// Unknown skills contribute nothing.
pub struct VocabularyEmbedder {
    vocabulary: Vec<String>,
    calls: Mutex<usize>,
}

impl VocabularyEmbedder {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|skill| skill.to_lowercase()).collect(),
            calls: Mutex::new(0),
        }
    }

    /// Number of `embed_batch` calls served so far.
    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("calls mutex poisoned")
    }
}

impl EmbeddingProvider for VocabularyEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        *self.calls.lock().expect("calls mutex poisoned") += 1;

        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0; self.vocabulary.len()];
                for token in text.split(',').map(|token| token.trim().to_lowercase()) {
                    if let Some(index) = self.vocabulary.iter().position(|skill| *skill == token) {
                        vector[index] += 1.0;
                    }
                }
                vector
            })
            .collect())
    }
}
