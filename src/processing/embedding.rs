use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use ndarray::Array2;

use crate::errors::EmbeddingError;
use crate::models::config::ServerConfig;

/// Batch text embedder shared by every matching run.
///
/// Implementations return one vector per input text, in input order, all of
/// the same dimension.
pub trait EmbeddingProvider: Send + Sync {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Resolve a pinned model name to a fastembed model.
pub fn parse_embedding_model(name: &str) -> Result<EmbeddingModel, EmbeddingError> {
    match name.trim().to_lowercase().as_str() {
        "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
            Ok(EmbeddingModel::AllMiniLML6V2)
        }
        "all-minilm-l12-v2" | "sentence-transformers/all-minilm-l12-v2" => {
            Ok(EmbeddingModel::AllMiniLML12V2)
        }
        "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "multilingual-e5-large" | "intfloat/multilingual-e5-large" => {
            Ok(EmbeddingModel::MultilingualE5Large)
        }
        _ => Err(EmbeddingError::UnknownModel(name.to_string())),
    }
}

/// Local ONNX embedder loaded once at startup.
pub struct FastEmbedProvider {
    model_name: String,
    batch_size: Option<usize>,
    embedder: Mutex<TextEmbedding>,
}

impl FastEmbedProvider {
    /// Load the model named in the configuration.
    ///
    /// Weights are downloaded into `model_cache_dir` on first use, so this
    /// can take a while and should happen once per process.
    pub fn try_new(config: &ServerConfig) -> Result<Self, EmbeddingError> {
        let model = parse_embedding_model(&config.embedding_model)?;

        let mut options = InitOptions::new(model).with_show_download_progress(false);
        if let Some(cache_dir) = &config.model_cache_dir {
            options = options.with_cache_dir(PathBuf::from(cache_dir));
        }

        let embedder = TextEmbedding::try_new(options).map_err(|error| {
            EmbeddingError::ModelLoad {
                model: config.embedding_model.clone(),
                reason: format!("{error:?}"),
            }
        })?;

        Ok(Self {
            model_name: config.embedding_model.clone(),
            batch_size: config.embedding_batch_size,
            embedder: Mutex::new(embedder),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embedder = self
            .embedder
            .lock()
            .map_err(|_| EmbeddingError::Provider("embedding model lock poisoned".to_string()))?;

        embedder
            .embed(texts.to_vec(), self.batch_size)
            .map_err(|error| EmbeddingError::Provider(format!("{error:?}")))
    }
}

/// Pack a provider batch into a dense `rows x dim` matrix.
///
/// Fails when the provider returned the wrong number of vectors or vectors
/// of differing length.
pub fn embedding_matrix(
    vectors: Vec<Vec<f32>>,
    expected_rows: usize,
) -> Result<Array2<f32>, EmbeddingError> {
    if vectors.len() != expected_rows {
        return Err(EmbeddingError::BatchLength {
            expected: expected_rows,
            actual: vectors.len(),
        });
    }

    let dim = vectors.first().map(Vec::len).unwrap_or_default();
    let mut flat = Vec::with_capacity(expected_rows * dim);
    for vector in vectors {
        if vector.len() != dim {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dim,
                actual: vector.len(),
            });
        }
        flat.extend(vector);
    }

    Array2::from_shape_vec((expected_rows, dim), flat).map_err(|error| {
        EmbeddingError::Provider(format!("failed to shape embedding batch: {error}"))
    })
}

/// Zero the rows flagged in `empty`, so entities without skills sit at the
/// origin of the embedding space.
pub(crate) fn zero_rows(matrix: &mut Array2<f32>, empty: &[bool]) {
    for (mut row, _) in matrix
        .rows_mut()
        .into_iter()
        .zip(empty)
        .filter(|(_, is_empty)| **is_empty)
    {
        row.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use fastembed::EmbeddingModel;
    use ndarray::array;

    use super::{embedding_matrix, parse_embedding_model, zero_rows};
    use crate::errors::EmbeddingError;

    #[test]
    fn parses_pinned_model_names() {
        assert_eq!(
            parse_embedding_model("all-MiniLM-L6-v2").expect("known model"),
            EmbeddingModel::AllMiniLML6V2
        );
        assert_eq!(
            parse_embedding_model("BAAI/bge-small-en-v1.5").expect("known model"),
            EmbeddingModel::BGESmallENV15
        );
        assert!(matches!(
            parse_embedding_model("word2vec"),
            Err(EmbeddingError::UnknownModel(name)) if name == "word2vec"
        ));
    }

    #[test]
    fn embedding_matrix_packs_rows_in_order() {
        let matrix = embedding_matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2)
            .expect("batch should pack");

        assert_eq!(matrix, array![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn embedding_matrix_rejects_short_batches() {
        let result = embedding_matrix(vec![vec![1.0, 2.0]], 2);

        assert!(matches!(
            result,
            Err(EmbeddingError::BatchLength {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn embedding_matrix_rejects_ragged_vectors() {
        let result = embedding_matrix(vec![vec![1.0, 2.0], vec![3.0]], 2);

        assert!(matches!(
            result,
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn zero_rows_clears_only_flagged_rows() {
        let mut matrix = array![[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]];

        zero_rows(&mut matrix, &[false, true, false]);

        assert_eq!(matrix, array![[1.0, 2.0], [0.0, 0.0], [5.0, 6.0]]);
    }
}
