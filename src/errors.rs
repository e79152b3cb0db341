use thiserror::Error;

/// Failures raised while producing or shaping embedding vectors.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to load embedding model {model}: {reason}")]
    ModelLoad { model: String, reason: String },
    #[error("unknown embedding model: {0}")]
    UnknownModel(String),
    #[error("embedding provider failed: {0}")]
    Provider(String),
    #[error("embedding batch returned {actual} vectors for {expected} texts")]
    BatchLength { expected: usize, actual: usize },
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Failures that abort a whole matching run.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("{0} collection is missing or empty")]
    InputAbsent(&'static str),
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error(transparent)]
    Provider(#[from] EmbeddingError),
}

impl MatchError {
    /// Stable kind name reported to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            MatchError::InputAbsent(_) => "InputAbsent",
            MatchError::InvalidParameter { .. } => "InvalidParameter",
            MatchError::Provider(_) => "ProviderFailure",
        }
    }

    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        MatchError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Configuration could not be read or failed validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
