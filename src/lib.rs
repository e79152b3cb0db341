pub mod domain;
pub mod errors;
pub mod models;
pub mod processing;

/// Number of candidates returned per target when a request does not say.
pub const DEFAULT_TOP_K: i64 = 10;

/// Inclusive score floor applied when a request does not say.
pub const DEFAULT_MIN_SCORE: f32 = 0.0;

/// Embedding model used when the configuration does not pin one.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
