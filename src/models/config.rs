//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::errors::ConfigError;
use crate::{DEFAULT_EMBEDDING_MODEL, DEFAULT_MIN_SCORE, DEFAULT_TOP_K};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "SKILL_MATCHER_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "config/default";
const ENV_PREFIX: &str = "SKILL_MATCHER";

#[derive(Clone, Debug, Deserialize)]
/// Settings for the matching worker.
pub struct ServerConfig {
    pub zmq_address: String,
    pub embedding_model: String,
    #[serde(default)]
    pub model_cache_dir: Option<String>,
    #[serde(default)]
    pub embedding_batch_size: Option<usize>,
    pub default_top_k: i64,
    pub default_min_score: f32,
}

impl ServerConfig {
    /// Load configuration from defaults, an optional YAML file and the
    /// environment, in that order of precedence (later wins).
    ///
    /// When `path` is `None` the optional `config/default.yaml` is used.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .set_default("zmq_address", "tcp://127.0.0.1:5556")?
            .set_default("embedding_model", DEFAULT_EMBEDDING_MODEL)?
            .set_default("default_top_k", DEFAULT_TOP_K)?
            .set_default("default_min_score", f64::from(DEFAULT_MIN_SCORE))?
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the worker cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zmq_address.trim().is_empty() {
            return Err(ConfigError::Invalid("zmq_address must not be empty".into()));
        }
        if self.embedding_batch_size == Some(0) {
            return Err(ConfigError::Invalid(
                "embedding_batch_size must be greater than 0".into(),
            ));
        }
        if self.default_top_k <= 0 {
            return Err(ConfigError::Invalid(
                "default_top_k must be greater than 0".into(),
            ));
        }
        if !self.default_min_score.is_finite() {
            return Err(ConfigError::Invalid(
                "default_min_score must be a finite number".into(),
            ));
        }
        Ok(())
    }
}
