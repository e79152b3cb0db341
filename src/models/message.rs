use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::result::MatchResult;
use crate::errors::MatchError;

/// Explicit column names for one collection. Missing names are detected
/// from the collection's columns.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct FieldSelection {
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// A single matching run received from a client.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct MatchRequest {
    #[serde(default)]
    pub targets: Vec<Map<String, Value>>,
    #[serde(default)]
    pub candidates: Vec<Map<String, Value>>,
    #[serde(default)]
    pub target_fields: FieldSelection,
    #[serde(default)]
    pub candidate_fields: FieldSelection,
    /// Integer or numeric string.
    #[serde(default)]
    pub top_k: Option<Value>,
    /// Number or numeric string.
    #[serde(default)]
    pub min_score: Option<Value>,
}

/// Reply sent back for every request.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MatchResponse {
    Ok { results: Vec<MatchResult> },
    Error { kind: String, message: String },
}

impl MatchResponse {
    /// Reply for a payload that could not be decoded at all.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        MatchResponse::Error {
            kind: "InvalidRequest".to_string(),
            message: message.into(),
        }
    }
}

impl From<MatchError> for MatchResponse {
    fn from(error: MatchError) -> Self {
        MatchResponse::Error {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}
