use serde::Serialize;
use serde_json::{Map, Value};

/// A candidate that cleared the score floor for one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub candidate_id: usize,
    pub label: Option<String>,
    pub score: f32,
    /// Canonical skill text the score was computed from.
    pub skills_text: String,
    pub fields: Map<String, Value>,
}

/// Ranked candidates for a single target, best first.
///
/// An empty `ranked_candidates` means no candidate reached `min_score`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub target_id: usize,
    pub target_label: String,
    pub ranked_candidates: Vec<RankedCandidate>,
}
