use std::num::IntErrorKind;

use ndarray::Array2;
use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::domain::entity::Entity;
use crate::domain::result::{MatchResult, RankedCandidate};
use crate::domain::skills::NormalizedSkills;
use crate::errors::{EmbeddingError, MatchError};
use crate::models::message::{FieldSelection, MatchRequest, MatchResponse};
use crate::processing::columns::{
    CANDIDATE_LABEL_PATTERNS, SKILLS_PATTERNS, TARGET_LABEL_PATTERNS, detect_column,
};
use crate::processing::embedding::{EmbeddingProvider, embedding_matrix, zero_rows};
use crate::processing::normalizer::normalize;
use crate::processing::ranking::rank;
use crate::processing::similarity::similarity_matrix;
use crate::{DEFAULT_MIN_SCORE, DEFAULT_TOP_K};

/// Tunable inputs of a matching run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchParams {
    pub top_k: i64,
    pub min_score: f32,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl MatchParams {
    /// Parse request parameters, falling back to `defaults` for absent ones.
    ///
    /// Both accept JSON numbers or numeric strings.
    pub fn from_raw(
        top_k: Option<&Value>,
        min_score: Option<&Value>,
        defaults: &MatchParams,
    ) -> Result<Self, MatchError> {
        let top_k = match top_k {
            None | Some(Value::Null) => defaults.top_k,
            Some(value) => parse_top_k(value)?,
        };
        let min_score = match min_score {
            None | Some(Value::Null) => defaults.min_score,
            Some(value) => parse_min_score(value)?,
        };

        Ok(Self { top_k, min_score })
    }
}

/// Integers beyond the `i64` range saturate.
fn parse_top_k(value: &Value) -> Result<i64, MatchError> {
    match value {
        Value::Number(number) => match (number.as_i64(), number.as_u64()) {
            (Some(top_k), _) => Ok(top_k),
            (None, Some(_)) => Ok(i64::MAX),
            (None, None) => Err(MatchError::invalid_parameter(
                "top_k",
                format!("{number} is not an integer"),
            )),
        },
        Value::String(text) => match text.trim().parse::<i64>() {
            Ok(top_k) => Ok(top_k),
            Err(error) => match error.kind() {
                IntErrorKind::PosOverflow => Ok(i64::MAX),
                IntErrorKind::NegOverflow => Ok(i64::MIN),
                _ => Err(MatchError::invalid_parameter(
                    "top_k",
                    format!("{text:?} is not an integer: {error}"),
                )),
            },
        },
        other => Err(MatchError::invalid_parameter(
            "top_k",
            format!("expected an integer, got {other}"),
        )),
    }
}

/// Finite values beyond the `f32` range saturate to its extremes.
fn parse_min_score(value: &Value) -> Result<f32, MatchError> {
    let score = match value {
        Value::Number(number) => number.as_f64().ok_or_else(|| {
            MatchError::invalid_parameter("min_score", format!("{number} is not a number"))
        })?,
        Value::String(text) => text.trim().parse::<f64>().map_err(|error| {
            MatchError::invalid_parameter("min_score", format!("{text:?} is not a number: {error}"))
        })?,
        other => {
            return Err(MatchError::invalid_parameter(
                "min_score",
                format!("expected a number, got {other}"),
            ));
        }
    };

    if !score.is_finite() {
        return Err(MatchError::invalid_parameter(
            "min_score",
            format!("{score} is not a finite number"),
        ));
    }
    Ok(score.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32)
}

/// Embed one collection's canonical skill texts in a single batch.
///
/// Rows of entities without skills are zeroed.
fn embed_collection<P>(
    provider: &P,
    skills: &[NormalizedSkills],
) -> Result<Array2<f32>, EmbeddingError>
where
    P: EmbeddingProvider + ?Sized,
{
    let texts: Vec<String> = skills
        .iter()
        .map(|normalized| normalized.canonical_text.clone())
        .collect();
    let vectors = provider.embed_batch(&texts)?;

    let mut matrix = embedding_matrix(vectors, texts.len())?;
    let empty: Vec<bool> = skills.iter().map(NormalizedSkills::is_empty).collect();
    zero_rows(&mut matrix, &empty);

    Ok(matrix)
}

fn target_label(target: &Entity) -> String {
    target
        .label
        .clone()
        .unwrap_or_else(|| format!("Target {}", target.id))
}

/// Rank every candidate against every target.
///
/// Returns one [`MatchResult`] per target, in target order. Both
/// collections must be non-empty. Either every target gets a result or the
/// whole run fails.
pub fn match_entities<P>(
    provider: &P,
    targets: &[Entity],
    candidates: &[Entity],
    params: &MatchParams,
) -> Result<Vec<MatchResult>, MatchError>
where
    P: EmbeddingProvider + ?Sized,
{
    match_with_stats(provider, targets, candidates, params).map(|(results, _)| results)
}

fn match_with_stats<P>(
    provider: &P,
    targets: &[Entity],
    candidates: &[Entity],
    params: &MatchParams,
) -> Result<(Vec<MatchResult>, MatchStats), MatchError>
where
    P: EmbeddingProvider + ?Sized,
{
    if targets.is_empty() {
        return Err(MatchError::InputAbsent("targets"));
    }
    if candidates.is_empty() {
        return Err(MatchError::InputAbsent("candidates"));
    }

    let target_skills: Vec<NormalizedSkills> = targets
        .iter()
        .map(|target| normalize(target.raw_skill_text.as_deref()))
        .collect();
    let candidate_skills: Vec<NormalizedSkills> = candidates
        .iter()
        .map(|candidate| normalize(candidate.raw_skill_text.as_deref()))
        .collect();

    let (target_vectors, candidate_vectors) = rayon::join(
        || embed_collection(provider, &target_skills),
        || embed_collection(provider, &candidate_skills),
    );
    let scores = similarity_matrix(target_vectors?.view(), candidate_vectors?.view())?;

    let candidate_rows: Vec<(&Entity, &NormalizedSkills)> =
        candidates.iter().zip(&candidate_skills).collect();

    let results: Vec<MatchResult> = targets
        .par_iter()
        .enumerate()
        .map(|(row, target)| {
            let ranked = rank(
                scores.row(row).iter().copied(),
                &candidate_rows,
                params.min_score,
                params.top_k,
            );

            MatchResult {
                target_id: target.id,
                target_label: target_label(target),
                ranked_candidates: ranked
                    .into_iter()
                    .map(|((candidate, skills), score)| RankedCandidate {
                        candidate_id: candidate.id,
                        label: candidate.label.clone(),
                        score,
                        skills_text: skills.canonical_text.clone(),
                        fields: candidate.raw_fields.clone(),
                    })
                    .collect(),
            }
        })
        .collect();

    let stats = MatchStats::collect(&target_skills, &candidate_skills, &results);
    Ok((results, stats))
}

/// Turn raw records into entities, detecting the skills and label columns
/// when the caller did not name them.
///
/// Detection sees every key that appears in any record, in first-seen order.
pub fn build_entities(
    records: Vec<Map<String, Value>>,
    fields: &FieldSelection,
    label_patterns: &[&str],
) -> Vec<Entity> {
    let mut columns: Vec<String> = Vec::new();
    for key in records.iter().flat_map(|record| record.keys()) {
        if !columns.contains(key) {
            columns.push(key.clone());
        }
    }

    let skills_field = fields
        .skills
        .clone()
        .or_else(|| detect_column(&columns, SKILLS_PATTERNS).map(str::to_string));
    let label_field = fields
        .label
        .clone()
        .or_else(|| detect_column(&columns, label_patterns).map(str::to_string));

    log::debug!(
        "Resolved columns: skills={}, label={}",
        skills_field.as_deref().unwrap_or("-"),
        label_field.as_deref().unwrap_or("-")
    );

    records
        .into_iter()
        .enumerate()
        .map(|(id, record)| {
            Entity::from_record(id, record, skills_field.as_deref(), label_field.as_deref())
        })
        .collect()
}

#[derive(Default, Debug, PartialEq)]
struct MatchStats {
    targets_loaded: usize,
    candidates_loaded: usize,
    targets_without_skills: usize,
    candidates_without_skills: usize,
    matched_pairs: usize,
    targets_without_matches: usize,
}

impl MatchStats {
    fn collect(
        targets: &[NormalizedSkills],
        candidates: &[NormalizedSkills],
        results: &[MatchResult],
    ) -> Self {
        let without_skills =
            |skills: &[NormalizedSkills]| skills.iter().filter(|skills| skills.is_empty()).count();

        Self {
            targets_loaded: targets.len(),
            candidates_loaded: candidates.len(),
            targets_without_skills: without_skills(targets),
            candidates_without_skills: without_skills(candidates),
            matched_pairs: results
                .iter()
                .map(|result| result.ranked_candidates.len())
                .sum(),
            targets_without_matches: results
                .iter()
                .filter(|result| result.ranked_candidates.is_empty())
                .count(),
        }
    }
}

fn run_match_request<P>(
    request: MatchRequest,
    provider: &P,
    defaults: &MatchParams,
) -> Result<(Vec<MatchResult>, MatchStats), MatchError>
where
    P: EmbeddingProvider + ?Sized,
{
    let params = MatchParams::from_raw(
        request.top_k.as_ref(),
        request.min_score.as_ref(),
        defaults,
    )?;

    let targets = build_entities(
        request.targets,
        &request.target_fields,
        TARGET_LABEL_PATTERNS,
    );
    let candidates = build_entities(
        request.candidates,
        &request.candidate_fields,
        CANDIDATE_LABEL_PATTERNS,
    );

    match_with_stats(provider, &targets, &candidates, &params)
}

/// Handle one match request and build the reply for it.
pub fn process_match_message<P>(
    request: MatchRequest,
    provider: &P,
    defaults: &MatchParams,
) -> MatchResponse
where
    P: EmbeddingProvider + ?Sized,
{
    log::info!(
        "Received match request: targets={}, candidates={}",
        request.targets.len(),
        request.candidates.len()
    );

    match run_match_request(request, provider, defaults) {
        Ok((results, stats)) => {
            log::info!(
                "Finished match request: targets_loaded={}, candidates_loaded={}, targets_without_skills={}, candidates_without_skills={}, matched_pairs={}, targets_without_matches={}",
                stats.targets_loaded,
                stats.candidates_loaded,
                stats.targets_without_skills,
                stats.candidates_without_skills,
                stats.matched_pairs,
                stats.targets_without_matches
            );
            if stats.targets_without_matches > 0 {
                log::warn!(
                    "{} of {} targets had no candidate above the score floor",
                    stats.targets_without_matches,
                    stats.targets_loaded
                );
            }
            if stats.candidates_without_skills == stats.candidates_loaded {
                log::warn!("No candidate has any skills listed; every score is 0.0");
            }
            MatchResponse::Ok { results }
        }
        Err(error) => {
            log::error!("Match request failed ({}): {error}", error.kind());
            error.into()
        }
    }
}
