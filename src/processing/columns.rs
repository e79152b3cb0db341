//! Column detection for records whose skills and label columns were not
//! named by the caller.

/// Name patterns for the candidate display column.
pub const CANDIDATE_LABEL_PATTERNS: &[&str] = &["name", "candidate"];

/// Name patterns for the target display column.
pub const TARGET_LABEL_PATTERNS: &[&str] = &["post", "title", "name"];

/// Name patterns for the skills column on either side.
pub const SKILLS_PATTERNS: &[&str] = &["skills", "skillset"];

/// Pick the column that best matches `patterns`.
///
/// An exact case-insensitive match wins, tried in pattern order. Otherwise
/// the first column whose name contains a pattern is chosen. Falls back to
/// the first column; returns `None` only when there are no columns.
pub fn detect_column<'a, S>(columns: &'a [S], patterns: &[&str]) -> Option<&'a str>
where
    S: AsRef<str>,
{
    for pattern in patterns {
        let pattern = pattern.to_lowercase();
        if let Some(column) = columns
            .iter()
            .map(S::as_ref)
            .find(|column| column.to_lowercase() == pattern)
        {
            return Some(column);
        }
    }

    for column in columns.iter().map(S::as_ref) {
        let lowered = column.to_lowercase();
        if patterns
            .iter()
            .any(|pattern| lowered.contains(&pattern.to_lowercase()))
        {
            return Some(column);
        }
    }

    columns.first().map(S::as_ref)
}
