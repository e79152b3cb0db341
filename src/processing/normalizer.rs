use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::skills::NormalizedSkills;

/// Separator used to split and rejoin skill lists.
pub const SKILL_SEPARATOR: &str = ", ";

static ALTERNATE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;/|]+").expect("separator pattern is valid"));

/// Turn a raw skill field into its canonical token list and text.
///
/// `;`, `/` and `|` act as commas. Tokens are trimmed, empty tokens are
/// dropped, and duplicates are removed case-insensitively keeping the first
/// spelling and position. Never fails: an absent field yields no tokens.
pub fn normalize(raw: Option<&str>) -> NormalizedSkills {
    let Some(raw) = raw else {
        return NormalizedSkills::default();
    };

    let unified = ALTERNATE_SEPARATORS.replace_all(raw, ",");

    let mut seen = HashSet::new();
    let skill_tokens: Vec<String> = unified
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(token.to_lowercase()))
        .map(str::to_string)
        .collect();

    let canonical_text = skill_tokens.join(SKILL_SEPARATOR);

    NormalizedSkills {
        skill_tokens,
        canonical_text,
    }
}
