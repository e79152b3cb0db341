/// Canonical form of one entity's skill field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedSkills {
    /// Case-insensitively unique tokens in first-seen order.
    pub skill_tokens: Vec<String>,
    /// Tokens joined with `", "`; empty when there are no tokens.
    pub canonical_text: String,
}

impl NormalizedSkills {
    pub fn is_empty(&self) -> bool {
        self.skill_tokens.is_empty()
    }
}
