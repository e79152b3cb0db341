/// Rank one target's score row against the candidate collection.
///
/// Keeps candidates whose score is at least `min_score`, orders them by
/// descending score and returns at most `top_k` of them. Equal scores keep
/// the candidates' input order. A `top_k` of zero or less returns nothing.
/// `min_score` is used as given, without clamping.
pub fn rank<'a, T, I>(
    scores: I,
    candidates: &'a [T],
    min_score: f32,
    top_k: i64,
) -> Vec<(&'a T, f32)>
where
    I: IntoIterator<Item = f32>,
{
    if top_k <= 0 {
        return Vec::new();
    }
    let limit = usize::try_from(top_k).unwrap_or(usize::MAX);

    let mut ranked: Vec<(&T, f32)> = candidates
        .iter()
        .zip(scores)
        .filter(|(_, score)| *score >= min_score)
        .collect();

    // `sort_by` is stable, which gives ties their input order.
    ranked.sort_by(|(_, left), (_, right)| right.total_cmp(left));
    ranked.truncate(limit);
    ranked
}
