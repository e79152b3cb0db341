use ndarray::{Array2, ArrayView2};

use crate::errors::EmbeddingError;

/// Scale every row to unit length.
///
/// Norms are accumulated in `f64` so very small or very large components
/// do not underflow or overflow. Rows that are all zero or hold a non-finite
/// component are set to all zeros and flagged.
fn unit_rows(vectors: ArrayView2<f32>) -> (Array2<f32>, Vec<bool>) {
    let mut unit = vectors.to_owned();
    let mut zero = Vec::with_capacity(unit.nrows());

    for mut row in unit.rows_mut() {
        let norm = row
            .iter()
            .map(|&value| f64::from(value) * f64::from(value))
            .sum::<f64>()
            .sqrt();
        if norm == 0.0 || !norm.is_finite() {
            row.fill(0.0);
            zero.push(true);
        } else {
            row.mapv_inplace(|value| (f64::from(value) / norm) as f32);
            zero.push(false);
        }
    }

    (unit, zero)
}

/// Cosine similarity of every target row against every candidate row.
///
/// The result has shape `targets.nrows() x candidates.nrows()` and is
/// computed as one product of the row-normalized matrices. Any pair that
/// involves a zero vector scores exactly `0.0`; all other scores are clamped
/// into `[-1, 1]`.
pub fn similarity_matrix(
    targets: ArrayView2<f32>,
    candidates: ArrayView2<f32>,
) -> Result<Array2<f32>, EmbeddingError> {
    let (rows, cols) = (targets.nrows(), candidates.nrows());
    if rows == 0 || cols == 0 {
        return Ok(Array2::zeros((rows, cols)));
    }
    if targets.ncols() != candidates.ncols() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: targets.ncols(),
            actual: candidates.ncols(),
        });
    }

    let (targets, target_zero) = unit_rows(targets);
    let (candidates, candidate_zero) = unit_rows(candidates);

    let mut scores = targets.dot(&candidates.t());
    for ((row, col), score) in scores.indexed_iter_mut() {
        let raw = *score;
        *score = if target_zero[row] || candidate_zero[col] {
            0.0
        } else {
            raw.clamp(-1.0, 1.0)
        };
    }

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};

    use super::similarity_matrix;
    use crate::errors::EmbeddingError;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        dot / (norm_a * norm_b)
    }

    #[test]
    fn matches_pairwise_cosine() {
        let targets = array![[1.0_f32, 2.0, 3.0], [-1.0, 0.5, 0.0]];
        let candidates = array![[3.0_f32, 2.0, 1.0], [2.0, 4.0, 6.0], [0.0, -1.0, 4.0]];

        let scores = similarity_matrix(targets.view(), candidates.view()).expect("same dimension");

        assert_eq!(scores.dim(), (2, 3));
        for (t, target) in targets.rows().into_iter().enumerate() {
            for (c, candidate) in candidates.rows().into_iter().enumerate() {
                let expected = cosine(
                    target.as_slice().expect("contiguous"),
                    candidate.as_slice().expect("contiguous"),
                );
                assert!(
                    (scores[[t, c]] - expected).abs() < 1e-5,
                    "cell ({t}, {c}): {} vs {expected}",
                    scores[[t, c]]
                );
            }
        }
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let targets = array![[0.1_f32, 0.2, 0.3], [1e3, -2e3, 5e2], [-0.2, -0.4, -0.6]];
        let candidates = targets.clone();

        let scores = similarity_matrix(targets.view(), candidates.view()).expect("same dimension");

        assert!(scores.iter().all(|score| (-1.0..=1.0).contains(score)));
        assert!((scores[[0, 0]] - 1.0).abs() < 1e-6);
        assert!((scores[[0, 2]] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vectors_score_exactly_zero() {
        let targets = array![[0.0_f32, 0.0], [1.0, 0.0]];
        let candidates = array![[-1.0_f32, 0.0], [0.0, 0.0]];

        let scores = similarity_matrix(targets.view(), candidates.view()).expect("same dimension");

        assert_eq!(scores[[0, 0]].to_bits(), 0.0_f32.to_bits());
        assert_eq!(scores[[0, 1]].to_bits(), 0.0_f32.to_bits());
        assert_eq!(scores[[1, 1]].to_bits(), 0.0_f32.to_bits());
        assert!((scores[[1, 0]] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn extreme_magnitudes_keep_their_direction() {
        let targets = array![[1e-25_f32, 0.0], [1.0, 0.0]];
        let candidates = array![[1.0_f32, 0.0], [1e25, 0.0], [0.0, -1e-30]];

        let scores = similarity_matrix(targets.view(), candidates.view()).expect("same dimension");

        assert!((scores[[0, 0]] - 1.0).abs() < 1e-6);
        assert!((scores[[0, 1]] - 1.0).abs() < 1e-6);
        assert!((scores[[1, 1]] - 1.0).abs() < 1e-6);
        assert_eq!(scores[[1, 2]], 0.0);
    }

    #[test]
    fn non_finite_rows_count_as_zero_vectors() {
        let targets = array![[f32::INFINITY, 1.0]];
        let candidates = array![[1.0_f32, 0.0]];

        let scores = similarity_matrix(targets.view(), candidates.view()).expect("same dimension");

        assert_eq!(scores[[0, 0]].to_bits(), 0.0_f32.to_bits());
    }

    #[test]
    fn empty_side_yields_empty_matrix() {
        let targets = array![[1.0_f32, 0.0]];
        let candidates = Array2::<f32>::zeros((0, 0));

        let scores = similarity_matrix(targets.view(), candidates.view()).expect("empty is fine");

        assert_eq!(scores.dim(), (1, 0));
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let targets = array![[1.0_f32, 0.0]];
        let candidates = array![[1.0_f32, 0.0, 0.0]];

        let result = similarity_matrix(targets.view(), candidates.view());

        assert!(matches!(
            result,
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }
}
