use crate::core::strategy::ScoringError;

/// Round a similarity in [-1, 1] to a percentage with two decimals
///
/// `0.666666` becomes `66.67`.
#[inline]
pub fn to_percentage(similarity: f64) -> f64 {
    round2(similarity * 100.0)
}

/// Round to two decimal places
///
/// Values that round to zero come back as `0.0`, never `-0.0`.
#[inline]
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Cosine similarity between two vectors
///
/// Computed as the dot product divided by the product of the L2 norms, in f64
/// regardless of the input precision. A zero vector has no direction, so any
/// comparison against it yields 0.0.
///
/// # Errors
/// `ScoringError::DimensionMismatch` when the vectors differ in length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, ScoringError> {
    if a.len() != b.len() {
        return Err(ScoringError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return Ok(0.0);
    }

    Ok((dot / denom).clamp(-1.0, 1.0))
}
