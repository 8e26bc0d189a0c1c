//! # Numeric Vector Utilities
//!
//! Shared numeric primitives for the compatibility scorer: range
//! normalization, length resampling, weighted fusion, and cosine similarity.
//! All functions are pure and allocation-light; callers own the inputs.

/// Normalize a psychometric profile to the [0, 1] range using min-max scaling.
///
/// ## Degenerate inputs:
/// If every value is identical (or the profile is empty), there is no
/// discriminating information to preserve, so a constant 0.5 vector at the
/// original length is returned instead of dividing by zero.
pub fn normalize(profile: &[f64]) -> Vec<f64> {
    if profile.is_empty() {
        return Vec::new();
    }

    let min = profile.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = profile.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range == 0.0 {
        return vec![0.5; profile.len()];
    }

    // Clamp absorbs floating-point drift at the extremes
    profile
        .iter()
        .map(|&value| ((value - min) / range).clamp(0.0, 1.0))
        .collect()
}

/// Resample a vector to `target_len` entries using piecewise-linear
/// interpolation, treating the input samples as evenly spaced over [0, 1].
///
/// This makes profiles of different cardinality comparable without
/// truncation: monotonic trends survive, only resolution changes.
///
/// ## Degenerate inputs:
/// - empty input → neutral 0.5 at every output slot
/// - single value → broadcast to every output slot
pub fn resample(vector: &[f64], target_len: usize) -> Vec<f64> {
    if vector.len() == target_len {
        return vector.to_vec();
    }

    if vector.is_empty() {
        return vec![0.5; target_len];
    }

    if vector.len() == 1 {
        return vec![vector[0]; target_len];
    }

    let last_input = (vector.len() - 1) as f64;
    (0..target_len)
        .map(|i| {
            // Query point in [0, 1], mapped onto the input sample grid
            let t = if target_len > 1 {
                i as f64 / (target_len - 1) as f64
            } else {
                0.0
            };
            let position = t * last_input;
            let lower = position.floor() as usize;
            let upper = (lower + 1).min(vector.len() - 1);
            let fraction = position - lower as f64;
            vector[lower] + (vector[upper] - vector[lower]) * fraction
        })
        .collect()
}

/// Fuse two feature vectors by scaling each with its weight and
/// concatenating, `a` segment first.
///
/// The two vectors represent different feature families, so no length
/// matching is required; the output length is `a.len() + b.len()`. Downstream
/// consumers rely on the fixed segment order to know which half is which.
pub fn fuse(a: &[f64], weight_a: f64, b: &[f64], weight_b: f64) -> Vec<f64> {
    a.iter()
        .map(|&value| value * weight_a)
        .chain(b.iter().map(|&value| value * weight_b))
        .collect()
}

/// Cosine similarity `dot(u, v) / (||u|| * ||v||)`.
///
/// Returns NaN for zero-magnitude inputs; callers guard the zero-vector case
/// before calling and check `is_finite` on the result.
pub fn cosine_similarity(u: &[f64], v: &[f64]) -> f64 {
    let dot: f64 = u.iter().zip(v.iter()).map(|(x, y)| x * y).sum();
    let norm_u: f64 = u.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_v: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();

    dot / (norm_u * norm_v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_constant_profile() {
        assert_eq!(normalize(&[3.0, 3.0, 3.0]), vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_normalize_empty_profile() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn test_normalize_range() {
        let normalized = normalize(&[2.0, 4.0, 6.0]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_normalize_handles_negative_values() {
        let normalized = normalize(&[-10.0, 0.0, 10.0]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_resample_same_length_is_identity() {
        let input = vec![0.1, 0.9, 0.4];
        assert_eq!(resample(&input, 3), input);
    }

    #[test]
    fn test_resample_empty_gives_neutral_prior() {
        assert_eq!(resample(&[], 5), vec![0.5; 5]);
    }

    #[test]
    fn test_resample_single_value_broadcasts() {
        assert_eq!(resample(&[0.5], 5), vec![0.5; 5]);
        assert_eq!(resample(&[0.3], 4), vec![0.3; 4]);
    }

    #[test]
    fn test_resample_linear_interpolation() {
        // Upsampling a straight line must stay on the line
        let resampled = resample(&[0.0, 1.0], 5);
        let expected = [0.0, 0.25, 0.5, 0.75, 1.0];
        for (got, want) in resampled.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_resample_preserves_endpoints() {
        let resampled = resample(&[0.2, 0.8, 0.4, 0.6], 9);
        assert!((resampled[0] - 0.2).abs() < 1e-12);
        assert!((resampled[8] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_fuse_order_and_weights() {
        let fused = fuse(&[1.0, 2.0], 0.5, &[3.0], 2.0);
        assert_eq!(fused, vec![0.5, 1.0, 6.0]);
    }

    #[test]
    fn test_fuse_with_empty_segment() {
        assert_eq!(fuse(&[], 0.5, &[1.0, 1.0], 1.0), vec![1.0, 1.0]);
    }

    #[test]
    fn test_cosine_identical_vectors() {
        let v = vec![0.3, 0.6, 0.9];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let similarity = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(similarity.abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_vector_is_not_finite() {
        assert!(!cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).is_finite());
    }
}
