//! # Compatibility Scorer
//!
//! Computes a compatibility score between two users from their psychometric
//! profiles, optionally blended with a shared topic vector. The scorer is a
//! pure function over already-validated inputs: the user store decides what
//! exists, this module only distinguishes absent from empty via `Option`.
//!
//! ## Fallback policy:
//! Degenerate data (empty profiles, all-zero vectors, a topic set that fails
//! to vectorize, non-finite similarity) is never an error. Those cases
//! resolve to a 0.0 score with an explanatory interpretation so the scorer
//! stays total over all structurally valid inputs. Only structurally missing
//! data and negative weights are rejected.

use crate::matching::vector::{cosine_similarity, fuse, normalize, resample};
use crate::topics::vectorize_topics;
use std::fmt;

/// Minimum dimensionality of the comparison space. Very short profiles are
/// resampled up to this length so the similarity is never computed over a
/// degenerate 1-D or 2-D space.
const MIN_COMPARISON_DIMENSIONS: usize = 5;

/// Errors for structurally invalid scoring inputs. Both variants are
/// client-input problems and are never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Psychometric data is structurally absent (distinct from present-but-empty)
    MissingData(String),

    /// A negative weight was supplied
    InvalidWeight(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::MissingData(msg) => write!(f, "Missing psychometric data: {}", msg),
            MatchError::InvalidWeight(msg) => write!(f, "Invalid weight: {}", msg),
        }
    }
}

impl std::error::Error for MatchError {}

/// A compatibility score in [0, 1] plus its natural-language interpretation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CompatibilityResult {
    pub score: f64,
    pub interpretation: String,
}

impl CompatibilityResult {
    fn new(score: f64, interpretation: &str) -> Self {
        Self {
            score,
            interpretation: interpretation.to_string(),
        }
    }
}

/// Compute the compatibility score between two users.
///
/// ## Parameters:
/// - **profile_a / profile_b**: psychometric trait scores; `None` means the
///   user record carries no psychometric data at all
/// - **same_identity**: whether both sides refer to the same user
/// - **topics**: optional shared topic set for context-aware matching
/// - **topic_weight / psych_weight**: non-negative blend weights
///
/// ## Validation order (first match wins):
/// 1. Same identity → perfect score, no further computation
/// 2. Structurally missing data → `MatchError::MissingData`
/// 3. Present-but-empty profile → 0.0, "no data" interpretation
/// 4. Negative weight → `MatchError::InvalidWeight`
pub fn compute_compatibility(
    profile_a: Option<&[f64]>,
    profile_b: Option<&[f64]>,
    same_identity: bool,
    topics: Option<&[String]>,
    topic_weight: f64,
    psych_weight: f64,
) -> Result<CompatibilityResult, MatchError> {
    // Self-comparison is trivially perfect, independent of data quality
    if same_identity {
        return Ok(CompatibilityResult::new(
            1.0,
            "Identical users (perfect match)",
        ));
    }

    let raw_a = profile_a.ok_or_else(|| MatchError::MissingData("first user".to_string()))?;
    let raw_b = profile_b.ok_or_else(|| MatchError::MissingData("second user".to_string()))?;

    if raw_a.is_empty() || raw_b.is_empty() {
        return Ok(no_data_result());
    }

    if topic_weight < 0.0 || psych_weight < 0.0 {
        return Err(MatchError::InvalidWeight(format!(
            "weights must be non-negative (topic: {}, psychometric: {})",
            topic_weight, psych_weight
        )));
    }

    // Bring both profiles into a common, range-normalized comparison space
    let psych_a = normalize(raw_a);
    let psych_b = normalize(raw_b);

    let target_length = psych_a
        .len()
        .max(psych_b.len())
        .max(MIN_COMPARISON_DIMENSIONS);
    let psych_a = resample(&psych_a, target_length);
    let psych_b = resample(&psych_b, target_length);

    // Guard the cosine zero-vector singularity before any similarity math
    if is_all_zero(&psych_a) || is_all_zero(&psych_b) {
        return Ok(no_data_result());
    }

    // Topic handling is a decision table: no topics, nothing left after
    // trimming, or a degenerate topic vector all collapse to the same
    // psychometric-only branch.
    let score = match shared_topic_vector(topics) {
        Some(topic_vector) => {
            // Both users are fused against the same topic vector, so the
            // topic contribution measures shared-context relevance rather
            // than individual topic profiles.
            let fused_a = fuse(&topic_vector, topic_weight, &psych_a, psych_weight);
            let fused_b = fuse(&topic_vector, topic_weight, &psych_b, psych_weight);
            cosine_similarity(&fused_a, &fused_b)
        }
        None => cosine_similarity(&psych_a, &psych_b),
    };

    if !score.is_finite() {
        return Ok(CompatibilityResult::new(
            0.0,
            "Unable to compute compatibility score",
        ));
    }

    // Negative cosine means zero compatibility in this domain, not
    // anti-compatibility
    let score = score.clamp(0.0, 1.0);

    Ok(CompatibilityResult {
        interpretation: interpret_score(score).to_string(),
        score,
    })
}

/// Map a clamped score to its interpretation band (inclusive lower bounds).
pub fn interpret_score(score: f64) -> &'static str {
    if score >= 0.9 {
        "Exceptionally compatible - Perfect match"
    } else if score >= 0.8 {
        "Highly compatible - Strong match"
    } else if score >= 0.7 {
        "Very compatible - Good match"
    } else if score >= 0.6 {
        "Moderately compatible - Decent match"
    } else if score >= 0.4 {
        "Somewhat compatible - Weak match"
    } else if score >= 0.2 {
        "Low compatibility - Poor match"
    } else {
        "Very low compatibility - Minimal match"
    }
}

/// Vectorize the shared topic set, returning `None` for every fallback
/// trigger: topics absent, nothing left after blank-filtering, or a vector
/// with no non-zero component.
fn shared_topic_vector(topics: Option<&[String]>) -> Option<Vec<f64>> {
    let topics = topics?;

    let trimmed: Vec<String> = topics
        .iter()
        .map(|topic| topic.trim().to_string())
        .filter(|topic| !topic.is_empty())
        .collect();

    if trimmed.is_empty() {
        return None;
    }

    let topic_vector = vectorize_topics(&trimmed);
    if topic_vector.is_empty() || is_all_zero(&topic_vector) {
        return None;
    }

    Some(topic_vector)
}

fn is_all_zero(vector: &[f64]) -> bool {
    vector.iter().all(|&value| value == 0.0)
}

fn no_data_result() -> CompatibilityResult {
    CompatibilityResult::new(0.0, "No psychometric data available")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_of(
        a: Option<&[f64]>,
        b: Option<&[f64]>,
        topics: Option<&[String]>,
    ) -> CompatibilityResult {
        compute_compatibility(a, b, false, topics, 0.5, 1.0).expect("valid inputs")
    }

    #[test]
    fn test_same_identity_short_circuits() {
        // Even structurally missing data scores 1.0 for a self-comparison
        let result = compute_compatibility(None, None, true, None, 0.5, 1.0).unwrap();
        assert_eq!(result.score, 1.0);
        assert_eq!(result.interpretation, "Identical users (perfect match)");
    }

    #[test]
    fn test_missing_data_is_an_error() {
        let profile = vec![0.1, 0.2, 0.3];
        let result = compute_compatibility(None, Some(&profile), false, None, 0.5, 1.0);
        assert!(matches!(result, Err(MatchError::MissingData(_))));

        let result = compute_compatibility(Some(&profile), None, false, None, 0.5, 1.0);
        assert!(matches!(result, Err(MatchError::MissingData(_))));
    }

    #[test]
    fn test_empty_profile_scores_zero() {
        let empty: Vec<f64> = vec![];
        let full = vec![0.4, 0.5, 0.6];

        let result = score_of(Some(&empty), Some(&full), None);
        assert_eq!(result.score, 0.0);
        assert!(result.interpretation.contains("No psychometric data"));

        let result = score_of(Some(&full), Some(&empty), None);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_negative_weights_are_rejected() {
        let profile = vec![0.1, 0.2, 0.3];
        let result = compute_compatibility(Some(&profile), Some(&profile), false, None, -0.1, 1.0);
        assert!(matches!(result, Err(MatchError::InvalidWeight(_))));

        let result = compute_compatibility(Some(&profile), Some(&profile), false, None, 0.5, -1.0);
        assert!(matches!(result, Err(MatchError::InvalidWeight(_))));
    }

    #[test]
    fn test_empty_profile_wins_over_negative_weight() {
        // Validation order: the empty-profile early return precedes the
        // weight check
        let empty: Vec<f64> = vec![];
        let full = vec![0.4, 0.5, 0.6];
        let result =
            compute_compatibility(Some(&empty), Some(&full), false, None, -1.0, 1.0).unwrap();
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_score_is_symmetric() {
        let a = vec![0.9, 0.1, 0.5, 0.7];
        let b = vec![0.2, 0.8, 0.6];
        let topics = vec!["rust".to_string(), "music".to_string()];

        let forward = score_of(Some(&a), Some(&b), Some(&topics));
        let backward = score_of(Some(&b), Some(&a), Some(&topics));
        assert!((forward.score - backward.score).abs() < 1e-12);
    }

    #[test]
    fn test_score_stays_in_unit_range() {
        let cases: Vec<(Vec<f64>, Vec<f64>)> = vec![
            (vec![1.0, 0.0], vec![0.0, 1.0]),
            (vec![5.0, -5.0, 2.5], vec![-1.0, 1.0]),
            (vec![0.5], vec![0.5]),
            (vec![1.0; 12], vec![0.0, 100.0, 50.0]),
        ];

        for (a, b) in cases {
            let result = score_of(Some(&a), Some(&b), None);
            assert!(
                (0.0..=1.0).contains(&result.score),
                "score {} out of range for {:?} vs {:?}",
                result.score,
                a,
                b
            );
        }
    }

    #[test]
    fn test_identical_profiles_score_high() {
        let profile = vec![0.1, 0.9, 0.4, 0.6, 0.3];
        let result = score_of(Some(&profile), Some(&profile), None);
        assert!(result.score > 0.99);
        assert!(result.interpretation.starts_with("Exceptionally"));
    }

    #[test]
    fn test_blank_topics_fall_back_to_psychometrics() {
        let a = vec![0.1, 0.9, 0.4, 0.6, 0.3];
        let b = vec![0.3, 0.7, 0.5, 0.5, 0.2];

        let blank_topics = vec!["  ".to_string(), "".to_string()];
        let with_blanks = score_of(Some(&a), Some(&b), Some(&blank_topics));
        let without = score_of(Some(&a), Some(&b), None);
        assert!((with_blanks.score - without.score).abs() < 1e-12);
    }

    #[test]
    fn test_stopword_topics_fall_back_to_psychometrics() {
        let a = vec![0.1, 0.9, 0.4, 0.6, 0.3];
        let b = vec![0.3, 0.7, 0.5, 0.5, 0.2];

        // Stop words vectorize to nothing, which must trigger the same
        // psychometric-only branch as supplying no topics at all
        let stopword_topics = vec!["the".to_string(), "and".to_string()];
        let degenerate = score_of(Some(&a), Some(&b), Some(&stopword_topics));
        let without = score_of(Some(&a), Some(&b), None);
        assert!((degenerate.score - without.score).abs() < 1e-12);
    }

    #[test]
    fn test_shared_topics_raise_similarity() {
        // The shared topic segment is identical on both sides, so fusing it
        // in can only pull the cosine up for differing profiles
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let b = vec![5.0, 4.0, 3.0, 2.0, 1.0];
        let topics = vec!["mars".to_string(), "launch".to_string(), "orbit".to_string()];

        let with_topics = score_of(Some(&a), Some(&b), Some(&topics));
        let without = score_of(Some(&a), Some(&b), None);
        assert!(with_topics.score >= without.score);
    }

    #[test]
    fn test_interpretation_bands() {
        assert!(interpret_score(0.95).starts_with("Exceptionally compatible"));
        assert!(interpret_score(0.85).starts_with("Highly compatible"));
        assert!(interpret_score(0.75).starts_with("Very compatible"));
        assert!(interpret_score(0.65).starts_with("Moderately compatible"));
        assert!(interpret_score(0.45).starts_with("Somewhat compatible"));
        assert!(interpret_score(0.25).starts_with("Low compatibility"));
        assert!(interpret_score(0.05).starts_with("Very low compatibility"));
    }

    #[test]
    fn test_interpretation_boundaries_are_inclusive() {
        // Exact boundary values round to the higher band
        assert!(interpret_score(0.9).starts_with("Exceptionally compatible"));
        assert!(interpret_score(0.8).starts_with("Highly compatible"));
        assert!(interpret_score(0.7).starts_with("Very compatible"));
        assert!(interpret_score(0.6).starts_with("Moderately compatible"));
        assert!(interpret_score(0.4).starts_with("Somewhat compatible"));
        assert!(interpret_score(0.2).starts_with("Low compatibility"));
    }

    #[test]
    fn test_short_profiles_are_comparable() {
        // A 1-element against a 3-element profile still resamples into the
        // 5-dimensional floor
        let a = vec![0.7];
        let b = vec![0.2, 0.5, 0.9];
        let result = score_of(Some(&a), Some(&b), None);
        assert!((0.0..=1.0).contains(&result.score));
    }
}
