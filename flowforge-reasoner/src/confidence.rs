//! ABOUTME: Confidence-scoring policy for candidate IR (§4.2)
//! ABOUTME: start at 1.0; -0.1 per prior retry; -up to 0.3 for parse diagnostics; 0.0 on malformed JSON

/// Per-diagnostic confidence penalty, capped at 0.3 total (3 diagnostics).
const DIAGNOSTIC_PENALTY_STEP: f32 = 0.1;
const MAX_DIAGNOSTIC_PENALTY: f32 = 0.3;
const RETRY_PENALTY_STEP: f32 = 0.1;

/// Confidence threshold below which the controller escalates (§4.6, Glossary).
pub const ESCALATION_THRESHOLD: f32 = 0.8;

#[must_use]
pub fn score(retry_count: u32, diagnostic_count: usize) -> f32 {
    let retry_penalty = RETRY_PENALTY_STEP * retry_count as f32;
    let diagnostic_penalty = (DIAGNOSTIC_PENALTY_STEP * diagnostic_count as f32).min(MAX_DIAGNOSTIC_PENALTY);
    (1.0 - retry_penalty - diagnostic_penalty).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn perfect_attempt_scores_one() {
        assert!((score(0, 0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn retries_reduce_confidence_linearly() {
        assert!((score(1, 0) - 0.9).abs() < 1e-6);
        assert!((score(2, 0) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn diagnostic_penalty_caps_at_point_three() {
        assert!((score(0, 3) - 0.7).abs() < 1e-6);
        assert!((score(0, 10) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn score_never_goes_negative() {
        assert_eq!(score(20, 20), 0.0);
    }

    #[test]
    fn escalation_threshold_is_point_eight() {
        assert!((ESCALATION_THRESHOLD - 0.8).abs() < f32::EPSILON);
    }

    proptest::proptest! {
        #[test]
        fn score_is_always_within_unit_range(retry_count in 0u32..50, diagnostic_count in 0usize..50) {
            let s = score(retry_count, diagnostic_count);
            prop_assert!((0.0..=1.0).contains(&s));
        }

        #[test]
        fn score_never_increases_with_more_retries(retry_count in 0u32..49, diagnostic_count in 0usize..20) {
            prop_assert!(score(retry_count + 1, diagnostic_count) <= score(retry_count, diagnostic_count));
        }

        #[test]
        fn score_never_increases_with_more_diagnostics(retry_count in 0u32..20, diagnostic_count in 0usize..49) {
            prop_assert!(score(retry_count, diagnostic_count + 1) <= score(retry_count, diagnostic_count));
        }
    }
}
