//! Confidence scoring.
//!
//! Produces a bounded [0, 1] reliability estimate from retrieval signal
//! strength and the generation completion status. A heuristic, not a
//! calibrated probability.

/// Lower clamp: any generated answer carries at least this confidence.
pub const CONFIDENCE_FLOOR: f64 = 0.30;

/// Upper clamp: no answer is reported above this confidence.
pub const CONFIDENCE_CEILING: f64 = 0.95;

/// Weight applied to the mean raw retrieval score.
/// A perfect mean of 10 on the backend's nominal scale contributes 0.60;
/// higher means saturate at the ceiling via the clamp.
const SCORE_WEIGHT: f64 = 0.06;

/// Bonus when generation finished its answer normally.
const COMPLETION_BONUS_STOP: f64 = 0.30;

/// Bonus when generation was truncated or stopped abnormally.
const COMPLETION_BONUS_OTHER: f64 = 0.10;

/// Fixed band when the context was assembled without any usable document
/// content. Sits below [`CONFIDENCE_FLOOR`] to signal reduced reliability.
pub const FALLBACK_CONFIDENCE: f64 = 0.25;

/// Fixed minimal confidence for the zero-retrieval short-circuit.
pub const NO_RESULTS_CONFIDENCE: f64 = 0.10;

/// Score the confidence of a generated answer.
///
/// `scores` are the raw per-document backend relevance scores in retrieval
/// order (the order is irrelevant here; only the mean is used).
pub fn score_confidence(scores: &[f64], normal_stop: bool, used_content: bool) -> f64 {
    if !used_content {
        return FALLBACK_CONFIDENCE;
    }

    let mean = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    let bonus = if normal_stop {
        COMPLETION_BONUS_STOP
    } else {
        COMPLETION_BONUS_OTHER
    };

    (mean * SCORE_WEIGHT + bonus).clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
}
