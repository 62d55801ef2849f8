use serde::{Deserialize, Serialize};

use super::config::ScoreWeights;
use super::domain::RiskCategory;

/// Final score plus its tier, derived through the shared risk ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusedScore {
    pub final_score: f64,
    pub risk_category: RiskCategory,
}

/// Combine the baseline with the two auxiliary adjustments. The weights
/// apply to the adjustments only; with both adjustments zero the result is
/// the clamped baseline.
pub fn fuse(
    baseline: f64,
    vision_adjustment: f64,
    nlp_adjustment: f64,
    weights: &ScoreWeights,
) -> FusedScore {
    let final_score = (baseline
        + vision_adjustment * weights.vision_adjustment
        + nlp_adjustment * weights.nlp_adjustment)
        .clamp(0.0, 100.0);

    FusedScore {
        final_score,
        risk_category: RiskCategory::from_score(final_score),
    }
}
