//! Income consistency checking: reconcile the claimed monthly income
//! against estimates drawn from the note narratives, the photographed
//! business scale, and per-trade benchmarks.

use super::config::{BusinessBenchmarks, EstimateWeights};
use super::domain::{round2, BusinessScale, IncomeValidation, NoteAnalysis, PhotoAnalysis};

const CONSERVATIVE_HAIRCUT: f64 = 0.85;

/// Mean of the positive extracted-income estimates across note analyses,
/// zero when no note carries a usable figure.
pub(crate) fn nlp_income_estimate(analyses: &[NoteAnalysis]) -> f64 {
    let positives: Vec<f64> = analyses
        .iter()
        .map(|a| a.extracted_income_estimate)
        .filter(|estimate| *estimate > 0.0)
        .collect();

    if positives.is_empty() {
        return 0.0;
    }
    positives.iter().sum::<f64>() / positives.len() as f64
}

/// Income implied by the photographed business footprint. Any large-scale
/// observation outranks medium; the default reading is conservative.
pub(crate) fn vision_income_estimate(claimed_income: f64, analyses: &[PhotoAnalysis]) -> f64 {
    let multiplier = if analyses
        .iter()
        .any(|a| a.business_scale == Some(BusinessScale::Large))
    {
        1.10
    } else if analyses
        .iter()
        .any(|a| a.business_scale == Some(BusinessScale::Medium))
    {
        0.95
    } else {
        CONSERVATIVE_HAIRCUT
    };

    claimed_income * multiplier
}

/// Weighted mean over whichever estimates are present, weights
/// renormalized. With nothing to blend, fall back to a discounted claim.
pub(crate) fn fuse_income_estimates(
    claimed_income: f64,
    nlp_estimate: f64,
    vision_estimate: f64,
    benchmark_estimate: f64,
    weights: &EstimateWeights,
) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for (estimate, weight) in [
        (nlp_estimate, weights.nlp),
        (vision_estimate, weights.vision),
        (benchmark_estimate, weights.benchmark),
    ] {
        if estimate > 0.0 {
            weighted_sum += estimate * weight;
            weight_total += weight;
        }
    }

    if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        claimed_income * CONSERVATIVE_HAIRCUT
    }
}

/// Reconcile claimed income against the blended AI estimate.
pub fn validate_income(
    claimed_income: f64,
    note_analyses: &[NoteAnalysis],
    photo_analyses: &[PhotoAnalysis],
    business_type: &str,
    benchmarks: &BusinessBenchmarks,
    weights: &EstimateWeights,
) -> IncomeValidation {
    let nlp_estimate = nlp_income_estimate(note_analyses);
    let vision_estimate = vision_income_estimate(claimed_income, photo_analyses);
    let benchmark_estimate = benchmarks.lookup(business_type);

    let ai_estimate = fuse_income_estimates(
        claimed_income,
        nlp_estimate,
        vision_estimate,
        benchmark_estimate,
        weights,
    );

    let variance = if ai_estimate > 0.0 {
        (claimed_income - ai_estimate) / ai_estimate * 100.0
    } else {
        0.0
    };
    let consistency = (100.0 - variance.abs()).max(0.0);

    IncomeValidation {
        claimed_income: round2(claimed_income),
        ai_estimated_income: round2(ai_estimate),
        income_consistency_score: round2(consistency),
        variance_percentage: round2(variance),
        assessment: assessment_text(variance).to_string(),
    }
}

fn assessment_text(variance: f64) -> &'static str {
    if variance > 30.0 {
        "Claimed income significantly higher than AI estimate - verify carefully"
    } else if variance > 15.0 {
        "Claimed income moderately higher than AI estimate"
    } else if variance < -15.0 {
        "Claimed income lower than AI estimate - borrower may be conservative"
    } else {
        "Income claim appears consistent with AI estimate"
    }
}
