//! Human-readable reporting: the prompt handed to the explanation
//! generator, the deterministic fallback explanation used when that call
//! fails, and extraction of the risk/positive factor lists.

use std::fmt::Write as _;

use super::domain::{BorrowerFeatures, Factor, FactorImpact, RiskCategory};
use super::insight::{NoteSummary, PhotoSummary};

/// Inputs the explanation generator is asked to narrate.
#[derive(Debug, Clone, Copy)]
pub struct ExplanationContext<'a> {
    pub features: &'a BorrowerFeatures,
    pub baseline_score: f64,
    pub vision_adjustment: Option<f64>,
    pub nlp_adjustment: Option<f64>,
    pub final_score: f64,
    pub risk_category: RiskCategory,
}

/// Assemble the narrative prompt for the external generator.
pub fn explanation_prompt(context: &ExplanationContext<'_>) -> String {
    let features = context.features;
    let mut prompt = String::new();

    writeln!(
        prompt,
        "You are a credit analyst explaining assessment results to field agents \
at a microfinance institution."
    )
    .expect("write prompt header");
    writeln!(prompt, "\nBorrower profile:").expect("write profile header");
    writeln!(prompt, "- Name: {}", features.full_name).expect("write name");
    writeln!(prompt, "- Business: {}", features.business_type).expect("write business");
    writeln!(
        prompt,
        "- Claimed income: Rp {} per month",
        super::recommend::format_rupiah(features.claimed_monthly_income)
    )
    .expect("write income");
    writeln!(
        prompt,
        "- Years in business: {}",
        features.years_in_business
    )
    .expect("write tenure");

    writeln!(prompt, "\nAssessment results:").expect("write results header");
    writeln!(prompt, "- Baseline score: {}/100", context.baseline_score).expect("write baseline");
    match context.vision_adjustment {
        Some(adjustment) => writeln!(prompt, "- Vision adjustment: {adjustment:+.2}"),
        None => writeln!(prompt, "- Vision adjustment: N/A"),
    }
    .expect("write vision");
    match context.nlp_adjustment {
        Some(adjustment) => writeln!(prompt, "- Narrative adjustment: {adjustment:+.2}"),
        None => writeln!(prompt, "- Narrative adjustment: N/A"),
    }
    .expect("write narrative");
    writeln!(prompt, "- Final score: {}/100", context.final_score).expect("write final");
    writeln!(
        prompt,
        "- Risk category: {}",
        context.risk_category.label()
    )
    .expect("write category");

    writeln!(
        prompt,
        "\nWrite a clear two to three paragraph explanation that summarizes the \
borrower's creditworthiness, highlights key positive factors, points out risk \
factors to monitor, and closes with a balanced recommendation. Keep it \
professional but accessible to field agents."
    )
    .expect("write instructions");

    prompt
}

/// Deterministic explanation selected by risk category, used whenever the
/// external generator fails.
pub fn fallback_explanation(
    features: &BorrowerFeatures,
    final_score: f64,
    risk_category: RiskCategory,
) -> String {
    let name = &features.full_name;
    let business = &features.business_type;

    match risk_category {
        RiskCategory::Low => format!(
            "{name} presents a strong credit profile with a score of {final_score:.1}/100. \
Repayment history is stable, the {business} business is well established, and the \
borrower demonstrates responsible financial behavior. Recommendation: approve with \
a loan amount matched to capacity."
        ),
        RiskCategory::Medium => format!(
            "{name} carries a moderate risk profile with a score of {final_score:.1}/100. \
The {business} business is reasonably stable, but areas such as record keeping or \
repayment history deserve attention. Recommendation: approve with close monitoring \
and a conservative loan."
        ),
        RiskCategory::High | RiskCategory::VeryHigh => format!(
            "{name} shows elevated risk with a score of {final_score:.1}/100. Several \
indicators around the {business} business require further evaluation. \
Recommendation: proceed carefully with a minimal loan and intensive mentoring."
        ),
    }
}

/// Risk and positive factor lists drawn from the borrower record and the
/// aggregated analysis summaries.
pub fn extract_factors(
    features: &BorrowerFeatures,
    photo_summary: Option<&PhotoSummary>,
    note_summary: Option<&NoteSummary>,
) -> (Vec<Factor>, Vec<Factor>) {
    let mut risk_factors = Vec::new();
    let mut positive_factors = Vec::new();

    if features.has_bank_account {
        positive_factors.push(positive("Has bank account", 0.08));
    } else {
        risk_factors.push(negative("No bank account", 0.10));
    }

    if !features.keeps_financial_records {
        risk_factors.push(negative("No financial records", 0.12));
    }

    let years = features.years_in_business;
    if years >= 5.0 {
        positive_factors.push(positive(
            &format!("{years} years business continuity"),
            0.15,
        ));
    } else if years < 1.0 {
        risk_factors.push(negative("New business (< 1 year)", 0.10));
    }

    if let Some(summary) = note_summary {
        if summary.high_cooperation {
            positive_factors.push(positive("Cooperative and transparent", 0.12));
        }
        for flag in summary.aggregated_risk_flags.iter().take(3) {
            risk_factors.push(negative(flag, 0.08));
        }
    }

    if let Some(summary) = photo_summary {
        if summary.good_asset_quality {
            positive_factors.push(positive("Good business asset quality", 0.10));
        }
        if summary.high_inventory {
            positive_factors.push(positive("High inventory density", 0.08));
        }
    }

    (risk_factors, positive_factors)
}

fn positive(factor: &str, weight: f64) -> Factor {
    Factor {
        factor: factor.to_string(),
        weight,
        impact: FactorImpact::Positive,
    }
}

fn negative(factor: &str, weight: f64) -> Factor {
    Factor {
        factor: factor.to_string(),
        weight,
        impact: FactorImpact::Negative,
    }
}
