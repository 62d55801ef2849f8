//! Deterministic weighted-rule scoring used whenever no fitted classifier
//! is available. Contributions are additive and individually bounded so a
//! single bad signal can never crater the score on its own.

use crate::workflows::underwriting::domain::BorrowerFeatures;

const NEUTRAL_START: f64 = 50.0;

/// Score a borrower from the rule table alone. Pure: identical features
/// always produce an identical score, clamped into [0,100].
pub(crate) fn rule_based_score(features: &BorrowerFeatures) -> f64 {
    let mut score = NEUTRAL_START;

    // Repayment history, up to 40 points.
    let repayment = &features.repayment_history;
    score += repayment.on_time_rate * 30.0;
    score += (10.0 - repayment.avg_days_overdue).max(0.0);

    // Financial behavior, up to 25 points.
    if features.has_bank_account {
        score += 8.0;
    }
    if features.keeps_financial_records {
        score += 10.0;
    }
    score += (features.financial_literacy_score / 100.0) * 7.0;

    // Business stability, up to 20 points.
    score += (features.years_in_business * 2.0).min(15.0);
    if features.loan_history.num_loans > 0 {
        score += 5.0;
    }

    // Demographics, up to 15 points. Adults outside the prime band still
    // earn the base contribution; the additive rules floor, they do not
    // cliff.
    score += age_points(features.age);
    if features.num_dependents <= 3 {
        score += 7.0;
    } else {
        score += 3.0;
    }

    score.clamp(0.0, 100.0)
}

fn age_points(age: u8) -> f64 {
    if (25..=50).contains(&age) {
        8.0
    } else if age >= 18 {
        5.0
    } else {
        0.0
    }
}
