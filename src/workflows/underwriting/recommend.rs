//! Loan sizing from the assessed risk tier and validated income. The
//! justification sentence is templated and reproducible character-for-
//! character for a given set of inputs.

use super::config::LoanTier;
use super::domain::{round2, IncomeValidation, LoanRecommendation, RiskCategory};

const RECOMMENDED_SHARE_OF_MAX: f64 = 0.8;
const WEEKS_PER_MONTH: f64 = 4.3;

/// Derive a safe loan size and term for the assessed tier.
pub fn recommend_loan(
    risk_category: RiskCategory,
    income_validation: &IncomeValidation,
) -> LoanRecommendation {
    let monthly_income = income_validation.ai_estimated_income;
    let tier = LoanTier::for_category(risk_category);

    let max_loan = monthly_income * tier.income_multiple;
    let recommended = max_loan * RECOMMENDED_SHARE_OF_MAX;
    let weekly_repayment = recommended / tier.term_weeks as f64;
    let monthly_repayment = weekly_repayment * WEEKS_PER_MONTH;
    let repayment_ratio = if monthly_income > 0.0 {
        monthly_repayment / monthly_income * 100.0
    } else {
        0.0
    };

    let confidence = 0.3 + 0.7 * (income_validation.income_consistency_score / 100.0);

    let justification = format!(
        "Based on {} risk profile and estimated monthly income of Rp {}, \
safe repayment capacity is approximately {:.0}% of income (Rp {}/month). \
Recommended loan of Rp {} over {} weeks results in weekly payments of Rp {}, \
which is {:.1}% of monthly income - within safe lending parameters.",
        risk_category.label(),
        format_rupiah(monthly_income),
        tier.safe_repayment_rate * 100.0,
        format_rupiah(monthly_income * tier.safe_repayment_rate),
        format_rupiah(recommended),
        tier.term_weeks,
        format_rupiah(weekly_repayment),
        repayment_ratio,
    );

    LoanRecommendation {
        recommended_loan_amount: round2(recommended),
        max_safe_loan_amount: round2(max_loan),
        recommended_term_weeks: tier.term_weeks,
        weekly_repayment: round2(weekly_repayment),
        repayment_to_income_ratio: round2(repayment_ratio),
        recommendation_confidence: round2(confidence),
        justification,
    }
}

/// Whole-Rupiah rendering with thousands separators, e.g. `3,000,000`.
pub(crate) fn format_rupiah(amount: f64) -> String {
    let rounded = amount.round().max(0.0) as u64;
    let digits = rounded.to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
