use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::{FeatureDefaults, RISK_LADDER};

/// Identifier wrapper for assessed borrowers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorrowerId(pub String);

/// Raw per-borrower snapshot collected by the caller. Optional fields are
/// resolved against documented defaults; only a missing identifier is fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorrowerIntake {
    pub borrower_id: String,
    pub full_name: Option<String>,
    pub business_type: Option<String>,
    pub age: Option<u8>,
    pub years_in_business: Option<f64>,
    pub num_dependents: Option<u8>,
    pub claimed_monthly_income: Option<f64>,
    pub financial_literacy_score: Option<f64>,
    pub has_bank_account: Option<bool>,
    pub keeps_financial_records: Option<bool>,
    pub loan_history: Option<LoanHistory>,
    pub repayment_history: Option<RepaymentHistory>,
}

/// Error raised while resolving an intake snapshot into a feature vector.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("borrower identifier is missing or blank")]
    MissingBorrowerId,
}

impl BorrowerIntake {
    /// Resolve the snapshot into a complete feature record, applying the
    /// documented defaults and clamping rates into [0,1].
    pub fn resolve(self, defaults: &FeatureDefaults) -> Result<BorrowerFeatures, IntakeError> {
        if self.borrower_id.trim().is_empty() {
            return Err(IntakeError::MissingBorrowerId);
        }

        let repayment = self
            .repayment_history
            .unwrap_or_else(|| RepaymentHistory {
                on_time_rate: defaults.on_time_rate,
                avg_days_overdue: defaults.avg_days_overdue,
                default_rate: 0.0,
                total_repayments: 0,
            })
            .sanitized();

        Ok(BorrowerFeatures {
            borrower_id: BorrowerId(self.borrower_id),
            full_name: self.full_name.unwrap_or_else(|| "Borrower".to_string()),
            business_type: self.business_type.unwrap_or_else(|| "Unknown".to_string()),
            age: self.age.unwrap_or(defaults.age),
            years_in_business: self
                .years_in_business
                .unwrap_or(defaults.years_in_business)
                .max(0.0),
            num_dependents: self.num_dependents.unwrap_or(defaults.num_dependents),
            claimed_monthly_income: self
                .claimed_monthly_income
                .unwrap_or(defaults.claimed_monthly_income)
                .max(0.0),
            financial_literacy_score: self
                .financial_literacy_score
                .unwrap_or(defaults.financial_literacy_score)
                .clamp(0.0, 100.0),
            has_bank_account: self.has_bank_account.unwrap_or(false),
            keeps_financial_records: self.keeps_financial_records.unwrap_or(false),
            loan_history: self.loan_history.unwrap_or_default().sanitized(),
            repayment_history: repayment,
        })
    }
}

/// Aggregated prior-loan statistics supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanHistory {
    pub num_loans: u32,
    pub avg_loan_amount: f64,
    pub total_borrowed: f64,
}

impl LoanHistory {
    fn sanitized(mut self) -> Self {
        self.avg_loan_amount = self.avg_loan_amount.max(0.0);
        self.total_borrowed = self.total_borrowed.max(0.0);
        self
    }
}

/// Aggregated repayment statistics supplied by the caller. Rates are
/// fractions in [0,1]; overdue days are non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentHistory {
    pub on_time_rate: f64,
    pub avg_days_overdue: f64,
    pub default_rate: f64,
    pub total_repayments: u32,
}

impl RepaymentHistory {
    fn sanitized(mut self) -> Self {
        self.on_time_rate = self.on_time_rate.clamp(0.0, 1.0);
        self.default_rate = self.default_rate.clamp(0.0, 1.0);
        self.avg_days_overdue = self.avg_days_overdue.max(0.0);
        self
    }
}

/// Fully resolved borrower feature record consumed by the scoring pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowerFeatures {
    pub borrower_id: BorrowerId,
    pub full_name: String,
    pub business_type: String,
    pub age: u8,
    pub years_in_business: f64,
    pub num_dependents: u8,
    pub claimed_monthly_income: f64,
    pub financial_literacy_score: f64,
    pub has_bank_account: bool,
    pub keeps_financial_records: bool,
    pub loan_history: LoanHistory,
    pub repayment_history: RepaymentHistory,
}

/// Monotonic bucketing of a 0-100 credit score. Boundary values map to the
/// better tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskCategory {
    /// Single source of truth for category boundaries; both the baseline
    /// model and score fusion categorize through this ladder.
    pub fn from_score(score: f64) -> Self {
        for (threshold, category) in RISK_LADDER {
            if score >= threshold {
                return category;
            }
        }
        RiskCategory::VeryHigh
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Medium => "medium",
            RiskCategory::High => "high",
            RiskCategory::VeryHigh => "very_high",
        }
    }
}

/// Business footprint tiers reported by the vision analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessScale {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryDensity {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingCondition {
    Poor,
    Basic,
    Adequate,
    Good,
}

/// Structured vision-analyzer output for one photo. Produced externally and
/// treated as an opaque, validated input by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoAnalysis {
    #[serde(default)]
    pub business_scale: Option<BusinessScale>,
    #[serde(default)]
    pub inventory_density: Option<InventoryDensity>,
    #[serde(default)]
    pub asset_quality: Option<AssetQuality>,
    #[serde(default)]
    pub housing_condition: Option<HousingCondition>,
    #[serde(default)]
    pub socioeconomic_indicators: BTreeMap<String, String>,
    #[serde(default = "default_confidence")]
    pub confidence_score: f64,
    #[serde(default)]
    pub fallback: bool,
}

impl PhotoAnalysis {
    /// Deterministic substitute for a failed business-photo analysis.
    pub fn fallback_business() -> Self {
        let mut indicators = BTreeMap::new();
        indicators.insert("building_condition".to_string(), "basic".to_string());
        indicators.insert("equipment_modernity".to_string(), "standard".to_string());
        indicators.insert("organization_level".to_string(), "moderate".to_string());
        indicators.insert("cleanliness".to_string(), "adequate".to_string());
        indicators.insert("signage_quality".to_string(), "basic".to_string());

        Self {
            business_scale: Some(BusinessScale::Small),
            inventory_density: Some(InventoryDensity::Moderate),
            asset_quality: Some(AssetQuality::Fair),
            housing_condition: None,
            socioeconomic_indicators: indicators,
            confidence_score: 0.5,
            fallback: true,
        }
    }

    /// Deterministic substitute for a failed house-photo analysis.
    pub fn fallback_housing() -> Self {
        let mut indicators = BTreeMap::new();
        indicators.insert(
            "building_materials".to_string(),
            "mixed brick and wood".to_string(),
        );
        indicators.insert("roof_condition".to_string(), "adequate".to_string());
        indicators.insert("windows_doors_quality".to_string(), "standard".to_string());
        indicators.insert("visible_amenities".to_string(), "basic".to_string());

        Self {
            business_scale: None,
            inventory_density: None,
            asset_quality: None,
            housing_condition: Some(HousingCondition::Basic),
            socioeconomic_indicators: indicators,
            confidence_score: 0.5,
            fallback: true,
        }
    }
}

/// Severity tier attached to an extracted risk flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSeverity {
    Low,
    Medium,
    High,
}

/// One concerning indicator surfaced by the note analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlag {
    pub flag: String,
    pub severity: FlagSeverity,
}

/// Three-step qualitative level used by behavioral observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorLevel {
    Low,
    Medium,
    High,
}

/// Four-step capability grading for knowledge and planning observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityLevel {
    Weak,
    Basic,
    Good,
    Strong,
}

/// Behavioral read of the borrower extracted from one field note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralInsights {
    pub cooperation_level: BehaviorLevel,
    pub transparency: BehaviorLevel,
    pub business_knowledge: CapabilityLevel,
    pub financial_planning: CapabilityLevel,
    pub trustworthiness: BehaviorLevel,
}

impl Default for BehavioralInsights {
    fn default() -> Self {
        Self {
            cooperation_level: BehaviorLevel::Medium,
            transparency: BehaviorLevel::Medium,
            business_knowledge: CapabilityLevel::Basic,
            financial_planning: CapabilityLevel::Basic,
            trustworthiness: BehaviorLevel::Medium,
        }
    }
}

/// Structured note-analyzer output for one field note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteAnalysis {
    #[serde(default)]
    pub extracted_income_estimate: f64,
    #[serde(default = "default_sentiment")]
    pub sentiment_score: f64,
    #[serde(default)]
    pub risk_flags: Vec<RiskFlag>,
    #[serde(default)]
    pub behavioral_insights: BehavioralInsights,
    #[serde(default = "default_confidence")]
    pub confidence_score: f64,
    #[serde(default)]
    pub fallback: bool,
}

impl NoteAnalysis {
    /// Deterministic substitute for a failed note analysis. The income
    /// estimate leans slightly below the claim so a dead analyzer never
    /// inflates the consistency check.
    pub fn fallback(claimed_monthly_income: f64) -> Self {
        Self {
            extracted_income_estimate: claimed_monthly_income * 0.9,
            sentiment_score: 0.6,
            risk_flags: vec![RiskFlag {
                flag: "analyzer_unavailable".to_string(),
                severity: FlagSeverity::Low,
            }],
            behavioral_insights: BehavioralInsights::default(),
            confidence_score: 0.5,
            fallback: true,
        }
    }
}

fn default_confidence() -> f64 {
    0.7
}

fn default_sentiment() -> f64 {
    0.6
}

/// Direction of a contributing factor in the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorImpact {
    Positive,
    Negative,
}

/// One named contributor surfaced alongside the assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub factor: String,
    pub weight: f64,
    pub impact: FactorImpact,
}

/// Reconciliation of claimed income against the blended AI estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeValidation {
    pub claimed_income: f64,
    pub ai_estimated_income: f64,
    pub income_consistency_score: f64,
    pub variance_percentage: f64,
    pub assessment: String,
}

/// Loan sizing derived from the final score, risk tier, and validated income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecommendation {
    pub recommended_loan_amount: f64,
    pub max_safe_loan_amount: f64,
    pub recommended_term_weeks: u32,
    pub weekly_repayment: f64,
    pub repayment_to_income_ratio: f64,
    pub recommendation_confidence: f64,
    pub justification: String,
}

/// The immutable output aggregate assembled once per orchestration run.
/// Persistence is an external collaborator's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub borrower_id: BorrowerId,
    pub assessed_at: DateTime<Utc>,
    pub baseline_score: f64,
    pub baseline_model_version: String,
    pub vision_score_adjustment: f64,
    pub vision_confidence: f64,
    pub vision_insights: Option<super::insight::VisionInsights>,
    pub nlp_score_adjustment: f64,
    pub nlp_confidence: f64,
    pub nlp_insights: Option<super::insight::NarrativeInsights>,
    pub final_score: f64,
    pub risk_category: RiskCategory,
    pub income_validation: IncomeValidation,
    pub loan_recommendation: LoanRecommendation,
    pub risk_explanation: String,
    pub risk_factors: Vec<Factor>,
    pub positive_factors: Vec<Factor>,
    pub engine_version: String,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
