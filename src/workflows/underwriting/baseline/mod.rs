//! Baseline credit scoring: a fitted classifier when one is available, a
//! deterministic rule table otherwise. Classifier failures never reach the
//! caller; the rule path is the load-bearing algorithm.

mod artifact;
pub(crate) mod rules;

pub use artifact::{ModelArtifact, ModelArtifactError};

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::config::business_type_code;
use super::domain::{round2, BorrowerFeatures, RiskCategory};

const RULE_MODEL_VERSION: &str = "1.0.0";
const RULE_CONFIDENCE: f64 = 0.70;

/// Baseline prediction emitted before any photo or note adjustment. The
/// `model_version` suffix `-rule-based` is how callers distinguish modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselinePrediction {
    pub baseline_score: f64,
    pub risk_category: RiskCategory,
    pub confidence: f64,
    pub model_version: String,
}

/// Converts a borrower feature record into a baseline score and risk label.
#[derive(Debug)]
pub struct RiskModel {
    artifact: Option<ModelArtifact>,
}

impl RiskModel {
    /// Rule-based model with no classifier artifact.
    pub fn rule_based() -> Self {
        Self { artifact: None }
    }

    pub fn with_artifact(artifact: ModelArtifact) -> Self {
        Self {
            artifact: Some(artifact),
        }
    }

    /// Load the classifier artifact if a path is configured. An absent or
    /// corrupt artifact pins the model to rule-based scoring for the rest
    /// of the process lifetime; that is logged once, here.
    pub fn load(model_path: Option<&Path>) -> Self {
        let Some(path) = model_path else {
            return Self::rule_based();
        };

        match ModelArtifact::from_path(path) {
            Ok(artifact) => {
                tracing::info!(
                    path = %path.display(),
                    version = artifact.model_version(),
                    "classifier artifact loaded"
                );
                Self::with_artifact(artifact)
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "classifier artifact unavailable, scoring falls back to rules"
                );
                Self::rule_based()
            }
        }
    }

    /// Predict the baseline score. Classifier-path errors are swallowed and
    /// the rule table answers instead; this method never fails.
    pub fn predict(&self, features: &BorrowerFeatures) -> BaselinePrediction {
        if let Some(artifact) = &self.artifact {
            match artifact.predict_probability(&feature_vector(features)) {
                Ok(probability) => {
                    let score = round2(probability * 100.0);
                    return BaselinePrediction {
                        baseline_score: score,
                        risk_category: RiskCategory::from_score(score),
                        confidence: round2(probability.max(1.0 - probability)),
                        model_version: artifact.model_version().to_string(),
                    };
                }
                Err(err) => {
                    tracing::warn!(error = %err, "classifier prediction failed, using rules");
                }
            }
        }

        let score = round2(rules::rule_based_score(features));
        BaselinePrediction {
            baseline_score: score,
            risk_category: RiskCategory::from_score(score),
            confidence: RULE_CONFIDENCE,
            model_version: format!("{RULE_MODEL_VERSION}-rule-based"),
        }
    }
}

/// Feature order is part of the artifact contract; keep it in lockstep
/// with the offline training pipeline.
fn feature_vector(features: &BorrowerFeatures) -> Vec<f64> {
    vec![
        features.age as f64,
        features.years_in_business,
        features.num_dependents as f64,
        features.claimed_monthly_income,
        features.financial_literacy_score,
        if features.has_bank_account { 1.0 } else { 0.0 },
        if features.keeps_financial_records {
            1.0
        } else {
            0.0
        },
        features.loan_history.num_loans as f64,
        features.loan_history.avg_loan_amount,
        features.loan_history.total_borrowed,
        features.repayment_history.on_time_rate,
        features.repayment_history.avg_days_overdue,
        features.repayment_history.default_rate,
        features.repayment_history.total_repayments as f64,
        business_type_code(&features.business_type),
    ]
}
