//! Assessment orchestration. This is the only component with side effects:
//! it drives the external analyzers, then hands the pure stages their
//! inputs in a fixed order and assembles the immutable assessment record.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::analyzer::{
    AssessmentSink, ExplanationGenerator, FieldNote, NoteAnalyzer, PhotoRecord, VisionAnalyzer,
};
use super::baseline::RiskModel;
use super::config::AssessmentConfig;
use super::domain::{
    round2, Assessment, BorrowerFeatures, BorrowerIntake, IntakeError, NoteAnalysis,
    PhotoAnalysis,
};
use super::fusion::fuse;
use super::income::validate_income;
use super::insight::{aggregate_notes, aggregate_photos, NarrativeInsights, VisionInsights};
use super::narrative::{
    explanation_prompt, extract_factors, fallback_explanation, ExplanationContext,
};
use super::recommend::recommend_loan;

const ENGINE_VERSION: &str = "1.0.0";

/// Stages of one assessment run, in execution order. Only the two analysis
/// stages are skippable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssessmentStage {
    CollectFeatures,
    Baseline,
    Photos,
    Notes,
    Fuse,
    ValidateIncome,
    Recommend,
    Explain,
    Done,
}

impl AssessmentStage {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentStage::CollectFeatures => "collect_features",
            AssessmentStage::Baseline => "baseline",
            AssessmentStage::Photos => "photos",
            AssessmentStage::Notes => "notes",
            AssessmentStage::Fuse => "fuse",
            AssessmentStage::ValidateIncome => "validate_income",
            AssessmentStage::Recommend => "recommend",
            AssessmentStage::Explain => "explain",
            AssessmentStage::Done => "done",
        }
    }
}

/// Everything the orchestrator needs for one borrower.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub intake: BorrowerIntake,
    pub photos: Vec<PhotoRecord>,
    pub notes: Vec<FieldNote>,
    #[serde(default)]
    pub options: AssessmentOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentOptions {
    pub include_photos: bool,
    pub include_notes: bool,
}

impl Default for AssessmentOptions {
    fn default() -> Self {
        Self {
            include_photos: true,
            include_notes: true,
        }
    }
}

/// Error raised for one borrower. Analyzer failures never appear here;
/// only faults that make the assessment unattributable are fatal.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
}

/// Per-borrower failure captured during a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub borrower_id: String,
    pub error: String,
}

/// Outcome of a batch run; one borrower's failure never aborts the rest.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub total_requested: usize,
    pub successful: Vec<Assessment>,
    pub failed: Vec<BatchFailure>,
}

/// Service composing the baseline model, the analyzer seams, and the pure
/// scoring stages.
pub struct BorrowerAssessmentService<V, N, E> {
    vision: Arc<V>,
    notes: Arc<N>,
    explainer: Arc<E>,
    sink: Option<Box<dyn AssessmentSink>>,
    model: RiskModel,
    config: AssessmentConfig,
}

impl<V, N, E> BorrowerAssessmentService<V, N, E>
where
    V: VisionAnalyzer + 'static,
    N: NoteAnalyzer + 'static,
    E: ExplanationGenerator + 'static,
{
    pub fn new(
        vision: Arc<V>,
        notes: Arc<N>,
        explainer: Arc<E>,
        model: RiskModel,
        config: AssessmentConfig,
    ) -> Self {
        Self {
            vision,
            notes,
            explainer,
            sink: None,
            model,
            config,
        }
    }

    /// Attach a best-effort persistence sink.
    pub fn with_sink(mut self, sink: Box<dyn AssessmentSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Assess one borrower. Each run operates on its own input snapshot and
    /// produces an independent, immutable record.
    pub fn assess(&self, request: &AssessmentRequest) -> Result<Assessment, AssessmentError> {
        let features = request.intake.clone().resolve(&self.config.defaults)?;
        tracing::info!(
            borrower_id = %features.borrower_id.0,
            stage = AssessmentStage::CollectFeatures.label(),
            "starting assessment"
        );

        let baseline = self.model.predict(&features);
        tracing::info!(
            stage = AssessmentStage::Baseline.label(),
            score = baseline.baseline_score,
            model_version = %baseline.model_version,
            "baseline prediction ready"
        );

        let vision_insights = if request.options.include_photos && !request.photos.is_empty() {
            Some(self.analyze_photos(&request.photos, &features))
        } else {
            None
        };
        let narrative_insights = if request.options.include_notes && !request.notes.is_empty() {
            Some(self.analyze_notes(&request.notes, &features))
        } else {
            None
        };

        let vision_adjustment = vision_insights
            .as_ref()
            .map(|insights| insights.score_adjustment)
            .unwrap_or(0.0);
        let vision_confidence = vision_insights
            .as_ref()
            .map(|insights| insights.confidence)
            .unwrap_or(0.0);
        let nlp_adjustment = narrative_insights
            .as_ref()
            .map(|insights| insights.score_adjustment)
            .unwrap_or(0.0);
        let nlp_confidence = narrative_insights
            .as_ref()
            .map(|insights| insights.confidence)
            .unwrap_or(0.0);

        let fused = fuse(
            baseline.baseline_score,
            vision_adjustment,
            nlp_adjustment,
            &self.config.weights,
        );
        tracing::info!(
            stage = AssessmentStage::Fuse.label(),
            final_score = fused.final_score,
            risk = fused.risk_category.label(),
            "scores fused"
        );

        let note_analyses: &[NoteAnalysis] = narrative_insights
            .as_ref()
            .map(|insights| insights.analyses.as_slice())
            .unwrap_or(&[]);
        let photo_analyses: &[PhotoAnalysis] = vision_insights
            .as_ref()
            .map(|insights| insights.analyses.as_slice())
            .unwrap_or(&[]);

        let income_validation = validate_income(
            features.claimed_monthly_income,
            note_analyses,
            photo_analyses,
            &features.business_type,
            &self.config.benchmarks,
            &self.config.estimate_weights,
        );
        tracing::debug!(
            stage = AssessmentStage::ValidateIncome.label(),
            consistency = income_validation.income_consistency_score,
            "income reconciled"
        );

        let loan_recommendation = recommend_loan(fused.risk_category, &income_validation);
        tracing::debug!(
            stage = AssessmentStage::Recommend.label(),
            amount = loan_recommendation.recommended_loan_amount,
            term_weeks = loan_recommendation.recommended_term_weeks,
            "loan recommendation ready"
        );

        let explanation_context = ExplanationContext {
            features: &features,
            baseline_score: baseline.baseline_score,
            vision_adjustment: vision_insights.as_ref().map(|i| i.score_adjustment),
            nlp_adjustment: narrative_insights.as_ref().map(|i| i.score_adjustment),
            final_score: round2(fused.final_score),
            risk_category: fused.risk_category,
        };
        let risk_explanation = match self
            .explainer
            .generate(&explanation_prompt(&explanation_context))
        {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    stage = AssessmentStage::Explain.label(),
                    error = %err,
                    "explanation generator failed, using template"
                );
                fallback_explanation(&features, fused.final_score, fused.risk_category)
            }
        };

        let (risk_factors, positive_factors) = extract_factors(
            &features,
            vision_insights.as_ref().map(|i| &i.summary),
            narrative_insights.as_ref().map(|i| &i.summary),
        );

        let assessment = Assessment {
            borrower_id: features.borrower_id.clone(),
            assessed_at: Utc::now(),
            baseline_score: baseline.baseline_score,
            baseline_model_version: baseline.model_version,
            vision_score_adjustment: vision_adjustment,
            vision_confidence,
            vision_insights,
            nlp_score_adjustment: nlp_adjustment,
            nlp_confidence,
            nlp_insights: narrative_insights,
            final_score: round2(fused.final_score),
            risk_category: fused.risk_category,
            income_validation,
            loan_recommendation,
            risk_explanation,
            risk_factors,
            positive_factors,
            engine_version: ENGINE_VERSION.to_string(),
        };

        if let Some(sink) = &self.sink {
            if let Err(err) = sink.record(&assessment) {
                tracing::warn!(
                    borrower_id = %assessment.borrower_id.0,
                    error = %err,
                    "assessment sink failed, returning assessment anyway"
                );
            }
        }

        tracing::info!(
            borrower_id = %assessment.borrower_id.0,
            stage = AssessmentStage::Done.label(),
            final_score = assessment.final_score,
            risk = assessment.risk_category.label(),
            "assessment complete"
        );

        Ok(assessment)
    }

    /// Assess many borrowers independently, collecting per-borrower errors.
    pub fn assess_batch(&self, requests: &[AssessmentRequest]) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            total_requested: requests.len(),
            ..BatchOutcome::default()
        };

        for request in requests {
            match self.assess(request) {
                Ok(assessment) => outcome.successful.push(assessment),
                Err(err) => {
                    tracing::warn!(
                        borrower_id = %request.intake.borrower_id,
                        error = %err,
                        "borrower assessment failed, continuing batch"
                    );
                    outcome.failed.push(BatchFailure {
                        borrower_id: request.intake.borrower_id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        outcome
    }

    /// Run every photo through the vision seam; a failed item becomes a
    /// fallback record, never a dropped photo.
    fn analyze_photos(
        &self,
        photos: &[PhotoRecord],
        features: &BorrowerFeatures,
    ) -> VisionInsights {
        let analyses: Vec<PhotoAnalysis> = photos
            .iter()
            .map(|photo| match self.vision.analyze_photo(photo, features) {
                Ok(analysis) => analysis,
                Err(err) => {
                    tracing::warn!(
                        stage = AssessmentStage::Photos.label(),
                        reference = %photo.reference,
                        error = %err,
                        "photo analysis failed, substituting fallback"
                    );
                    if photo.is_house_photo() {
                        PhotoAnalysis::fallback_housing()
                    } else {
                        PhotoAnalysis::fallback_business()
                    }
                }
            })
            .collect();

        aggregate_photos(&analyses)
    }

    fn analyze_notes(&self, notes: &[FieldNote], features: &BorrowerFeatures) -> NarrativeInsights {
        let analyses: Vec<NoteAnalysis> = notes
            .iter()
            .map(
                |note| match self.notes.analyze_note(&note.note_text, features) {
                    Ok(analysis) => analysis,
                    Err(err) => {
                        tracing::warn!(
                            stage = AssessmentStage::Notes.label(),
                            error = %err,
                            "note analysis failed, substituting fallback"
                        );
                        NoteAnalysis::fallback(features.claimed_monthly_income)
                    }
                },
            )
            .collect();

        aggregate_notes(&analyses)
    }
}
