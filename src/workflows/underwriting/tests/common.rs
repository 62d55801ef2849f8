use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::workflows::underwriting::analyzer::{
    AnalyzerError, AssessmentSink, ExplanationGenerator, FieldNote, NoteAnalyzer, PhotoRecord,
    SinkError, VisionAnalyzer,
};
use crate::workflows::underwriting::baseline::RiskModel;
use crate::workflows::underwriting::config::AssessmentConfig;
use crate::workflows::underwriting::domain::{
    Assessment, AssetQuality, BehavioralInsights, BehaviorLevel, BorrowerFeatures, BorrowerId,
    BorrowerIntake, BusinessScale, CapabilityLevel, FlagSeverity, InventoryDensity, LoanHistory,
    NoteAnalysis, PhotoAnalysis, RepaymentHistory, RiskFlag,
};
use crate::workflows::underwriting::service::{
    AssessmentRequest, BorrowerAssessmentService,
};

pub(super) fn features(
    on_time_rate: f64,
    avg_days_overdue: f64,
    has_bank_account: bool,
    keeps_financial_records: bool,
    financial_literacy_score: f64,
    years_in_business: f64,
    num_loans: u32,
    age: u8,
    num_dependents: u8,
) -> BorrowerFeatures {
    BorrowerFeatures {
        borrower_id: BorrowerId("brw-0001".to_string()),
        full_name: "Ibu Siti".to_string(),
        business_type: "Warung Kelontong".to_string(),
        age,
        years_in_business,
        num_dependents,
        claimed_monthly_income: 3_000_000.0,
        financial_literacy_score,
        has_bank_account,
        keeps_financial_records,
        loan_history: LoanHistory {
            num_loans,
            avg_loan_amount: if num_loans > 0 { 2_000_000.0 } else { 0.0 },
            total_borrowed: num_loans as f64 * 2_000_000.0,
        },
        repayment_history: RepaymentHistory {
            on_time_rate,
            avg_days_overdue,
            default_rate: 0.0,
            total_repayments: num_loans * 20,
        },
    }
}

pub(super) fn strong_features() -> BorrowerFeatures {
    features(1.0, 0.0, true, true, 100.0, 10.0, 1, 35, 2)
}

pub(super) fn weak_features() -> BorrowerFeatures {
    features(0.0, 10.0, false, false, 0.0, 0.0, 0, 70, 5)
}

pub(super) fn photo_analysis(
    scale: BusinessScale,
    density: InventoryDensity,
    quality: AssetQuality,
    confidence: f64,
) -> PhotoAnalysis {
    PhotoAnalysis {
        business_scale: Some(scale),
        inventory_density: Some(density),
        asset_quality: Some(quality),
        housing_condition: None,
        socioeconomic_indicators: BTreeMap::new(),
        confidence_score: confidence,
        fallback: false,
    }
}

pub(super) fn note_analysis(
    sentiment: f64,
    cooperation: BehaviorLevel,
    planning: CapabilityLevel,
    flags: Vec<(&str, FlagSeverity)>,
    confidence: f64,
) -> NoteAnalysis {
    NoteAnalysis {
        extracted_income_estimate: 0.0,
        sentiment_score: sentiment,
        risk_flags: flags
            .into_iter()
            .map(|(flag, severity)| RiskFlag {
                flag: flag.to_string(),
                severity,
            })
            .collect(),
        behavioral_insights: BehavioralInsights {
            cooperation_level: cooperation,
            transparency: BehaviorLevel::Medium,
            business_knowledge: CapabilityLevel::Basic,
            financial_planning: planning,
            trustworthiness: BehaviorLevel::Medium,
        },
        confidence_score: confidence,
        fallback: false,
    }
}

pub(super) fn mid_intake() -> BorrowerIntake {
    BorrowerIntake {
        borrower_id: "brw-0042".to_string(),
        full_name: Some("Pak Budi".to_string()),
        business_type: Some("Toko Pulsa".to_string()),
        age: Some(22),
        years_in_business: Some(1.0),
        num_dependents: Some(4),
        claimed_monthly_income: Some(3_000_000.0),
        financial_literacy_score: Some(20.0),
        has_bank_account: Some(false),
        keeps_financial_records: Some(false),
        loan_history: Some(LoanHistory::default()),
        repayment_history: Some(RepaymentHistory {
            on_time_rate: 0.3,
            avg_days_overdue: 8.0,
            default_rate: 0.0,
            total_repayments: 6,
        }),
    }
}

pub(super) fn request_with(
    intake: BorrowerIntake,
    photos: Vec<PhotoRecord>,
    notes: Vec<FieldNote>,
) -> AssessmentRequest {
    AssessmentRequest {
        intake,
        photos,
        notes,
        options: Default::default(),
    }
}

pub(super) fn business_photo(reference: &str) -> PhotoRecord {
    PhotoRecord {
        reference: reference.to_string(),
        photo_type: "business_exterior".to_string(),
    }
}

pub(super) fn field_note(text: &str) -> FieldNote {
    FieldNote {
        note_text: text.to_string(),
    }
}

/// Vision fake returning one scripted analysis for every photo.
pub(super) struct ScriptedVision(pub(super) PhotoAnalysis);

impl VisionAnalyzer for ScriptedVision {
    fn analyze_photo(
        &self,
        _photo: &PhotoRecord,
        _features: &BorrowerFeatures,
    ) -> Result<PhotoAnalysis, AnalyzerError> {
        Ok(self.0.clone())
    }
}

pub(super) struct FailingVision;

impl VisionAnalyzer for FailingVision {
    fn analyze_photo(
        &self,
        _photo: &PhotoRecord,
        _features: &BorrowerFeatures,
    ) -> Result<PhotoAnalysis, AnalyzerError> {
        Err(AnalyzerError::Transport("connection reset".to_string()))
    }
}

pub(super) struct ScriptedNotes(pub(super) NoteAnalysis);

impl NoteAnalyzer for ScriptedNotes {
    fn analyze_note(
        &self,
        _note_text: &str,
        _features: &BorrowerFeatures,
    ) -> Result<NoteAnalysis, AnalyzerError> {
        Ok(self.0.clone())
    }
}

pub(super) struct FailingNotes;

impl NoteAnalyzer for FailingNotes {
    fn analyze_note(
        &self,
        _note_text: &str,
        _features: &BorrowerFeatures,
    ) -> Result<NoteAnalysis, AnalyzerError> {
        Err(AnalyzerError::Unavailable("quota exhausted".to_string()))
    }
}

pub(super) struct ScriptedExplainer(pub(super) String);

impl ExplanationGenerator for ScriptedExplainer {
    fn generate(&self, _prompt: &str) -> Result<String, AnalyzerError> {
        Ok(self.0.clone())
    }
}

pub(super) struct FailingExplainer;

impl ExplanationGenerator for FailingExplainer {
    fn generate(&self, _prompt: &str) -> Result<String, AnalyzerError> {
        Err(AnalyzerError::Transport("timed out".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingSink {
    pub(super) records: Arc<Mutex<Vec<Assessment>>>,
}

impl AssessmentSink for RecordingSink {
    fn record(&self, assessment: &Assessment) -> Result<(), SinkError> {
        self.records
            .lock()
            .expect("sink mutex poisoned")
            .push(assessment.clone());
        Ok(())
    }
}

pub(super) struct OfflineSink;

impl AssessmentSink for OfflineSink {
    fn record(&self, _assessment: &Assessment) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("storage offline".to_string()))
    }
}

pub(super) fn build_service<V, N, E>(
    vision: V,
    notes: N,
    explainer: E,
) -> BorrowerAssessmentService<V, N, E>
where
    V: VisionAnalyzer + 'static,
    N: NoteAnalyzer + 'static,
    E: ExplanationGenerator + 'static,
{
    BorrowerAssessmentService::new(
        Arc::new(vision),
        Arc::new(notes),
        Arc::new(explainer),
        RiskModel::rule_based(),
        AssessmentConfig::default(),
    )
}
