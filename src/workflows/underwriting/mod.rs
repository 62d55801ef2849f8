//! Borrower underwriting: baseline scoring, photo/note insight reduction,
//! score fusion, income validation, loan recommendation, and the
//! orchestration service that sequences them.

pub mod analyzer;
pub mod baseline;
pub(crate) mod config;
pub mod domain;
pub mod fusion;
pub mod gemini;
pub mod income;
pub mod insight;
pub mod narrative;
pub mod recommend;
pub mod service;
pub mod stats;

#[cfg(test)]
mod tests;

pub use analyzer::{
    AnalyzerError, AssessmentSink, DiscardSink, ExplanationGenerator, FieldNote, NoteAnalyzer,
    OfflineNotes, OfflineVision, PhotoRecord, SinkError, TemplatedExplanations, VisionAnalyzer,
};
pub use baseline::{BaselinePrediction, ModelArtifact, ModelArtifactError, RiskModel};
pub use config::{
    AssessmentConfig, BenchmarkLoadError, BusinessBenchmarks, EstimateWeights, FeatureDefaults,
    LoanTier, ScoreWeights,
};
pub use domain::{
    Assessment, BorrowerFeatures, BorrowerId, BorrowerIntake, Factor, FactorImpact, IntakeError,
    IncomeValidation, LoanHistory, LoanRecommendation, NoteAnalysis, PhotoAnalysis,
    RepaymentHistory, RiskCategory,
};
pub use fusion::{fuse, FusedScore};
pub use gemini::GeminiClient;
pub use income::validate_income;
pub use insight::{
    aggregate_notes, aggregate_photos, NarrativeInsights, NoteSummary, PhotoSummary,
    VisionInsights,
};
pub use recommend::recommend_loan;
pub use service::{
    AssessmentError, AssessmentOptions, AssessmentRequest, AssessmentStage, BatchFailure,
    BatchOutcome, BorrowerAssessmentService,
};
pub use stats::{risk_distribution, CategoryShare, RiskDistribution};
