//! Capability seams for the external AI collaborators. Each concern is one
//! trait with two implementations: a real remote client and a deterministic
//! offline substitute, selected when the service is constructed. The
//! orchestrator additionally degrades per item when a real call errors.

use serde::{Deserialize, Serialize};

use super::domain::{Assessment, BorrowerFeatures, NoteAnalysis, PhotoAnalysis};

/// One photo awaiting analysis: an opaque storage reference plus the
/// caller-supplied photo type used for routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub reference: String,
    pub photo_type: String,
}

impl PhotoRecord {
    /// Photos typed as house shots take the housing-condition path; every
    /// other type is treated as a business photo.
    pub fn is_house_photo(&self) -> bool {
        self.photo_type.contains("house")
    }
}

/// One field-agent narrative awaiting analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNote {
    pub note_text: String,
}

/// Failure surfaced by an external analyzer call. The core never lets one
/// of these cross the pipeline boundary; it substitutes a fallback record.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("analyzer transport failure: {0}")]
    Transport(String),
    #[error("analyzer returned an unusable payload: {0}")]
    Contract(String),
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),
}

/// Structured photo analysis supplier.
pub trait VisionAnalyzer: Send + Sync {
    fn analyze_photo(
        &self,
        photo: &PhotoRecord,
        features: &BorrowerFeatures,
    ) -> Result<PhotoAnalysis, AnalyzerError>;
}

/// Structured field-note analysis supplier.
pub trait NoteAnalyzer: Send + Sync {
    fn analyze_note(
        &self,
        note_text: &str,
        features: &BorrowerFeatures,
    ) -> Result<NoteAnalysis, AnalyzerError>;
}

/// Narrative explanation supplier.
pub trait ExplanationGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, AnalyzerError>;
}

/// Best-effort destination for finished assessments. A sink failure is
/// logged and the assessment is still returned to the caller.
pub trait AssessmentSink: Send + Sync {
    fn record(&self, assessment: &Assessment) -> Result<(), SinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("assessment sink unavailable: {0}")]
    Unavailable(String),
}

/// Offline vision analyzer emitting the deterministic fallback records.
/// Useful when no analyzer credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineVision;

impl VisionAnalyzer for OfflineVision {
    fn analyze_photo(
        &self,
        photo: &PhotoRecord,
        _features: &BorrowerFeatures,
    ) -> Result<PhotoAnalysis, AnalyzerError> {
        if photo.is_house_photo() {
            Ok(PhotoAnalysis::fallback_housing())
        } else {
            Ok(PhotoAnalysis::fallback_business())
        }
    }
}

/// Offline note analyzer emitting the deterministic fallback record.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineNotes;

impl NoteAnalyzer for OfflineNotes {
    fn analyze_note(
        &self,
        _note_text: &str,
        features: &BorrowerFeatures,
    ) -> Result<NoteAnalysis, AnalyzerError> {
        Ok(NoteAnalysis::fallback(features.claimed_monthly_income))
    }
}

/// Offline explanation generator; always defers to the templated
/// explanations by reporting itself unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplatedExplanations;

impl ExplanationGenerator for TemplatedExplanations {
    fn generate(&self, _prompt: &str) -> Result<String, AnalyzerError> {
        Err(AnalyzerError::Unavailable(
            "no explanation generator configured".to_string(),
        ))
    }
}

/// Sink that drops assessments, for callers that persist elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl AssessmentSink for DiscardSink {
    fn record(&self, _assessment: &Assessment) -> Result<(), SinkError> {
        Ok(())
    }
}
