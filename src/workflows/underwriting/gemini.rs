//! Gemini-backed implementations of the analyzer seams. The client owns a
//! tokio runtime and blocks on it so the synchronous workflow code never
//! sees async plumbing. Responses are expected to carry a fenced JSON
//! document matching the structured analysis contract.

use serde::Deserialize;
use serde_json::json;
use tokio::runtime::Runtime;

use crate::config::AnalyzerSettings;

use super::analyzer::{
    AnalyzerError, ExplanationGenerator, NoteAnalyzer, PhotoRecord, VisionAnalyzer,
};
use super::domain::{BorrowerFeatures, NoteAnalysis, PhotoAnalysis};
use super::recommend::format_rupiah;

pub struct GeminiClient {
    http: reqwest::Client,
    runtime: Runtime,
    base_url: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(settings: &AnalyzerSettings) -> Result<Self, AnalyzerError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| AnalyzerError::Unavailable("no analyzer API key configured".into()))?;

        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|err| AnalyzerError::Transport(err.to_string()))?;
        let runtime = Runtime::new().map_err(|err| AnalyzerError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            runtime,
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            api_key,
        })
    }

    fn generate_text(&self, prompt: &str) -> Result<String, AnalyzerError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self.runtime.block_on(async {
            self.http
                .post(url.as_str())
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .await
                .map_err(|err| AnalyzerError::Transport(err.to_string()))?
                .error_for_status()
                .map_err(|err| AnalyzerError::Transport(err.to_string()))?
                .json::<GenerateContentResponse>()
                .await
                .map_err(|err| AnalyzerError::Contract(err.to_string()))
        })?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| AnalyzerError::Contract("response carried no candidates".into()))
    }

    fn structured<T: serde::de::DeserializeOwned>(&self, prompt: &str) -> Result<T, AnalyzerError> {
        let text = self.generate_text(prompt)?;
        let payload = extract_fenced_json(&text);
        serde_json::from_str(payload).map_err(|err| AnalyzerError::Contract(err.to_string()))
    }
}

/// Models often wrap their JSON in Markdown fences; unwrap the first fenced
/// block, otherwise hand back the trimmed text.
pub(crate) fn extract_fenced_json(text: &str) -> &str {
    for fence in ["```json", "```"] {
        if let Some(start) = text.find(fence) {
            let body = &text[start + fence.len()..];
            if let Some(end) = body.find("```") {
                return body[..end].trim();
            }
        }
    }
    text.trim()
}

fn borrower_context_lines(features: &BorrowerFeatures) -> String {
    format!(
        "Borrower context:\n- Business type: {}\n- Claimed monthly income: Rp {}\n- Years in business: {}",
        features.business_type,
        format_rupiah(features.claimed_monthly_income),
        features.years_in_business,
    )
}

impl VisionAnalyzer for GeminiClient {
    fn analyze_photo(
        &self,
        photo: &PhotoRecord,
        features: &BorrowerFeatures,
    ) -> Result<PhotoAnalysis, AnalyzerError> {
        let focus = if photo.is_house_photo() {
            "Assess housing_condition (poor|basic|adequate|good)."
        } else {
            "Assess business_scale (small|medium|large), inventory_density \
(low|moderate|high), and asset_quality (poor|fair|good|excellent)."
        };

        let prompt = format!(
            "You are analyzing a micro-business credit-assessment photo.\n\
Photo reference: {}\nPhoto type: {}\n{}\n\n{} Also report a \
socioeconomic_indicators string map and a confidence_score between 0 and 1.\n\
Respond ONLY with valid JSON using exactly those field names.",
            photo.reference,
            photo.photo_type,
            borrower_context_lines(features),
            focus,
        );

        self.structured(&prompt)
    }
}

impl NoteAnalyzer for GeminiClient {
    fn analyze_note(
        &self,
        note_text: &str,
        features: &BorrowerFeatures,
    ) -> Result<NoteAnalysis, AnalyzerError> {
        let prompt = format!(
            "You are analyzing a field agent's narrative about a micro-loan \
borrower.\n{}\n\nField note:\n{}\n\nExtract extracted_income_estimate (Rupiah \
per month), sentiment_score (0-1), risk_flags (array of {{flag, severity: \
low|medium|high}}), behavioral_insights (cooperation_level/transparency/\
trustworthiness: low|medium|high; business_knowledge/financial_planning: \
weak|basic|good|strong), and confidence_score (0-1).\n\
Respond ONLY with valid JSON using exactly those field names.",
            borrower_context_lines(features),
            note_text,
        );

        self.structured(&prompt)
    }
}

impl ExplanationGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, AnalyzerError> {
        let text = self.generate_text(prompt)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AnalyzerError::Contract("empty explanation".into()));
        }
        Ok(trimmed.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}
