//! Reduction of per-photo and per-note analyses into one bounded score
//! adjustment, a confidence, and a compact summary. Everything here is
//! pure arithmetic over the tables in [`super::config`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::config::{
    asset_quality_points, behavior_points, business_scale_points, housing_points,
    inventory_points, planning_points, sentiment_points, HIGH_FLAG_PENALTY, MEDIUM_FLAG_PENALTY,
};
use super::domain::{
    round2, AssetQuality, BehaviorLevel, BusinessScale, FlagSeverity, InventoryDensity,
    NoteAnalysis, PhotoAnalysis,
};

/// Confidence reported when there is nothing to aggregate. Callers that
/// need a meaningful confidence must guard against empty input first.
const EMPTY_CONFIDENCE: f64 = 0.7;

/// Aggregated vision signal carried on the final assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionInsights {
    pub score_adjustment: f64,
    pub confidence: f64,
    pub num_photos_analyzed: usize,
    pub analyses: Vec<PhotoAnalysis>,
    pub summary: PhotoSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSummary {
    pub most_common_business_scale: BusinessScale,
    pub average_asset_quality: AssetQuality,
    pub good_asset_quality: bool,
    pub high_inventory: bool,
}

/// Aggregated narrative signal carried on the final assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeInsights {
    pub score_adjustment: f64,
    pub confidence: f64,
    pub num_notes_analyzed: usize,
    pub analyses: Vec<NoteAnalysis>,
    pub summary: NoteSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub average_sentiment: f64,
    pub aggregated_risk_flags: Vec<String>,
    pub high_cooperation: bool,
}

/// Adjustment contributed by one photo analysis, already weighted by that
/// analysis's own confidence. Absent fields read as the neutral middle of
/// their scale.
pub fn photo_adjustment(analysis: &PhotoAnalysis) -> f64 {
    let mut adjustment = business_scale_points(
        analysis.business_scale.unwrap_or(BusinessScale::Small),
    );
    adjustment += inventory_points(
        analysis
            .inventory_density
            .unwrap_or(InventoryDensity::Moderate),
    );
    adjustment += asset_quality_points(analysis.asset_quality.unwrap_or(AssetQuality::Fair));
    if let Some(condition) = analysis.housing_condition {
        adjustment += housing_points(condition);
    }

    round2(adjustment * analysis.confidence_score)
}

/// Adjustment contributed by one note analysis, confidence-weighted.
pub fn note_adjustment(analysis: &NoteAnalysis) -> f64 {
    let mut adjustment = sentiment_points(analysis.sentiment_score);

    let behavioral = &analysis.behavioral_insights;
    adjustment += behavior_points(behavioral.cooperation_level);
    adjustment += behavior_points(behavioral.transparency);
    adjustment += planning_points(behavioral.financial_planning);

    for flag in &analysis.risk_flags {
        match flag.severity {
            FlagSeverity::High => adjustment -= HIGH_FLAG_PENALTY,
            FlagSeverity::Medium => adjustment -= MEDIUM_FLAG_PENALTY,
            FlagSeverity::Low => {}
        }
    }

    round2(adjustment * analysis.confidence_score)
}

/// Reduce a photo batch to one adjustment, confidence, and summary. An
/// empty batch yields adjustment 0.0 and the default confidence.
pub fn aggregate_photos(analyses: &[PhotoAnalysis]) -> VisionInsights {
    if analyses.is_empty() {
        return VisionInsights {
            score_adjustment: 0.0,
            confidence: EMPTY_CONFIDENCE,
            num_photos_analyzed: 0,
            analyses: Vec::new(),
            summary: PhotoSummary {
                most_common_business_scale: BusinessScale::Small,
                average_asset_quality: AssetQuality::Fair,
                good_asset_quality: false,
                high_inventory: false,
            },
        };
    }

    let count = analyses.len() as f64;
    let total_adjustment: f64 = analyses.iter().map(photo_adjustment).sum();
    let total_confidence: f64 = analyses.iter().map(|a| a.confidence_score).sum();

    VisionInsights {
        score_adjustment: round2(total_adjustment / count),
        confidence: round2(total_confidence / count),
        num_photos_analyzed: analyses.len(),
        analyses: analyses.to_vec(),
        summary: summarize_photos(analyses),
    }
}

/// Reduce a note batch to one adjustment, confidence, and summary.
pub fn aggregate_notes(analyses: &[NoteAnalysis]) -> NarrativeInsights {
    if analyses.is_empty() {
        return NarrativeInsights {
            score_adjustment: 0.0,
            confidence: EMPTY_CONFIDENCE,
            num_notes_analyzed: 0,
            analyses: Vec::new(),
            summary: NoteSummary {
                average_sentiment: 0.0,
                aggregated_risk_flags: Vec::new(),
                high_cooperation: false,
            },
        };
    }

    let count = analyses.len() as f64;
    let total_adjustment: f64 = analyses.iter().map(note_adjustment).sum();
    let total_confidence: f64 = analyses.iter().map(|a| a.confidence_score).sum();

    NarrativeInsights {
        score_adjustment: round2(total_adjustment / count),
        confidence: round2(total_confidence / count),
        num_notes_analyzed: analyses.len(),
        analyses: analyses.to_vec(),
        summary: summarize_notes(analyses),
    }
}

fn summarize_photos(analyses: &[PhotoAnalysis]) -> PhotoSummary {
    let most_common_business_scale =
        most_common(analyses.iter().filter_map(|a| a.business_scale)).unwrap_or(BusinessScale::Small);
    let average_asset_quality =
        most_common(analyses.iter().filter_map(|a| a.asset_quality)).unwrap_or(AssetQuality::Fair);

    PhotoSummary {
        most_common_business_scale,
        average_asset_quality,
        good_asset_quality: average_asset_quality >= AssetQuality::Good,
        high_inventory: analyses
            .iter()
            .any(|a| a.inventory_density == Some(InventoryDensity::High)),
    }
}

fn summarize_notes(analyses: &[NoteAnalysis]) -> NoteSummary {
    let count = analyses.len();
    let average_sentiment =
        round2(analyses.iter().map(|a| a.sentiment_score).sum::<f64>() / count as f64);

    // Deduplicated union of flag labels, first occurrence order preserved.
    let mut seen = BTreeSet::new();
    let mut aggregated_risk_flags = Vec::new();
    for analysis in analyses {
        for flag in &analysis.risk_flags {
            if seen.insert(flag.flag.clone()) {
                aggregated_risk_flags.push(flag.flag.clone());
            }
        }
    }

    let high_cooperation_count = analyses
        .iter()
        .filter(|a| a.behavioral_insights.cooperation_level == BehaviorLevel::High)
        .count();

    NoteSummary {
        average_sentiment,
        aggregated_risk_flags,
        high_cooperation: high_cooperation_count * 2 > count,
    }
}

/// Most frequent value; ties resolve to the lower variant so repeated runs
/// agree byte-for-byte.
fn most_common<T: Ord + Copy>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(left_value, left_count), (right_value, right_count)| {
            left_count
                .cmp(right_count)
                .then(right_value.cmp(left_value))
        })
        .map(|(value, _)| value)
}
