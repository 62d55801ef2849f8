use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{round2, Assessment, RiskCategory};

/// Portfolio share of one risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryShare {
    pub count: usize,
    pub percentage: f64,
}

/// Distribution of a set of assessments across the risk ladder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskDistribution {
    pub total_assessments: usize,
    pub by_category: BTreeMap<RiskCategory, CategoryShare>,
    pub average_score: f64,
}

/// Summarize how a set of assessments lands on the risk ladder. Pure.
pub fn risk_distribution(assessments: &[Assessment]) -> RiskDistribution {
    let total = assessments.len();
    let mut counts: BTreeMap<RiskCategory, usize> = BTreeMap::new();
    for assessment in assessments {
        *counts.entry(assessment.risk_category).or_insert(0) += 1;
    }

    let by_category = counts
        .into_iter()
        .map(|(category, count)| {
            let percentage = if total > 0 {
                round2(count as f64 / total as f64 * 100.0)
            } else {
                0.0
            };
            (category, CategoryShare { count, percentage })
        })
        .collect();

    let average_score = if total > 0 {
        round2(
            assessments.iter().map(|a| a.final_score).sum::<f64>() / total as f64,
        )
    } else {
        0.0
    };

    RiskDistribution {
        total_assessments: total,
        by_category,
        average_score,
    }
}
