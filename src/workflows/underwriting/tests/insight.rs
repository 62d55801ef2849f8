use super::common::*;
use crate::workflows::underwriting::domain::{
    AssetQuality, BehaviorLevel, BusinessScale, CapabilityLevel, FlagSeverity, HousingCondition,
    InventoryDensity, PhotoAnalysis,
};
use crate::workflows::underwriting::insight::{
    aggregate_notes, aggregate_photos, note_adjustment, photo_adjustment,
};

#[test]
fn photo_adjustment_sums_the_tables_and_weights_by_confidence() {
    let analysis = photo_analysis(
        BusinessScale::Large,
        InventoryDensity::High,
        AssetQuality::Excellent,
        1.0,
    );
    assert_eq!(photo_adjustment(&analysis), 13.0);

    let discounted = photo_analysis(
        BusinessScale::Large,
        InventoryDensity::Moderate,
        AssetQuality::Good,
        0.8,
    );
    // (5 + 1 + 3) * 0.8
    assert_eq!(photo_adjustment(&discounted), 7.2);
}

#[test]
fn poor_signals_push_the_photo_adjustment_negative() {
    let mut analysis = photo_analysis(
        BusinessScale::Small,
        InventoryDensity::Low,
        AssetQuality::Poor,
        1.0,
    );
    analysis.housing_condition = Some(HousingCondition::Poor);
    // 0 + 0 - 2 - 3
    assert_eq!(photo_adjustment(&analysis), -5.0);
}

#[test]
fn absent_photo_fields_read_as_the_neutral_middle() {
    let housing_only = PhotoAnalysis {
        business_scale: None,
        inventory_density: None,
        asset_quality: None,
        housing_condition: Some(HousingCondition::Good),
        socioeconomic_indicators: Default::default(),
        confidence_score: 1.0,
        fallback: false,
    };
    // small 0 + moderate 1 + fair 1 + good housing 4
    assert_eq!(photo_adjustment(&housing_only), 6.0);
}

#[test]
fn fallback_business_analysis_contributes_one_point() {
    assert_eq!(photo_adjustment(&PhotoAnalysis::fallback_business()), 1.0);
}

#[test]
fn note_adjustment_combines_sentiment_behavior_and_flags() {
    let analysis = note_analysis(
        0.85,
        BehaviorLevel::High,
        CapabilityLevel::Strong,
        vec![
            ("irregular_income", FlagSeverity::High),
            ("family_financial_pressure", FlagSeverity::Medium),
        ],
        0.9,
    );
    // (5 + 2 + 0 + 2 - 2 - 1) * 0.9
    assert_eq!(note_adjustment(&analysis), 5.4);
}

#[test]
fn low_sentiment_and_weak_planning_go_negative() {
    let analysis = note_analysis(
        0.3,
        BehaviorLevel::Low,
        CapabilityLevel::Weak,
        Vec::new(),
        1.0,
    );
    // -3 - 2 + 0 - 2
    assert_eq!(note_adjustment(&analysis), -7.0);
}

#[test]
fn low_severity_flags_carry_no_penalty() {
    let with_flag = note_analysis(
        0.6,
        BehaviorLevel::Medium,
        CapabilityLevel::Basic,
        vec![("analyzer_unavailable", FlagSeverity::Low)],
        1.0,
    );
    let without = note_analysis(
        0.6,
        BehaviorLevel::Medium,
        CapabilityLevel::Basic,
        Vec::new(),
        1.0,
    );
    assert_eq!(note_adjustment(&with_flag), note_adjustment(&without));
}

#[test]
fn empty_photo_batch_aggregates_to_zero_with_default_confidence() {
    let insights = aggregate_photos(&[]);
    assert_eq!(insights.score_adjustment, 0.0);
    assert_eq!(insights.confidence, 0.7);
    assert_eq!(insights.num_photos_analyzed, 0);
}

#[test]
fn empty_note_batch_aggregates_to_zero_with_default_confidence() {
    let insights = aggregate_notes(&[]);
    assert_eq!(insights.score_adjustment, 0.0);
    assert_eq!(insights.confidence, 0.7);
}

#[test]
fn photo_aggregation_means_adjustments_and_confidences() {
    let batch = [
        photo_analysis(
            BusinessScale::Large,
            InventoryDensity::High,
            AssetQuality::Excellent,
            1.0,
        ),
        photo_analysis(
            BusinessScale::Small,
            InventoryDensity::Low,
            AssetQuality::Fair,
            0.5,
        ),
    ];
    let insights = aggregate_photos(&batch);

    // (13.0 + 0.5) / 2 and (1.0 + 0.5) / 2
    assert_eq!(insights.score_adjustment, 6.75);
    assert_eq!(insights.confidence, 0.75);
    assert_eq!(insights.num_photos_analyzed, 2);
}

#[test]
fn photo_summary_reports_modal_scale_and_quality() {
    let batch = [
        photo_analysis(
            BusinessScale::Medium,
            InventoryDensity::High,
            AssetQuality::Good,
            0.9,
        ),
        photo_analysis(
            BusinessScale::Medium,
            InventoryDensity::Low,
            AssetQuality::Good,
            0.9,
        ),
        photo_analysis(
            BusinessScale::Large,
            InventoryDensity::Moderate,
            AssetQuality::Poor,
            0.9,
        ),
    ];
    let summary = aggregate_photos(&batch).summary;

    assert_eq!(summary.most_common_business_scale, BusinessScale::Medium);
    assert_eq!(summary.average_asset_quality, AssetQuality::Good);
    assert!(summary.good_asset_quality);
    assert!(summary.high_inventory);
}

#[test]
fn note_summary_deduplicates_flags_and_detects_majority_cooperation() {
    let batch = [
        note_analysis(
            0.8,
            BehaviorLevel::High,
            CapabilityLevel::Good,
            vec![
                ("irregular_income", FlagSeverity::Medium),
                ("debt_concerns", FlagSeverity::High),
            ],
            0.9,
        ),
        note_analysis(
            0.6,
            BehaviorLevel::High,
            CapabilityLevel::Basic,
            vec![("irregular_income", FlagSeverity::Low)],
            0.8,
        ),
        note_analysis(
            0.7,
            BehaviorLevel::Low,
            CapabilityLevel::Basic,
            Vec::new(),
            0.7,
        ),
    ];
    let summary = aggregate_notes(&batch).summary;

    assert_eq!(summary.average_sentiment, 0.7);
    assert_eq!(
        summary.aggregated_risk_flags,
        vec!["irregular_income".to_string(), "debt_concerns".to_string()]
    );
    assert!(summary.high_cooperation);
}

#[test]
fn split_cooperation_is_not_a_majority() {
    let batch = [
        note_analysis(
            0.6,
            BehaviorLevel::High,
            CapabilityLevel::Basic,
            Vec::new(),
            0.8,
        ),
        note_analysis(
            0.6,
            BehaviorLevel::Low,
            CapabilityLevel::Basic,
            Vec::new(),
            0.8,
        ),
    ];
    assert!(!aggregate_notes(&batch).summary.high_cooperation);
}
