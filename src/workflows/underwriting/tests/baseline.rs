use super::common::*;
use crate::workflows::underwriting::baseline::{ModelArtifact, ModelArtifactError, RiskModel};
use crate::workflows::underwriting::domain::RiskCategory;

use std::path::Path;

#[test]
fn rule_scoring_caps_a_fully_positive_borrower_at_one_hundred() {
    let model = RiskModel::rule_based();
    let prediction = model.predict(&strong_features());

    // 50 + 30 + 10 + 8 + 10 + 7 + 15 + 5 + 8 + 7 = 150, clamped.
    assert_eq!(prediction.baseline_score, 100.0);
    assert_eq!(prediction.risk_category, RiskCategory::Low);
    assert_eq!(prediction.confidence, 0.70);
    assert_eq!(prediction.model_version, "1.0.0-rule-based");
}

#[test]
fn rule_scoring_floors_an_all_negative_borrower_at_fifty_eight() {
    let model = RiskModel::rule_based();
    let prediction = model.predict(&weak_features());

    // Additive rules floor instead of cliffing: 50 + 5 (adult age) + 3.
    assert_eq!(prediction.baseline_score, 58.0);
    assert_eq!(prediction.risk_category, RiskCategory::Medium);
}

#[test]
fn rule_scoring_is_pure() {
    let model = RiskModel::rule_based();
    let features = features(0.6, 3.0, true, false, 40.0, 2.5, 2, 29, 1);

    let first = model.predict(&features);
    let second = model.predict(&features);

    assert_eq!(first, second);
}

#[test]
fn prime_age_band_outscores_adult_band() {
    let model = RiskModel::rule_based();
    let prime = model.predict(&features(0.5, 5.0, false, false, 50.0, 2.0, 0, 35, 2));
    let adult = model.predict(&features(0.5, 5.0, false, false, 50.0, 2.0, 0, 62, 2));

    assert_eq!(prime.baseline_score - adult.baseline_score, 3.0);
}

fn artifact_json(weights: usize, intercept: f64) -> String {
    format!(
        r#"{{
            "feature_means": {means},
            "feature_std_devs": {stds},
            "weights": {weights},
            "intercept": {intercept},
            "model_version": "2.3.0"
        }}"#,
        means = serde_json::to_string(&vec![0.0; weights]).unwrap(),
        stds = serde_json::to_string(&vec![1.0; weights]).unwrap(),
        weights = serde_json::to_string(&vec![0.0; weights]).unwrap(),
        intercept = intercept,
    )
}

#[test]
fn classifier_path_scores_from_positive_class_probability() {
    // Zero weights and intercept put the logistic output at exactly 0.5.
    let artifact = ModelArtifact::from_reader(artifact_json(15, 0.0).as_bytes()).unwrap();
    let model = RiskModel::with_artifact(artifact);

    let prediction = model.predict(&strong_features());

    assert_eq!(prediction.baseline_score, 50.0);
    assert_eq!(prediction.risk_category, RiskCategory::High);
    assert_eq!(prediction.confidence, 0.5);
    assert_eq!(prediction.model_version, "2.3.0");
}

#[test]
fn classifier_shape_mismatch_falls_back_to_rules_silently() {
    // Two-feature artifact cannot score a fifteen-feature vector.
    let artifact = ModelArtifact::from_reader(artifact_json(2, 0.0).as_bytes()).unwrap();
    let model = RiskModel::with_artifact(artifact);

    let prediction = model.predict(&strong_features());

    assert_eq!(prediction.baseline_score, 100.0);
    assert_eq!(prediction.model_version, "1.0.0-rule-based");
}

#[test]
fn corrupt_artifact_is_rejected_at_parse_time() {
    let result = ModelArtifact::from_reader("not a model".as_bytes());
    assert!(matches!(result, Err(ModelArtifactError::Parse(_))));
}

#[test]
fn inconsistent_artifact_lengths_are_rejected() {
    let json = r#"{
        "feature_means": [0.0, 0.0],
        "feature_std_devs": [1.0],
        "weights": [0.1, 0.2],
        "intercept": 0.0,
        "model_version": "2.3.0"
    }"#;
    let result = ModelArtifact::from_reader(json.as_bytes());
    assert!(matches!(result, Err(ModelArtifactError::Shape { .. })));
}

#[test]
fn missing_artifact_path_pins_rule_based_mode() {
    let model = RiskModel::load(Some(Path::new("/nonexistent/model.json")));
    let prediction = model.predict(&weak_features());
    assert!(prediction.model_version.ends_with("-rule-based"));
}

#[test]
fn zero_deviation_features_do_not_divide_by_zero() {
    let json = r#"{
        "feature_means": [5.0],
        "feature_std_devs": [0.0],
        "weights": [10.0],
        "intercept": 0.0,
        "model_version": "2.3.0"
    }"#;
    let artifact = ModelArtifact::from_reader(json.as_bytes()).unwrap();
    let probability = artifact.predict_probability(&[42.0]).unwrap();
    assert_eq!(probability, 0.5);
}
