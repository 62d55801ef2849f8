//! Every threshold, weight, and lookup table the scoring pipeline
//! consumes. The rest of the workflow only ever reads them from here.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{
    AssetQuality, BehaviorLevel, BusinessScale, CapabilityLevel, HousingCondition,
    InventoryDensity, RiskCategory,
};

/// Score thresholds for the risk ladder, best tier first. Boundary values
/// map to the better tier; anything below the last entry is very high risk.
pub(crate) const RISK_LADDER: [(f64, RiskCategory); 3] = [
    (75.0, RiskCategory::Low),
    (55.0, RiskCategory::Medium),
    (35.0, RiskCategory::High),
];

/// Fusion weights applied to the auxiliary adjustments. The baseline is
/// never down-weighted; adjustments are bounded modifiers, not peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub vision_adjustment: f64,
    pub nlp_adjustment: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            vision_adjustment: 0.5,
            nlp_adjustment: 0.5,
        }
    }
}

/// Weights for blending the three income estimates, renormalized over
/// whichever estimates are actually present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateWeights {
    pub nlp: f64,
    pub vision: f64,
    pub benchmark: f64,
}

impl Default for EstimateWeights {
    fn default() -> Self {
        Self {
            nlp: 0.40,
            vision: 0.35,
            benchmark: 0.25,
        }
    }
}

/// Documented defaults applied when an intake snapshot omits a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDefaults {
    pub age: u8,
    pub years_in_business: f64,
    pub num_dependents: u8,
    pub claimed_monthly_income: f64,
    pub financial_literacy_score: f64,
    pub on_time_rate: f64,
    pub avg_days_overdue: f64,
}

impl Default for FeatureDefaults {
    fn default() -> Self {
        Self {
            age: 35,
            years_in_business: 2.0,
            num_dependents: 2,
            claimed_monthly_income: 3_000_000.0,
            financial_literacy_score: 50.0,
            on_time_rate: 0.5,
            avg_days_overdue: 5.0,
        }
    }
}

/// Per-tier loan sizing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTier {
    pub income_multiple: f64,
    pub term_weeks: u32,
    pub safe_repayment_rate: f64,
}

impl LoanTier {
    pub const fn for_category(category: RiskCategory) -> Self {
        match category {
            RiskCategory::Low => Self {
                income_multiple: 3.0,
                term_weeks: 24,
                safe_repayment_rate: 0.30,
            },
            RiskCategory::Medium => Self {
                income_multiple: 2.0,
                term_weeks: 20,
                safe_repayment_rate: 0.25,
            },
            RiskCategory::High => Self {
                income_multiple: 1.0,
                term_weeks: 16,
                safe_repayment_rate: 0.20,
            },
            RiskCategory::VeryHigh => Self {
                income_multiple: 0.5,
                term_weeks: 12,
                safe_repayment_rate: 0.15,
            },
        }
    }
}

// Per-analysis adjustment tables. Absent photo fields fall back to the
// neutral middle of each scale before lookup.

pub(crate) const fn business_scale_points(scale: BusinessScale) -> f64 {
    match scale {
        BusinessScale::Large => 5.0,
        BusinessScale::Medium => 2.0,
        BusinessScale::Small => 0.0,
    }
}

pub(crate) const fn inventory_points(density: InventoryDensity) -> f64 {
    match density {
        InventoryDensity::High => 3.0,
        InventoryDensity::Moderate => 1.0,
        InventoryDensity::Low => 0.0,
    }
}

pub(crate) const fn asset_quality_points(quality: AssetQuality) -> f64 {
    match quality {
        AssetQuality::Excellent => 5.0,
        AssetQuality::Good => 3.0,
        AssetQuality::Fair => 1.0,
        AssetQuality::Poor => -2.0,
    }
}

pub(crate) const fn housing_points(condition: HousingCondition) -> f64 {
    match condition {
        HousingCondition::Good => 4.0,
        HousingCondition::Adequate => 2.0,
        HousingCondition::Basic => 0.0,
        HousingCondition::Poor => -3.0,
    }
}

pub(crate) fn sentiment_points(sentiment: f64) -> f64 {
    if sentiment >= 0.8 {
        5.0
    } else if sentiment >= 0.7 {
        3.0
    } else if sentiment >= 0.5 {
        0.0
    } else {
        -3.0
    }
}

pub(crate) const fn behavior_points(level: BehaviorLevel) -> f64 {
    match level {
        BehaviorLevel::High => 2.0,
        BehaviorLevel::Medium => 0.0,
        BehaviorLevel::Low => -2.0,
    }
}

pub(crate) const fn planning_points(level: CapabilityLevel) -> f64 {
    match level {
        CapabilityLevel::Good | CapabilityLevel::Strong => 2.0,
        CapabilityLevel::Basic => 0.0,
        CapabilityLevel::Weak => -2.0,
    }
}

pub(crate) const HIGH_FLAG_PENALTY: f64 = 2.0;
pub(crate) const MEDIUM_FLAG_PENALTY: f64 = 1.0;

/// Numeric codes for known trades, fed to the classifier feature vector.
/// Unknown trades encode as zero.
const BUSINESS_TYPE_CODES: [(&str, f64); 9] = [
    ("Warung Kelontong", 1.0),
    ("Warung Gorengan", 2.0),
    ("Jahit Pakaian", 3.0),
    ("Jualan Sayur", 4.0),
    ("Catering", 5.0),
    ("Salon", 6.0),
    ("Toko Pulsa", 7.0),
    ("Warung Nasi", 8.0),
    ("Industri Kerupuk", 9.0),
];

pub(crate) fn business_type_code(business_type: &str) -> f64 {
    for (name, code) in BUSINESS_TYPE_CODES {
        if business_type.contains(name) {
            return code;
        }
    }
    0.0
}

const DEFAULT_BENCHMARK_INCOME: f64 = 3_000_000.0;

/// Typical monthly income per trade, matched by substring. The built-in
/// table covers the portfolio's common Indonesian micro-businesses and is
/// swappable wholesale via [`BusinessBenchmarks::from_csv_path`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessBenchmarks {
    entries: Vec<(String, f64)>,
    default_income: f64,
}

impl Default for BusinessBenchmarks {
    fn default() -> Self {
        let entries = [
            ("Warung Kelontong", 3_500_000.0),
            ("Warung Gorengan", 2_500_000.0),
            ("Jahit Pakaian", 3_000_000.0),
            ("Jualan Sayur", 2_000_000.0),
            ("Catering", 4_500_000.0),
            ("Salon", 3_000_000.0),
            ("Toko Pulsa", 3_200_000.0),
            ("Warung Nasi", 3_800_000.0),
            ("Industri Kerupuk", 2_800_000.0),
        ]
        .into_iter()
        .map(|(name, income)| (name.to_string(), income))
        .collect();

        Self {
            entries,
            default_income: DEFAULT_BENCHMARK_INCOME,
        }
    }
}

impl BusinessBenchmarks {
    pub fn new(entries: Vec<(String, f64)>, default_income: f64) -> Self {
        Self {
            entries,
            default_income,
        }
    }

    /// Typical monthly income for the given trade; the first substring
    /// match wins, and unmatched trades fall back to the default.
    pub fn lookup(&self, business_type: &str) -> f64 {
        for (name, income) in &self.entries {
            if business_type.contains(name.as_str()) {
                return *income;
            }
        }
        self.default_income
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, BenchmarkLoadError> {
        let file = std::fs::File::open(path).map_err(BenchmarkLoadError::Io)?;
        Self::from_csv_reader(file)
    }

    /// Parse a two-column `business_type,monthly_income` table.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, BenchmarkLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for record in csv_reader.deserialize::<BenchmarkRow>() {
            let row = record?;
            if row.business_type.is_empty() {
                continue;
            }
            entries.push((row.business_type, row.monthly_income.max(0.0)));
        }

        if entries.is_empty() {
            return Err(BenchmarkLoadError::Empty);
        }

        Ok(Self {
            entries,
            default_income: DEFAULT_BENCHMARK_INCOME,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BenchmarkRow {
    business_type: String,
    monthly_income: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum BenchmarkLoadError {
    #[error("unable to read benchmark table: {0}")]
    Io(std::io::Error),
    #[error("malformed benchmark table: {0}")]
    Csv(#[from] csv::Error),
    #[error("benchmark table contains no rows")]
    Empty,
}

/// Bundle of tables injected into the assessment service. Callers tweak
/// individual fields; the defaults reproduce the published scoring policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentConfig {
    pub weights: ScoreWeights,
    pub estimate_weights: EstimateWeights,
    pub defaults: FeatureDefaults,
    pub benchmarks: BusinessBenchmarks,
}
