use std::io::Read;
use std::path::Path;

use serde::Deserialize;

/// Pre-fitted linear classifier exported as a JSON artifact: a standard
/// scaler (per-feature means and deviations) plus logistic weights. The
/// crate never trains; it only evaluates what the offline pipeline fitted.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    feature_means: Vec<f64>,
    feature_std_devs: Vec<f64>,
    weights: Vec<f64>,
    intercept: f64,
    model_version: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelArtifactError {
    #[error("unable to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model artifact shape mismatch: expected {expected} features, got {found}")]
    Shape { expected: usize, found: usize },
}

impl ModelArtifact {
    pub fn from_path(path: &Path) -> Result<Self, ModelArtifactError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelArtifactError> {
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        artifact.validated()
    }

    fn validated(self) -> Result<Self, ModelArtifactError> {
        let expected = self.weights.len();
        for found in [self.feature_means.len(), self.feature_std_devs.len()] {
            if found != expected {
                return Err(ModelArtifactError::Shape { expected, found });
            }
        }
        Ok(self)
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Positive-class probability for a raw feature vector: standardize,
    /// apply the linear model, squash through the logistic function.
    pub fn predict_probability(&self, features: &[f64]) -> Result<f64, ModelArtifactError> {
        if features.len() != self.weights.len() {
            return Err(ModelArtifactError::Shape {
                expected: self.weights.len(),
                found: features.len(),
            });
        }

        let mut activation = self.intercept;
        for (index, value) in features.iter().enumerate() {
            let deviation = self.feature_std_devs[index];
            let scaled = if deviation > 0.0 {
                (value - self.feature_means[index]) / deviation
            } else {
                0.0
            };
            activation += scaled * self.weights[index];
        }

        Ok(1.0 / (1.0 + (-activation).exp()))
    }
}
