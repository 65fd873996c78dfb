//! Win/loss classifiers consumed through a `predict_proba`-style contract.
//!
//! The pre-trained model is an exported pipeline: one-hot encoding of the
//! categorical columns followed by a logistic regression over the encoded
//! vector. It is loaded once at startup and never mutated.

use serde::Deserialize;
use std::path::Path;

use super::features::{FeatureValue, FeatureVector, FEATURE_COLUMNS};
use crate::error::{ArtifactError, PredictError};

/// Anything that can turn a feature row into `[P(loss), P(win)]` for the
/// batting side.
pub trait WinClassifier: Send + Sync {
    /// Index 0 is "batting team loses", index 1 is "batting team wins".
    fn predict_proba(&self, row: &FeatureVector) -> Result<[f64; 2], PredictError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;

    fn is_available(&self) -> bool {
        true
    }
}

/// One-hot encoding of a single categorical column.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoricalEncoding {
    pub column: String,
    pub levels: Vec<String>,
    /// Drop the first level (reference category) from the encoded vector.
    #[serde(default)]
    pub drop_first: bool,
}

impl CategoricalEncoding {
    fn width(&self) -> usize {
        let skip = usize::from(self.drop_first);
        self.levels.len().saturating_sub(skip)
    }
}

/// On-disk layout of the exported pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    pub columns: Vec<String>,
    /// Class labels in the order the model emits them; 1 means "batting team wins".
    pub classes: [u8; 2],
    pub categorical: Vec<CategoricalEncoding>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Logistic regression over a one-hot encoded feature row.
#[derive(Debug, Clone)]
pub struct LogisticPipeline {
    name: String,
    artifact: ModelArtifact,
    /// Emitted class order is `[1, 0]`, so outputs are flipped.
    swapped: bool,
}

impl LogisticPipeline {
    /// Load and check an artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ArtifactError> {
        if artifact.columns.len() != FEATURE_COLUMNS.len()
            || artifact.columns.iter().zip(FEATURE_COLUMNS).any(|(a, b)| a != b)
        {
            return Err(ArtifactError::Schema(format!(
                "model expects columns [{}], feature row has [{}]",
                artifact.columns.join(", "),
                FEATURE_COLUMNS.join(", ")
            )));
        }

        for enc in &artifact.categorical {
            if !FEATURE_COLUMNS.contains(&enc.column.as_str()) {
                return Err(ArtifactError::Schema(format!(
                    "encoding for unknown column '{}'",
                    enc.column
                )));
            }
            if enc.levels.is_empty() {
                return Err(ArtifactError::Schema(format!(
                    "column '{}' has no levels",
                    enc.column
                )));
            }
        }

        let swapped = match artifact.classes {
            [0, 1] => false,
            [1, 0] => true,
            other => {
                return Err(ArtifactError::Schema(format!(
                    "classes must be a permutation of [0, 1], got {:?}",
                    other
                )))
            }
        };

        let width = encoded_width(&artifact);
        if artifact.coefficients.len() != width {
            return Err(ArtifactError::Schema(format!(
                "expected {} coefficients for the encoded row, got {}",
                width,
                artifact.coefficients.len()
            )));
        }

        Ok(LogisticPipeline {
            name: format!("logistic-pipeline {}", artifact.version),
            artifact,
            swapped,
        })
    }

    fn encoding_for(&self, column: &str) -> Option<&CategoricalEncoding> {
        self.artifact.categorical.iter().find(|e| e.column == column)
    }

    /// Expand the row into the design vector the coefficients were fitted on.
    fn encode(&self, row: &FeatureVector) -> Result<Vec<f64>, PredictError> {
        let mut encoded = Vec::with_capacity(self.artifact.coefficients.len());
        for (column, value) in row.row() {
            match (self.encoding_for(column), value) {
                (Some(enc), FeatureValue::Category(level)) => {
                    let idx = enc.levels.iter().position(|l| l == level).ok_or_else(|| {
                        PredictError::PredictionUnavailable(format!(
                            "'{}' is not a known value for {}",
                            level, column
                        ))
                    })?;
                    let first = usize::from(enc.drop_first);
                    encoded.extend((first..enc.levels.len()).map(|i| if i == idx { 1.0 } else { 0.0 }));
                }
                (None, FeatureValue::Number(x)) => encoded.push(x),
                (Some(_), FeatureValue::Number(_)) => {
                    return Err(PredictError::PredictionUnavailable(format!(
                        "model encodes {} as categorical but the row holds a number",
                        column
                    )))
                }
                (None, FeatureValue::Category(_)) => {
                    return Err(PredictError::PredictionUnavailable(format!(
                        "model has no encoding for categorical column {}",
                        column
                    )))
                }
            }
        }
        Ok(encoded)
    }
}

fn encoded_width(artifact: &ModelArtifact) -> usize {
    artifact
        .columns
        .iter()
        .map(|col| {
            artifact
                .categorical
                .iter()
                .find(|e| &e.column == col)
                .map_or(1, CategoricalEncoding::width)
        })
        .sum()
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

impl WinClassifier for LogisticPipeline {
    fn predict_proba(&self, row: &FeatureVector) -> Result<[f64; 2], PredictError> {
        let encoded = self.encode(row)?;
        let z: f64 = self.artifact.intercept
            + encoded
                .iter()
                .zip(&self.artifact.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>();
        if !z.is_finite() {
            return Err(PredictError::PredictionUnavailable(
                "model produced a non-finite score".into(),
            ));
        }
        let p1 = sigmoid(z);
        let pair = [1.0 - p1, p1];
        Ok(if self.swapped { [pair[1], pair[0]] } else { pair })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Stand-in installed when the artifact could not be loaded at startup.
/// Every prediction reports why instead of inventing a probability.
#[derive(Debug, Clone)]
pub struct UnavailableClassifier {
    reason: String,
}

impl UnavailableClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl WinClassifier for UnavailableClassifier {
    fn predict_proba(&self, _row: &FeatureVector) -> Result<[f64; 2], PredictError> {
        Err(PredictError::PredictionUnavailable(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }
}
