pub mod catalog;
pub mod classifier;
pub mod features;
pub mod match_state;

pub use catalog::{City, Team};
pub use classifier::{LogisticPipeline, UnavailableClassifier, WinClassifier};
pub use features::FeatureVector;
pub use match_state::{MatchForm, MatchInput, MatchState};

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::PredictError;

/// Classifier output for the batting side. The pair is passed through as
/// returned; summing to one is the classifier's contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub loss_probability: f64,
    pub win_probability: f64,
}

impl PredictionResult {
    pub fn win_percent(&self) -> i64 {
        display_percent(self.win_probability)
    }

    pub fn loss_percent(&self) -> i64 {
        display_percent(self.loss_probability)
    }
}

/// Scale to a percentage and round half to even. The two sides are rounded
/// independently, so they can total 99 or 101.
fn display_percent(p: f64) -> i64 {
    (p * 100.0).round_ties_even() as i64
}

/// Everything one predict interaction produced.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Prediction {
    pub state: MatchState,
    pub features: FeatureVector,
    pub result: PredictionResult,
}

/// Feature deriver and classifier bridge. The classifier is injected so
/// tests can substitute a stub.
#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn WinClassifier>,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn WinClassifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn is_available(&self) -> bool {
        self.classifier.is_available()
    }

    /// Validate, derive features and ask the classifier. The classifier is
    /// never called when validation fails.
    pub fn predict(&self, input: &MatchInput) -> Result<Prediction, PredictError> {
        let state = input.validate()?;
        let features = FeatureVector::derive(&state);
        debug!(
            runs_left = features.runs_left,
            balls_left = features.balls_left,
            wickets = features.wickets_remaining,
            crr = features.current_run_rate,
            rrr = features.required_run_rate,
            "Derived chase features"
        );

        let [loss_probability, win_probability] = self.classifier.predict_proba(&features)?;
        let result = PredictionResult {
            loss_probability,
            win_probability,
        };
        info!(
            "{} vs {} at {}: win {}% / loss {}% ({})",
            state.batting_team,
            state.bowling_team,
            state.city,
            result.win_percent(),
            result.loss_percent(),
            self.classifier.name()
        );

        Ok(Prediction {
            state,
            features,
            result,
        })
    }
}
