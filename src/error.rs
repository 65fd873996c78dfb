use thiserror::Error;

/// Warning shown when the overs/target gate rejects a match state.
pub const INVALID_OVERS_OR_TARGET: &str = "Please enter valid values for overs and target.";

/// Outcome of a failed predict interaction.
///
/// Both kinds are terminal for the interaction: nothing is retried and no
/// default probability is substituted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    /// Rejected by the input collector before the classifier is consulted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The classifier could not produce a probability pair.
    #[error("Prediction unavailable: {0}")]
    PredictionUnavailable(String),
}

impl PredictError {
    /// Short machine-readable tag used by the JSON API.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::InvalidInput(_) => "invalid_input",
            PredictError::PredictionUnavailable(_) => "prediction_unavailable",
        }
    }

    /// The human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            PredictError::InvalidInput(msg) | PredictError::PredictionUnavailable(msg) => msg,
        }
    }
}

/// Failures while loading a classifier artifact from disk.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("cannot read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feature schema mismatch: {0}")]
    Schema(String),
}

impl From<ArtifactError> for PredictError {
    fn from(err: ArtifactError) -> Self {
        PredictError::PredictionUnavailable(err.to_string())
    }
}
