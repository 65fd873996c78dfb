//! Input collector: raw match-state fields and the validation gate.

use serde::{Deserialize, Serialize};

use super::catalog::{City, Team};
use crate::error::{PredictError, INVALID_OVERS_OR_TARGET};

/// Overs in a T20 innings.
pub const MAX_OVERS: f64 = 20.0;
/// Wickets available to the batting side.
pub const MAX_WICKETS: u32 = 10;

/// Match state as submitted, before vocabulary and range checks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchInput {
    pub batting_team: String,
    pub bowling_team: String,
    pub city: String,
    pub target: u32,
    pub current_score: u32,
    pub overs_completed: f64,
    pub wickets_fallen: u32,
}

/// The HTML form posts every field as text; numbers are parsed here so a bad
/// value becomes a warning instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchForm {
    #[serde(default)]
    pub batting_team: String,
    #[serde(default)]
    pub bowling_team: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub current_score: String,
    #[serde(default)]
    pub overs_completed: String,
    #[serde(default)]
    pub wickets_fallen: String,
}

impl MatchForm {
    pub fn parse(&self) -> Result<MatchInput, PredictError> {
        Ok(MatchInput {
            batting_team: self.batting_team.clone(),
            bowling_team: self.bowling_team.clone(),
            city: self.city.clone(),
            target: parse_count("target", &self.target)?,
            current_score: parse_count("current score", &self.current_score)?,
            overs_completed: parse_overs(&self.overs_completed)?,
            wickets_fallen: parse_count("wickets fallen", &self.wickets_fallen)?,
        })
    }
}

fn parse_count(field: &str, raw: &str) -> Result<u32, PredictError> {
    raw.trim().parse::<u32>().map_err(|_| {
        PredictError::InvalidInput(format!(
            "{} must be a non-negative whole number, got '{}'",
            field,
            raw.trim()
        ))
    })
}

fn parse_overs(raw: &str) -> Result<f64, PredictError> {
    raw.trim().parse::<f64>().map_err(|_| {
        PredictError::InvalidInput(format!(
            "overs completed must be a number, got '{}'",
            raw.trim()
        ))
    })
}

/// A validated, request-scoped match state.
///
/// `batting_team == bowling_team` is accepted, and fractional overs are not
/// snapped to whole balls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchState {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    pub target: u32,
    pub current_score: u32,
    pub overs_completed: f64,
    pub wickets_fallen: u32,
}

impl MatchInput {
    /// Run the input gate. Nothing downstream is invoked when this fails.
    pub fn validate(&self) -> Result<MatchState, PredictError> {
        let batting_team: Team = self.batting_team.parse()?;
        let bowling_team: Team = self.bowling_team.parse()?;
        let city: City = self.city.parse()?;

        if !self.overs_completed.is_finite() || self.overs_completed < 0.0 {
            return Err(PredictError::InvalidInput(format!(
                "overs completed must be between 0 and {}",
                MAX_OVERS
            )));
        }
        if self.wickets_fallen > MAX_WICKETS {
            return Err(PredictError::InvalidInput(format!(
                "wickets fallen must be between 0 and {}",
                MAX_WICKETS
            )));
        }
        if self.overs_completed == 0.0 || self.overs_completed > MAX_OVERS || self.target == 0 {
            return Err(PredictError::InvalidInput(INVALID_OVERS_OR_TARGET.into()));
        }

        Ok(MatchState {
            batting_team,
            bowling_team,
            city,
            target: self.target,
            current_score: self.current_score,
            overs_completed: self.overs_completed,
            wickets_fallen: self.wickets_fallen,
        })
    }
}
