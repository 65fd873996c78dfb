//! Feature derivation for the chase classifier.
//!
//! ```text
//! runs_left   = target - current_score
//! balls_left  = 120 - overs_completed * 6
//! wickets     = 10 - wickets_fallen
//! crr         = current_score / overs_completed     (0 when no overs bowled)
//! rrr         = runs_left * 6 / balls_left          (0 when no balls left)
//! ```

use serde::Serialize;

use super::catalog::{City, Team};
use super::match_state::{MatchState, MAX_OVERS, MAX_WICKETS};

/// Balls per over.
const BALLS_PER_OVER: f64 = 6.0;

/// Column names of the trained schema, in training order.
pub const FEATURE_COLUMNS: [&str; 9] = [
    "batting_team",
    "bowling_team",
    "city",
    "runs_left",
    "balls_left",
    "wickets",
    "total_runs_x",
    "crr",
    "rrr",
];

/// A single cell of the feature row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Category(&'static str),
    Number(f64),
}

/// One row fed to the classifier. Built once per prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    /// Negative once the chase is already won.
    pub runs_left: i64,
    /// Fractional for fractional overs.
    pub balls_left: f64,
    pub wickets_remaining: i64,
    pub total_target: u32,
    pub current_run_rate: f64,
    pub required_run_rate: f64,
}

impl FeatureVector {
    pub fn derive(state: &MatchState) -> Self {
        let score = f64::from(state.current_score);
        let runs_left = i64::from(state.target) - i64::from(state.current_score);
        let balls_left = MAX_OVERS * BALLS_PER_OVER - state.overs_completed * BALLS_PER_OVER;
        let wickets_remaining = i64::from(MAX_WICKETS) - i64::from(state.wickets_fallen);

        let current_run_rate = if state.overs_completed > 0.0 {
            score / state.overs_completed
        } else {
            0.0
        };
        let required_run_rate = if balls_left > 0.0 {
            (runs_left as f64 * BALLS_PER_OVER) / balls_left
        } else {
            0.0
        };

        FeatureVector {
            batting_team: state.batting_team,
            bowling_team: state.bowling_team,
            city: state.city,
            runs_left,
            balls_left,
            wickets_remaining,
            total_target: state.target,
            current_run_rate,
            required_run_rate,
        }
    }

    /// The row keyed by trained column name, in `FEATURE_COLUMNS` order.
    pub fn row(&self) -> [(&'static str, FeatureValue); 9] {
        [
            (FEATURE_COLUMNS[0], FeatureValue::Category(self.batting_team.name())),
            (FEATURE_COLUMNS[1], FeatureValue::Category(self.bowling_team.name())),
            (FEATURE_COLUMNS[2], FeatureValue::Category(self.city.name())),
            (FEATURE_COLUMNS[3], FeatureValue::Number(self.runs_left as f64)),
            (FEATURE_COLUMNS[4], FeatureValue::Number(self.balls_left)),
            (FEATURE_COLUMNS[5], FeatureValue::Number(self.wickets_remaining as f64)),
            (FEATURE_COLUMNS[6], FeatureValue::Number(f64::from(self.total_target))),
            (FEATURE_COLUMNS[7], FeatureValue::Number(self.current_run_rate)),
            (FEATURE_COLUMNS[8], FeatureValue::Number(self.required_run_rate)),
        ]
    }
}
