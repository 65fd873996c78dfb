//! Closed vocabularies the classifier was trained on.
//!
//! Dropdowns are populated from these lists and every submitted name is
//! checked against them before a feature row is built, so an unseen value
//! never reaches the classifier.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::PredictError;

/// A franchise that can bat or bowl in the chase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Team {
    SunrisersHyderabad,
    MumbaiIndians,
    RoyalChallengersBangalore,
    KolkataKnightRiders,
    KingsXiPunjab,
    ChennaiSuperKings,
    RajasthanRoyals,
    DelhiCapitals,
}

impl Team {
    pub const ALL: [Team; 8] = [
        Team::SunrisersHyderabad,
        Team::MumbaiIndians,
        Team::RoyalChallengersBangalore,
        Team::KolkataKnightRiders,
        Team::KingsXiPunjab,
        Team::ChennaiSuperKings,
        Team::RajasthanRoyals,
        Team::DelhiCapitals,
    ];

    /// Name exactly as it appears in the training data.
    pub fn name(self) -> &'static str {
        match self {
            Team::SunrisersHyderabad => "Sunrisers Hyderabad",
            Team::MumbaiIndians => "Mumbai Indians",
            Team::RoyalChallengersBangalore => "Royal Challengers Bangalore",
            Team::KolkataKnightRiders => "Kolkata Knight Riders",
            Team::KingsXiPunjab => "Kings XI Punjab",
            Team::ChennaiSuperKings => "Chennai Super Kings",
            Team::RajasthanRoyals => "Rajasthan Royals",
            Team::DelhiCapitals => "Delhi Capitals",
        }
    }

    /// Team names in dropdown order.
    pub fn sorted_names() -> Vec<&'static str> {
        let mut names: Vec<_> = Team::ALL.iter().map(|t| t.name()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Team> for &'static str {
    fn from(team: Team) -> Self {
        team.name()
    }
}

impl FromStr for Team {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Team::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| PredictError::InvalidInput(format!("unknown team '{}'", s)))
    }
}

/// Host venues seen in training.
static CITIES: [&str; 29] = [
    "Hyderabad",
    "Bangalore",
    "Mumbai",
    "Indore",
    "Kolkata",
    "Delhi",
    "Chandigarh",
    "Jaipur",
    "Chennai",
    "Cape Town",
    "Port Elizabeth",
    "Durban",
    "Centurion",
    "East London",
    "Johannesburg",
    "Kimberley",
    "Bloemfontein",
    "Ahmedabad",
    "Cuttack",
    "Nagpur",
    "Dharamsala",
    "Visakhapatnam",
    "Pune",
    "Raipur",
    "Ranchi",
    "Abu Dhabi",
    "Sharjah",
    "Mohali",
    "Bengaluru",
];

/// A host city drawn from the closed venue list.
///
/// "Bangalore" and "Bengaluru" are distinct levels because the training data
/// carries both spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub struct City(&'static str);

impl City {
    pub fn all() -> impl Iterator<Item = City> {
        CITIES.iter().map(|c| City(*c))
    }

    pub fn name(self) -> &'static str {
        self.0
    }

    /// City names in dropdown order.
    pub fn sorted_names() -> Vec<&'static str> {
        let mut names = CITIES.to_vec();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl From<City> for &'static str {
    fn from(city: City) -> Self {
        city.0
    }
}

impl FromStr for City {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        City::all()
            .find(|c| c.0 == s)
            .ok_or_else(|| PredictError::InvalidInput(format!("unknown city '{}'", s)))
    }
}
