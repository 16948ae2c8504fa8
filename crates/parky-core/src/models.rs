//! National park and trail models
//!
//! These are the persisted entities. API payloads use the DTOs in
//! [`crate::dto`], which convert to and from these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// National park identifier
pub type ParkId = i32;

/// Trail identifier
pub type TrailId = i32;

/// Trail difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Moderate,
    Difficult,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Moderate => "Moderate",
            Difficulty::Difficult => "Difficult",
            Difficulty::Expert => "Expert",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "moderate" => Ok(Difficulty::Moderate),
            "difficult" => Ok(Difficulty::Difficult),
            "expert" => Ok(Difficulty::Expert),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A national park row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationalPark {
    pub id: ParkId,
    pub name: String,
    pub state: String,
    pub created: DateTime<Utc>,
    pub established: DateTime<Utc>,
}

/// Fields supplied when creating or updating a national park
#[derive(Debug, Clone, PartialEq)]
pub struct NationalParkDraft {
    pub name: String,
    pub state: String,
    pub established: DateTime<Utc>,
}

/// A trail row, with its owning park loaded on reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    pub id: TrailId,
    pub name: String,
    pub distance: f64,
    pub elevation: f64,
    pub difficulty: Difficulty,
    pub national_park_id: ParkId,
    pub date_created: DateTime<Utc>,
    pub national_park: Option<NationalPark>,
}

/// Fields supplied when creating or updating a trail
#[derive(Debug, Clone, PartialEq)]
pub struct TrailDraft {
    pub name: String,
    pub distance: f64,
    pub elevation: f64,
    pub difficulty: Difficulty,
    pub national_park_id: ParkId,
}

/// Normalized form used for case-insensitive name uniqueness
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
