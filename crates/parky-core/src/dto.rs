//! Request and response payloads
//!
//! Each DTO converts to and from the models by hand; there is no
//! reflection-based mapping layer.

use crate::models::{Difficulty, NationalPark, NationalParkDraft, ParkId, Trail, TrailDraft, TrailId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// National park payload, used both ways
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NationalParkDto {
    #[serde(default)]
    pub id: ParkId,

    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom(function = "not_blank", message = "Name is required")
    )]
    pub name: String,

    #[validate(custom(function = "not_blank", message = "State is required"))]
    pub state: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    pub established: DateTime<Utc>,
}

impl From<&NationalPark> for NationalParkDto {
    fn from(park: &NationalPark) -> Self {
        Self {
            id: park.id,
            name: park.name.clone(),
            state: park.state.clone(),
            created: Some(park.created),
            established: park.established,
        }
    }
}

impl From<NationalPark> for NationalParkDto {
    fn from(park: NationalPark) -> Self {
        Self::from(&park)
    }
}

impl From<NationalParkDto> for NationalParkDraft {
    fn from(dto: NationalParkDto) -> Self {
        Self {
            name: dto.name.trim().to_string(),
            state: dto.state.trim().to_string(),
            established: dto.established,
        }
    }
}

/// Trail response payload with the owning park embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailDto {
    pub id: TrailId,
    pub name: String,
    pub distance: f64,
    pub elevation: f64,
    pub difficulty: Difficulty,
    pub national_park_id: ParkId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_park: Option<NationalParkDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
}

impl From<&Trail> for TrailDto {
    fn from(trail: &Trail) -> Self {
        Self {
            id: trail.id,
            name: trail.name.clone(),
            distance: trail.distance,
            elevation: trail.elevation,
            difficulty: trail.difficulty,
            national_park_id: trail.national_park_id,
            national_park: trail.national_park.as_ref().map(NationalParkDto::from),
            date_created: Some(trail.date_created),
        }
    }
}

impl From<Trail> for TrailDto {
    fn from(trail: Trail) -> Self {
        Self::from(&trail)
    }
}

/// Body of a trail creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TrailCreateDto {
    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom(function = "not_blank", message = "Name is required")
    )]
    pub name: String,

    #[validate(range(min = 0.0, message = "Distance cannot be negative"))]
    pub distance: f64,

    pub elevation: f64,

    pub difficulty: Difficulty,

    #[validate(range(min = 1, message = "A national park is required"))]
    pub national_park_id: ParkId,
}

impl From<TrailCreateDto> for TrailDraft {
    fn from(dto: TrailCreateDto) -> Self {
        Self {
            name: dto.name.trim().to_string(),
            distance: dto.distance,
            elevation: dto.elevation,
            difficulty: dto.difficulty,
            national_park_id: dto.national_park_id,
        }
    }
}

/// Body of a trail update request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TrailUpdateDto {
    pub id: TrailId,

    #[validate(
        length(max = 200, message = "Name must be at most 200 characters"),
        custom(function = "not_blank", message = "Name is required")
    )]
    pub name: String,

    #[validate(range(min = 0.0, message = "Distance cannot be negative"))]
    pub distance: f64,

    pub elevation: f64,

    pub difficulty: Difficulty,

    #[validate(range(min = 1, message = "A national park is required"))]
    pub national_park_id: ParkId,
}

impl From<TrailUpdateDto> for TrailDraft {
    fn from(dto: TrailUpdateDto) -> Self {
        Self {
            name: dto.name.trim().to_string(),
            distance: dto.distance,
            elevation: dto.elevation,
            difficulty: dto.difficulty,
            national_park_id: dto.national_park_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_park() -> NationalPark {
        NationalPark {
            id: 3,
            name: "Zion".to_string(),
            state: "Utah".to_string(),
            created: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            established: Utc.with_ymd_and_hms(1919, 11, 19, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_park_to_dto_copies_every_field() {
        let park = sample_park();
        let dto = NationalParkDto::from(&park);

        assert_eq!(dto.id, 3);
        assert_eq!(dto.name, "Zion");
        assert_eq!(dto.state, "Utah");
        assert_eq!(dto.created, Some(park.created));
        assert_eq!(dto.established, park.established);
    }

    #[test]
    fn test_park_dto_to_draft_trims_names() {
        let dto = NationalParkDto {
            id: 0,
            name: "  Arches ".to_string(),
            state: " Utah".to_string(),
            created: None,
            established: sample_park().established,
        };
        let draft = NationalParkDraft::from(dto);
        assert_eq!(draft.name, "Arches");
        assert_eq!(draft.state, "Utah");
    }

    #[test]
    fn test_trail_dto_embeds_park() {
        let park = sample_park();
        let trail = Trail {
            id: 9,
            name: "Angels Landing".to_string(),
            distance: 8.7,
            elevation: 453.0,
            difficulty: Difficulty::Expert,
            national_park_id: park.id,
            date_created: park.created,
            national_park: Some(park.clone()),
        };

        let dto = TrailDto::from(&trail);
        assert_eq!(dto.national_park_id, 3);
        assert_eq!(dto.national_park.as_ref().map(|p| p.name.as_str()), Some("Zion"));
        assert_eq!(dto.difficulty, Difficulty::Expert);
    }

    #[test]
    fn test_blank_park_name_is_rejected() {
        let dto = NationalParkDto {
            id: 0,
            name: "   ".to_string(),
            state: "Utah".to_string(),
            created: None,
            established: sample_park().established,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_trail_create_validation() {
        let valid = TrailCreateDto {
            name: "Narrows".to_string(),
            distance: 15.0,
            elevation: 100.0,
            difficulty: Difficulty::Moderate,
            national_park_id: 3,
        };
        assert!(valid.validate().is_ok());

        let negative = TrailCreateDto {
            distance: -1.0,
            ..valid.clone()
        };
        assert!(negative.validate().is_err());

        let orphan = TrailCreateDto {
            national_park_id: 0,
            ..valid
        };
        assert!(orphan.validate().is_err());
    }

    #[test]
    fn test_trail_create_dto_deserializes_difficulty_by_name() {
        let dto: TrailCreateDto = serde_json::from_str(
            r#"{"name":"Emerald Pools","distance":1.2,"elevation":21.0,"difficulty":"Easy","national_park_id":3}"#,
        )
        .unwrap();
        assert_eq!(dto.difficulty, Difficulty::Easy);
    }
}
