//! National park handlers
//!
//! Thin mappings from HTTP onto [`parky_core::ParkRepository`]. Role checks
//! have already happened in the auth middleware.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use parky_core::{NationalParkDraft, NationalParkDto, ParkId};
use std::sync::Arc;
use validator::Validate;

/// `GET /api/v1/nationalparks`
pub async fn list_national_parks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NationalParkDto>>, AppError> {
    let parks = state.parks.list_national_parks().await?;
    Ok(Json(parks.into_iter().map(NationalParkDto::from).collect()))
}

/// `GET /api/v1/nationalparks/:national_park_id`
pub async fn get_national_park(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ParkId>,
) -> Result<Json<NationalParkDto>, AppError> {
    let park = state
        .parks
        .get_national_park(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("National park {id}")))?;

    Ok(Json(park.into()))
}

/// `POST /api/v1/nationalparks`
///
/// `201 Created` with a `Location` header, `409` if the name is taken.
pub async fn create_national_park(
    State(state): State<Arc<AppState>>,
    Json(dto): Json<NationalParkDto>,
) -> Result<impl IntoResponse, AppError> {
    dto.validate()?;

    if state.parks.national_park_name_exists(&dto.name).await? {
        return Err(AppError::Conflict("National Park Exists!".to_string()));
    }

    let park = state
        .parks
        .create_national_park(&NationalParkDraft::from(dto))
        .await?;
    tracing::info!(park_id = park.id, name = %park.name, "national park created");

    let location = format!("/api/v1/nationalparks/{}", park.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(NationalParkDto::from(park)),
    ))
}

/// `PATCH /api/v1/nationalparks/:national_park_id`
///
/// The body's id must match the path.
pub async fn update_national_park(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ParkId>,
    Json(dto): Json<NationalParkDto>,
) -> Result<StatusCode, AppError> {
    if dto.id != id {
        return Err(AppError::BadRequest(format!(
            "Body id {} does not match national park {id}",
            dto.id
        )));
    }
    dto.validate()?;

    if !state
        .parks
        .update_national_park(id, &NationalParkDraft::from(dto))
        .await?
    {
        return Err(AppError::NotFound(format!("National park {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/nationalparks/:national_park_id`
///
/// `409` while trails still belong to the park.
pub async fn delete_national_park(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ParkId>,
) -> Result<StatusCode, AppError> {
    if !state.parks.delete_national_park(id).await? {
        return Err(AppError::NotFound(format!("National park {id}")));
    }

    tracing::info!(park_id = id, "national park deleted");
    Ok(StatusCode::NO_CONTENT)
}
