//! Trail handlers

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use parky_core::{ParkId, TrailCreateDto, TrailDraft, TrailDto, TrailId, TrailUpdateDto};
use std::sync::Arc;
use validator::Validate;

/// `GET /api/v1/trails`
pub async fn list_trails(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TrailDto>>, AppError> {
    let trails = state.parks.list_trails().await?;
    Ok(Json(trails.into_iter().map(TrailDto::from).collect()))
}

/// `GET /api/v1/trails/:trail_id` (Admin only)
pub async fn get_trail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TrailId>,
) -> Result<Json<TrailDto>, AppError> {
    let trail = state
        .parks
        .get_trail(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trail {id}")))?;

    Ok(Json(trail.into()))
}

/// `GET /api/v1/trails/in-national-park/:national_park_id`
///
/// An unknown park yields an empty list.
pub async fn trails_in_national_park(
    State(state): State<Arc<AppState>>,
    Path(park_id): Path<ParkId>,
) -> Result<Json<Vec<TrailDto>>, AppError> {
    let trails = state.parks.trails_in_national_park(park_id).await?;
    Ok(Json(trails.into_iter().map(TrailDto::from).collect()))
}

/// `POST /api/v1/trails`
pub async fn create_trail(
    State(state): State<Arc<AppState>>,
    Json(dto): Json<TrailCreateDto>,
) -> Result<impl IntoResponse, AppError> {
    dto.validate()?;

    if state.parks.trail_name_exists(&dto.name).await? {
        return Err(AppError::Conflict("Trail Exists!".to_string()));
    }

    let trail = state.parks.create_trail(&TrailDraft::from(dto)).await?;
    tracing::info!(trail_id = trail.id, name = %trail.name, "trail created");

    let location = format!("/api/v1/trails/{}", trail.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TrailDto::from(trail)),
    ))
}

/// `PATCH /api/v1/trails/:trail_id`
pub async fn update_trail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TrailId>,
    Json(dto): Json<TrailUpdateDto>,
) -> Result<StatusCode, AppError> {
    if dto.id != id {
        return Err(AppError::BadRequest(format!(
            "Body id {} does not match trail {id}",
            dto.id
        )));
    }
    dto.validate()?;

    if !state.parks.update_trail(id, &TrailDraft::from(dto)).await? {
        return Err(AppError::NotFound(format!("Trail {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/trails/:trail_id`
pub async fn delete_trail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TrailId>,
) -> Result<StatusCode, AppError> {
    if !state.parks.delete_trail(id).await? {
        return Err(AppError::NotFound(format!("Trail {id}")));
    }

    tracing::info!(trail_id = id, "trail deleted");
    Ok(StatusCode::NO_CONTENT)
}
