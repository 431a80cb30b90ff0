//! Relationship manager roster handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{CreateRmRequest, UpdateRmRequest},
    models::{RelationshipManager, RmSummary, RosterSummary},
    startup::AppState,
};

pub async fn list_rms(State(state): State<AppState>) -> Json<Vec<RelationshipManager>> {
    Json(state.store.read().await.relationship_managers().to_vec())
}

/// RMs currently eligible for round-robin assignment.
pub async fn list_active_rms(State(state): State<AppState>) -> Json<Vec<RelationshipManager>> {
    Json(state.store.read().await.active_rms())
}

pub async fn roster_summary(State(state): State<AppState>) -> Json<RosterSummary> {
    Json(state.store.read().await.roster_summary())
}

#[tracing::instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_rm(
    State(state): State<AppState>,
    Json(payload): Json<CreateRmRequest>,
) -> Result<(StatusCode, Json<RelationshipManager>), AppError> {
    payload.validate()?;

    let rm = state.store.write().await.add_rm(payload.into());

    Ok((StatusCode::CREATED, Json(rm)))
}

pub async fn get_rm(
    State(state): State<AppState>,
    Path(rm_id): Path<String>,
) -> Result<Json<RelationshipManager>, AppError> {
    let rm = state.store.read().await.get_rm(&rm_id)?.clone();
    Ok(Json(rm))
}

#[tracing::instrument(skip(state, payload))]
pub async fn update_rm(
    State(state): State<AppState>,
    Path(rm_id): Path<String>,
    Json(payload): Json<UpdateRmRequest>,
) -> Result<Json<RelationshipManager>, AppError> {
    payload.validate()?;

    let rm = state.store.write().await.update_rm(&rm_id, payload.into())?;

    tracing::info!(
        rm_id = %rm.id,
        is_active = rm.is_active,
        is_on_leave = ?rm.is_on_leave,
        "Relationship manager updated"
    );

    Ok(Json(rm))
}

/// Workload view for one RM.
pub async fn rm_summary(
    State(state): State<AppState>,
    Path(rm_id): Path<String>,
) -> Result<Json<RmSummary>, AppError> {
    let summary = state.store.read().await.rm_summary_at(&rm_id, Utc::now())?;
    Ok(Json(summary))
}
