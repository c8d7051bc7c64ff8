use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use crate::dtos::azienda::{AziendaMinimal, AziendaPayload, AziendaResponse, DeletedResponse};
use crate::dtos::software::{to_responses, AziendaSoftwareResponse};
use crate::dtos::stats::AziendaStatsResponse;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::azienda::{AziendaData, AziendaRecord};
use crate::state::AppState;
use crate::store::SoftwareFilter;

const NOT_FOUND: &str = "Azienda not found";

pub(crate) async fn load_azienda(state: &AppState, id: i64) -> Result<AziendaRecord, AppError> {
    state
        .store
        .get_azienda(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

/// Shared by PUT and PATCH: a partial payload is merged over the stored row before validation.
async fn save_azienda(state: &AppState, id: i64, payload: AziendaPayload, partial: bool) -> Result<AziendaRecord, AppError> {
    let existing = load_azienda(state, id).await?;
    let base = AziendaData::from(&existing.azienda);
    let data = payload.into_data(partial.then_some(&base))?;

    state
        .store
        .update_azienda(id, &data)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

// GET /api/aziende/
#[instrument(skip(state))]
pub async fn list_aziende(State(state): State<AppState>) -> Result<Json<Vec<AziendaResponse>>, AppError> {
    let rows = state.store.list_aziende().await?;
    Ok(Json(rows.into_iter().map(AziendaResponse::from).collect()))
}

// POST /api/aziende/create/
#[instrument(skip(state, payload))]
pub async fn create_azienda(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AziendaPayload>,
) -> Result<(StatusCode, Json<AziendaResponse>), AppError> {
    let data = payload.into_data(None)?;
    let created = state.store.insert_azienda(&data).await?;
    info!(id = created.azienda.id, nome = %created.azienda.nome, "Azienda created");

    Ok((StatusCode::CREATED, Json(AziendaResponse::from(created))))
}

// GET /api/aziende/{id}/
#[instrument(skip(state))]
pub async fn get_azienda(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<AziendaResponse>, AppError> {
    let azienda = load_azienda(&state, id).await?;
    Ok(Json(AziendaResponse::from(azienda)))
}

// PUT /api/aziende/{id}/update/
#[instrument(skip(state, payload))]
pub async fn update_azienda(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<AziendaPayload>,
) -> Result<Json<AziendaResponse>, AppError> {
    let updated = save_azienda(&state, id, payload, false).await?;
    Ok(Json(AziendaResponse::from(updated)))
}

// PATCH /api/aziende/{id}/patch/
#[instrument(skip(state, payload))]
pub async fn patch_azienda(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<AziendaPayload>,
) -> Result<Json<AziendaResponse>, AppError> {
    let updated = save_azienda(&state, id, payload, true).await?;
    Ok(Json(AziendaResponse::from(updated)))
}

// DELETE /api/aziende/{id}/delete/
#[instrument(skip(state))]
pub async fn delete_azienda(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<DeletedResponse>, AppError> {
    let azienda = load_azienda(&state, id).await?;
    if !state.store.delete_azienda(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    info!(id, removed_software = azienda.num_software, "Azienda deleted");

    Ok(Json(DeletedResponse {
        messaggio: format!("Azienda \"{}\" deleted successfully", azienda.azienda.nome),
    }))
}

// DELETE /api/v2/aziende/{id}/
#[instrument(skip(state))]
pub async fn destroy_azienda(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_azienda(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/aziende/{id}/software/
#[instrument(skip(state))]
pub async fn software_per_azienda(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<AziendaSoftwareResponse>, AppError> {
    let azienda = load_azienda(&state, id).await?;
    let filter = SoftwareFilter { azienda_id: Some(id), ..Default::default() };
    let rows = state.store.list_software(&filter).await?;

    Ok(Json(AziendaSoftwareResponse {
        azienda: AziendaMinimal::from(&azienda),
        count: rows.len(),
        software: to_responses(rows),
    }))
}

// GET /api/aziende/{id}/statistiche/
#[instrument(skip(state))]
pub async fn statistiche_azienda(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<AziendaStatsResponse>, AppError> {
    let azienda = load_azienda(&state, id).await?;
    let stats = state.store.catalog_stats(Some(id)).await?;

    Ok(Json(AziendaStatsResponse {
        azienda: azienda.azienda.nome,
        software: stats.into(),
    }))
}
