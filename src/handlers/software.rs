use std::str::FromStr;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::dtos::azienda::DeletedResponse;
use crate::dtos::software::{
    to_responses, PriceRangeQuery, PriceRangeResponse, ProducerResponse, SearchQuery, SearchResponse,
    SoftwareListQuery, SoftwareListResponse, SoftwarePayload, SoftwareResponse,
};
use crate::error::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::software::{SoftwareData, SoftwareRecord};
use crate::state::AppState;
use crate::store::SoftwareFilter;
use crate::validation::Validator;

const NOT_FOUND: &str = "Software not found";

async fn load_software(state: &AppState, id: i64) -> Result<SoftwareRecord, AppError> {
    state
        .store
        .get_software(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

async fn save_software(state: &AppState, id: i64, payload: SoftwarePayload, partial: bool) -> Result<SoftwareRecord, AppError> {
    let existing = load_software(state, id).await?;
    let base = SoftwareData::from(&existing.software);
    let data = payload.into_data(partial.then_some(&base))?;

    state
        .store
        .update_software(id, &data)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

async fn filtered(state: &AppState, filter: SoftwareFilter) -> Result<Vec<SoftwareRecord>, AppError> {
    state.store.list_software(&filter).await
}

// GET /api/software/
#[instrument(skip(state))]
pub async fn list_software(State(state): State<AppState>) -> Result<Json<Vec<SoftwareResponse>>, AppError> {
    let rows = filtered(&state, SoftwareFilter::default()).await?;
    Ok(Json(to_responses(rows)))
}

// GET /api/v2/software/?gratuito=&attivo=&azienda=&search=
#[instrument(skip(state))]
pub async fn list_software_filtered(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SoftwareListQuery>,
) -> Result<Json<Vec<SoftwareResponse>>, AppError> {
    let filter = SoftwareFilter {
        azienda_id: query.azienda,
        gratuito: query.gratuito,
        attivo: query.attivo,
        search: query.search.filter(|s| !s.trim().is_empty()).map(|s| s.trim().to_string()),
        ..Default::default()
    };
    let rows = filtered(&state, filter).await?;
    Ok(Json(to_responses(rows)))
}

// POST /api/software/create/
#[instrument(skip(state, payload))]
pub async fn create_software(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SoftwarePayload>,
) -> Result<(StatusCode, Json<SoftwareResponse>), AppError> {
    let data = payload.into_data(None)?;
    let created = state.store.insert_software(&data).await?;
    info!(id = created.software.id, nome = %created.software.nome, "Software created");

    Ok((StatusCode::CREATED, Json(SoftwareResponse::from(created))))
}

// GET /api/software/{id}/
#[instrument(skip(state))]
pub async fn get_software(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<SoftwareResponse>, AppError> {
    let software = load_software(&state, id).await?;
    Ok(Json(SoftwareResponse::from(software)))
}

// PUT /api/software/{id}/update/
#[instrument(skip(state, payload))]
pub async fn update_software(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<SoftwarePayload>,
) -> Result<Json<SoftwareResponse>, AppError> {
    let updated = save_software(&state, id, payload, false).await?;
    Ok(Json(SoftwareResponse::from(updated)))
}

// PATCH /api/software/{id}/patch/
#[instrument(skip(state, payload))]
pub async fn patch_software(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<SoftwarePayload>,
) -> Result<Json<SoftwareResponse>, AppError> {
    let updated = save_software(&state, id, payload, true).await?;
    Ok(Json(SoftwareResponse::from(updated)))
}

// DELETE /api/software/{id}/delete/
#[instrument(skip(state))]
pub async fn delete_software(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<DeletedResponse>, AppError> {
    let software = load_software(&state, id).await?;
    if !state.store.delete_software(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    info!(id, "Software deleted");

    Ok(Json(DeletedResponse {
        messaggio: format!("Software \"{}\" deleted successfully", software.software.nome),
    }))
}

// DELETE /api/v2/software/{id}/
#[instrument(skip(state))]
pub async fn destroy_software(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_software(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/software/gratuiti/
#[instrument(skip(state))]
pub async fn software_gratuiti(State(state): State<AppState>) -> Result<Json<SoftwareListResponse>, AppError> {
    let rows = filtered(&state, SoftwareFilter { gratuito: Some(true), ..Default::default() }).await?;
    Ok(Json(rows.into()))
}

// GET /api/software/pagamento/
#[instrument(skip(state))]
pub async fn software_a_pagamento(State(state): State<AppState>) -> Result<Json<SoftwareListResponse>, AppError> {
    let rows = filtered(&state, SoftwareFilter { gratuito: Some(false), ..Default::default() }).await?;
    Ok(Json(rows.into()))
}

// GET /api/software/cerca/?q=
#[instrument(skip(state))]
pub async fn cerca_software(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let q = query.q.map(|q| q.trim().to_string()).unwrap_or_default();
    if q.is_empty() {
        return Err(AppError::invalid_field("q", "Search parameter 'q' is required."));
    }

    let rows = filtered(&state, SoftwareFilter { search: Some(q.clone()), ..Default::default() }).await?;
    Ok(Json(SearchResponse { query: q, count: rows.len(), software: to_responses(rows) }))
}

fn parse_bound(v: &mut Validator, field: &str, raw: Option<String>) -> Option<Decimal> {
    let raw = raw.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())?;
    match Decimal::from_str(&raw) {
        Ok(d) => Some(d),
        Err(_) => {
            v.error(field, "A valid number is required.");
            None
        }
    }
}

// GET /api/software/filtra/?prezzo_min=&prezzo_max=
#[instrument(skip(state))]
pub async fn filtra_per_prezzo(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PriceRangeQuery>,
) -> Result<Json<PriceRangeResponse>, AppError> {
    let mut v = Validator::new();
    let prezzo_min = parse_bound(&mut v, "prezzo_min", query.prezzo_min);
    let prezzo_max = parse_bound(&mut v, "prezzo_max", query.prezzo_max);
    if let (Some(min), Some(max)) = (prezzo_min, prezzo_max) {
        if min > max {
            v.error("non_field_errors", "prezzo_min must not be greater than prezzo_max.");
        }
    }
    v.finish()?;

    let filter = SoftwareFilter { prezzo_min, prezzo_max, ..Default::default() };
    let rows = filtered(&state, filter).await?;
    Ok(Json(PriceRangeResponse {
        prezzo_min,
        prezzo_max,
        count: rows.len(),
        software: to_responses(rows),
    }))
}

// GET /api/software/produttore/{nome}/
#[instrument(skip(state))]
pub async fn software_per_produttore(
    State(state): State<AppState>,
    AppPath(produttore): AppPath<String>,
) -> Result<Json<ProducerResponse>, AppError> {
    let filter = SoftwareFilter { produttore: Some(produttore.clone()), ..Default::default() };
    let rows = filtered(&state, filter).await?;
    if rows.is_empty() {
        return Err(AppError::not_found(format!("No software found for producer \"{produttore}\"")));
    }

    Ok(Json(ProducerResponse { produttore, count: rows.len(), software: to_responses(rows) }))
}
