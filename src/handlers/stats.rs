use axum::{extract::State, Json};
use tracing::instrument;

use crate::dtos::stats::GlobalStatsResponse;
use crate::error::AppError;
use crate::state::AppState;

// GET /api/statistiche/
#[instrument(skip(state))]
pub async fn statistiche_generali(State(state): State<AppState>) -> Result<Json<GlobalStatsResponse>, AppError> {
    let stats = state.store.catalog_stats(None).await?;
    let aziende = state.store.count_aziende().await?;

    Ok(Json(GlobalStatsResponse { aziende, software: stats.into() }))
}
