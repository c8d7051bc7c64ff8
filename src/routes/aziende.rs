use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use crate::state::AppState;
use crate::handlers::azienda::{
    create_azienda, delete_azienda, get_azienda, list_aziende, patch_azienda, software_per_azienda,
    statistiche_azienda, update_azienda,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/aziende/", get(list_aziende))
        .route("/aziende/create/", post(create_azienda))
        .route("/aziende/{id}/", get(get_azienda))
        .route("/aziende/{id}/update/", put(update_azienda))
        .route("/aziende/{id}/patch/", patch(patch_azienda))
        .route("/aziende/{id}/delete/", delete(delete_azienda))
        .route("/aziende/{id}/software/", get(software_per_azienda))
        .route("/aziende/{id}/statistiche/", get(statistiche_azienda))
}
