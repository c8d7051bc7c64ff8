use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use crate::state::AppState;
use crate::handlers::software::{
    cerca_software, create_software, delete_software, filtra_per_prezzo, get_software, list_software,
    patch_software, software_a_pagamento, software_gratuiti, software_per_produttore, update_software,
};

pub fn routes() -> Router<AppState> {
    // Fixed segments take priority over `{id}`, so the filter routes are never shadowed.
    Router::new()
        .route("/software/", get(list_software))
        .route("/software/create/", post(create_software))
        .route("/software/gratuiti/", get(software_gratuiti))
        .route("/software/pagamento/", get(software_a_pagamento))
        .route("/software/cerca/", get(cerca_software))
        .route("/software/filtra/", get(filtra_per_prezzo))
        .route("/software/produttore/{produttore}/", get(software_per_produttore))
        .route("/software/{id}/", get(get_software))
        .route("/software/{id}/update/", put(update_software))
        .route("/software/{id}/patch/", patch(patch_software))
        .route("/software/{id}/delete/", delete(delete_software))
}
