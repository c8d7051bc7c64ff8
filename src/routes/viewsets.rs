use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::get,
    Router,
};
use crate::state::AppState;
use crate::auth::permissions::CatalogModel;
use crate::handlers::azienda::{
    create_azienda, destroy_azienda, get_azienda, list_aziende, patch_azienda, update_azienda,
};
use crate::handlers::software::{
    create_software, destroy_software, get_software, list_software_filtered, patch_software,
    update_software,
};
use crate::middleware::auth::{require_auth, require_model_permission};

/// Router-style registrations: one collection route and one detail route per model.
/// Every request needs an access token and the model permission for its method.
pub fn routes(state: &AppState) -> Router<AppState> {
    let aziende = Router::new()
        .route("/v2/aziende/", get(list_aziende).post(create_azienda))
        .route(
            "/v2/aziende/{id}/",
            get(get_azienda).put(update_azienda).patch(patch_azienda).delete(destroy_azienda),
        )
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_model_permission(CatalogModel::Azienda, req, next)
        }));

    let software = Router::new()
        .route("/v2/software/", get(list_software_filtered).post(create_software))
        .route(
            "/v2/software/{id}/",
            get(get_software).put(update_software).patch(patch_software).delete(destroy_software),
        )
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_model_permission(CatalogModel::Software, req, next)
        }));

    aziende
        .merge(software)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}
