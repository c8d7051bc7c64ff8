use axum::{routing::get, Router};
use crate::state::AppState;
use crate::handlers::stats::statistiche_generali;

pub fn routes() -> Router<AppState> {
    Router::new().route("/statistiche/", get(statistiche_generali))
}
