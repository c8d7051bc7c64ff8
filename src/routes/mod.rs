pub mod aziende;
pub mod hello;
pub mod software;
pub mod stats;
pub mod tokens;
pub mod viewsets;

use axum::Router;
use crate::state::AppState;

/// Every `/api` route. The ViewSet routes need the state for their auth layer.
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(hello::routes())
        .merge(tokens::routes())
        .merge(aziende::routes())
        .merge(software::routes())
        .merge(stats::routes())
        .merge(viewsets::routes(state))
}
