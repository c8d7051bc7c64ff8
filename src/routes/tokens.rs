use axum::{routing::post, Router};
use crate::state::AppState;
use crate::handlers::auth::{obtain_token, refresh_token, verify};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/token/", post(obtain_token))
        .route("/token/refresh/", post(refresh_token))
        .route("/token/verify/", post(verify))
}
