use axum::{routing::{get, post}, Router};
use crate::state::AppState;
use crate::handlers::hello::{hello_post, hello_world};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hello/", get(hello_world))
        .route("/helloPost/", post(hello_post))
}
