use axum::extract::OriginalUri;
use axum::http::Method;
use axum::Json;
use chrono::Local;

use crate::dtos::hello::HelloResponse;

// GET /api/hello/
pub async fn hello_world(method: Method, OriginalUri(uri): OriginalUri) -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from PWW API!",
        timestamp: None,
        method: method.to_string(),
        path: uri.path().to_string(),
    })
}

// POST /api/helloPost/
pub async fn hello_post(method: Method, OriginalUri(uri): OriginalUri) -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from POST!",
        timestamp: Some(Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()),
        method: method.to_string(),
        path: uri.path().to_string(),
    })
}
