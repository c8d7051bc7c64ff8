use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Logs every request line and the status it was answered with.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    tracing::info!("REQUEST: {} {}", method, path);

    let response = next.run(req).await;

    let status = response.status();
    if status.is_server_error() {
        tracing::warn!("RESPONSE: {} for {}", status.as_u16(), path);
    } else {
        tracing::info!("RESPONSE: {} for {}", status.as_u16(), path);
    }
    response
}
