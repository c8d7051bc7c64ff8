use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::jwt::{verify_token_of_type, TokenType};
use crate::auth::permissions::{self, CatalogModel};
use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// The authenticated user, attached to the request by [`require_auth`].
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user: User,
}

pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let auth_header = match req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok()) {
        Some(h) => h,
        None => return unauthorized("Authentication credentials were not provided."),
    };

    // Expect "Bearer <token>"
    let token = match auth_header.strip_prefix("Bearer ") {
        Some(t) => t.trim(),
        None => return unauthorized("Invalid Authorization format"),
    };

    let claims = match verify_token_of_type(token, TokenType::Access, &state.jwt.secret) {
        Ok(c) => c,
        Err(e) => return e.into_response(),
    };

    let user = match state.store.get_user(claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => return unauthorized("User not found"),
        Err(e) => return e.into_response(),
    };
    if !user.is_active {
        return unauthorized("User is inactive");
    }

    // Attach context
    req.extensions_mut().insert(AuthContext { user });

    next.run(req).await
}

/// Runs after [`require_auth`]; rejects requests the user's model permissions don't cover.
pub async fn require_model_permission(model: CatalogModel, req: Request, next: Next) -> Response {
    let denied = match req.extensions().get::<AuthContext>() {
        None => Some(unauthorized("Authentication credentials were not provided.")),
        Some(auth) => permissions::enforce(&auth.user, req.method(), model)
            .err()
            .map(IntoResponse::into_response),
    };
    if let Some(response) = denied {
        return response;
    }
    next.run(req).await
}

fn unauthorized(msg: &str) -> Response {
    AppError::unauthorized(msg).into_response()
}
