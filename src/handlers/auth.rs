use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::auth::jwt::{issue_pair, sign_token, verify_token, verify_token_of_type, TokenType};
use crate::auth::password::verify_password;
use crate::dtos::auth::{
    AccessTokenResponse, TokenObtainRequest, TokenPairResponse, TokenRefreshRequest, TokenVerifyRequest,
};
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;
use crate::validation::{Validator, BLANK, REQUIRED};

const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

fn required(v: &mut Validator, field: &str, value: Option<String>) -> String {
    match value {
        None => {
            v.error(field, REQUIRED);
            String::new()
        }
        Some(s) if s.trim().is_empty() => {
            v.error(field, BLANK);
            s
        }
        Some(s) => s,
    }
}

// POST /api/token/
#[instrument(skip(state, payload))]
pub async fn obtain_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TokenObtainRequest>,
) -> Result<Json<TokenPairResponse>, AppError> {
    let mut v = Validator::new();
    let username = required(&mut v, "username", payload.username);
    let password = required(&mut v, "password", payload.password);
    v.finish()?;

    let Some(user) = state.store.find_user_by_username(username.trim()).await? else {
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    };
    if !user.is_active || !verify_password(&password, &user.password_hash)? {
        warn!(username = %user.username, "Rejected login");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    }

    let (access, refresh) = issue_pair(user.id, &user.username, &state.jwt)?;
    info!(username = %user.username, "Token pair issued");
    Ok(Json(TokenPairResponse { access, refresh }))
}

// POST /api/token/refresh/
#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TokenRefreshRequest>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let mut v = Validator::new();
    let refresh = required(&mut v, "refresh", payload.refresh);
    v.finish()?;

    let claims = verify_token_of_type(refresh.trim(), TokenType::Refresh, &state.jwt.secret)?;
    let user = state
        .store
        .get_user(claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    let access = sign_token(user.id, &user.username, TokenType::Access, &state.jwt)?;
    Ok(Json(AccessTokenResponse { access }))
}

// POST /api/token/verify/
#[instrument(skip(state, payload))]
pub async fn verify(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TokenVerifyRequest>,
) -> Result<Json<Value>, AppError> {
    let mut v = Validator::new();
    let token = required(&mut v, "token", payload.token);
    v.finish()?;

    verify_token(token.trim(), &state.jwt.secret)?;
    Ok(Json(json!({})))
}
