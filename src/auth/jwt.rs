use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub token_type: TokenType,
    pub exp: usize,
    pub iat: usize,
}

pub fn sign_token(user_id: i64, username: &str, token_type: TokenType, jwt: &JwtConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let ttl = match token_type {
        TokenType::Access => jwt.access_ttl,
        TokenType::Refresh => jwt.refresh_ttl,
    };
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        token_type,
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(jwt.secret.as_bytes()))
        .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))
}

/// Access + refresh pair for a freshly authenticated user.
pub fn issue_pair(user_id: i64, username: &str, jwt: &JwtConfig) -> Result<(String, String), AppError> {
    let access = sign_token(user_id, username, TokenType::Access, jwt)?;
    let refresh = sign_token(user_id, username, TokenType::Refresh, jwt)?;
    Ok((access, refresh))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256)
    )
    .map(|d| d.claims)
    .map_err(|e| AppError::unauthorized(format!("Token is invalid or expired: {e}")))
}

pub fn verify_token_of_type(token: &str, expected: TokenType, secret: &str) -> Result<Claims, AppError> {
    let claims = verify_token(token, secret)?;
    if claims.token_type != expected {
        return Err(AppError::unauthorized("Token has wrong type"));
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn config() -> JwtConfig {
        JwtConfig::new("test-secret")
    }

    #[test]
    fn signed_tokens_round_trip_their_claims() {
        let jwt = config();
        let (access, refresh) = issue_pair(7, "mario", &jwt).unwrap();

        let claims = verify_token_of_type(&access, TokenType::Access, &jwt.secret).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "mario");

        let claims = verify_token_of_type(&refresh, TokenType::Refresh, &jwt.secret).unwrap();
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let jwt = config();
        let refresh = sign_token(1, "mario", TokenType::Refresh, &jwt).unwrap();
        assert!(verify_token_of_type(&refresh, TokenType::Access, &jwt.secret).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_token(1, "mario", TokenType::Access, &config()).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut jwt = config();
        jwt.access_ttl = Duration::minutes(-10);
        let token = sign_token(1, "mario", TokenType::Access, &jwt).unwrap();
        let err = verify_token(&token, &jwt.secret).unwrap_err();
        assert!(err.to_string().starts_with("Token is invalid or expired"));
    }
}
