// src/error.rs
use std::collections::BTreeMap;

use axum::extract::path::ErrorKind;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;

/// Field name -> list of messages, the shape validation failures are reported in.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}{}", render_fields(.fields))]
    ValidationError { message: String, fields: FieldErrors },
    #[error("{0}")]
    Internal(String),
}

fn render_fields(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, errors)| format!("; {field}: {}", errors.join(", ")))
        .collect()
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError { message: msg.into(), fields: FieldErrors::new() }
    }

    /// Validation failure tied to a single field.
    pub fn invalid_field(field: &str, msg: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![msg.into()]);
        Self::invalid_fields(fields)
    }

    pub fn invalid_fields(fields: FieldErrors) -> Self {
        AppError::ValidationError { message: "Invalid input".to_string(), fields }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn db(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::DatabaseError(e) => {
                tracing::error!(error = %e, "Database error");
                json!({ "error": "Database error occurred" })
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                json!({ "error": "Internal server error" })
            }
            AppError::Unauthorized(msg) => json!({ "error": msg, "code": "unauthorized" }),
            AppError::ValidationError { message, fields } if fields.is_empty() => {
                json!({ "error": message })
            }
            AppError::ValidationError { message, fields } => {
                json!({ "error": message, "fields": fields })
            }
            AppError::Forbidden(msg) | AppError::NotFound(msg) => json!({ "error": msg }),
        };

        (status, Json(body)).into_response()
    }
}

/// Turns `"<prefix>field: message at line 1 column 9"` into a keyed field error.
/// Anything without a recognisable field path lands under `non_field_errors`.
fn rejection_to_fields(text: &str, prefix: &str) -> AppError {
    let detail = text.strip_prefix(prefix).unwrap_or(text);
    let detail = detail.rsplit_once(" at line ").map_or(detail, |(msg, _)| msg);

    match detail.split_once(": ") {
        Some((path, msg)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            AppError::invalid_field(path, msg)
        }
        _ => AppError::invalid_field(NON_FIELD_ERRORS, detail),
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => rejection_to_fields(
                &e.body_text(),
                "Failed to deserialize the JSON body into the target type: ",
            ),
            other => AppError::invalid_field(NON_FIELD_ERRORS, other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        rejection_to_fields(&rejection.body_text(), "Failed to deserialize query string: ")
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => match e.kind() {
                ErrorKind::ParseErrorAtKey { key, expected_type, .. } => {
                    AppError::invalid_field(key, format!("Expected a value of type {expected_type}."))
                }
                _ => AppError::invalid_field(NON_FIELD_ERRORS, e.body_text()),
            },
            other => AppError::invalid_field(NON_FIELD_ERRORS, other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::internal("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_field_display_lists_the_field() {
        let err = AppError::invalid_field("prezzo", "Ensure this value is greater than or equal to 0.");
        assert_eq!(
            err.to_string(),
            "Invalid input; prezzo: Ensure this value is greater than or equal to 0."
        );
    }

    #[test]
    fn sqlx_errors_convert_into_database_errors() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("database error:"));
    }

    #[test]
    fn body_errors_are_keyed_by_field_path() {
        let err = rejection_to_fields(
            "Failed to deserialize the JSON body into the target type: azienda: invalid type: \
             string \"abc\", expected i64 at line 1 column 17",
            "Failed to deserialize the JSON body into the target type: ",
        );
        assert_eq!(err.to_string(), "Invalid input; azienda: invalid type: string \"abc\", expected i64");
    }

    #[test]
    fn errors_without_a_path_are_non_field_errors() {
        let err = rejection_to_fields("Failed to deserialize query string: expected `,`", "Failed to deserialize query string: ");
        assert_eq!(err.to_string(), "Invalid input; non_field_errors: expected `,`");
    }
}
