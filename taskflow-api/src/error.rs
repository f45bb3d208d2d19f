/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`; every failure converts to [`ApiError`]
/// at the handler boundary and maps onto one of the response envelopes:
///
/// - Validation / bad credentials: 400 `{ "errors": [{ "msg": ... }] }`
/// - Missing/invalid token: 401 `{ "msg": ... }`
/// - Absent or not-owned resource: 404 `{ "msg": ... }`
/// - Anything unexpected: 500 `{ "errors": [{ "msg": "Server error" }] }`
///
/// A 404 for someone else's task is identical to a 404 for a task that
/// never existed, and a failed login never says whether the email or the
/// password was wrong. Internal error details are logged via `tracing`,
/// never sent to the caller. Nothing is retried; each request fails
/// independently.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use taskflow_shared::auth::{jwt::JwtError, password::PasswordError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing input (400), including bad login credentials
    Validation(Vec<ErrorDetail>),

    /// Missing, invalid, or expired token (401)
    Unauthorized(String),

    /// Resource absent or owned by someone else (404)
    NotFound(String),

    /// Persistence failure or unexpected condition (500)
    Internal(String),
}

/// One entry of the 400/500 error envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub msg: String,
}

/// 400/500 envelope: `{ "errors": [...] }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorsBody {
    pub errors: Vec<ErrorDetail>,
}

/// 401/404 envelope: `{ "msg": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct MsgBody {
    pub msg: String,
}

impl ApiError {
    /// Validation error with a single message
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(vec![ErrorDetail { msg: msg.into() }])
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(errors) => write!(f, "Validation failed: {} errors", errors.len()),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(ErrorsBody { errors })).into_response()
            }
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, Json(MsgBody { msg })).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(MsgBody { msg })).into_response()
            }
            ApiError::Internal(msg) => {
                // Log the detail server-side; the caller gets a generic body
                tracing::error!("Internal error: {msg}");

                let body = ErrorsBody {
                    errors: vec![ErrorDetail {
                        msg: "Server error".to_string(),
                    }],
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique-constraint race on signup: two requests with the
                // same email can both pass the pre-check
                if db_err.constraint().is_some_and(|c| c.contains("email")) {
                    return ApiError::validation("User already exists");
                }
                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors: Vec<ErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(_, field_errors)| {
                field_errors.iter().map(|error| ErrorDetail {
                    msg: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::Validation(errors)
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidToken(_) => ApiError::Unauthorized("Token is not valid".to_string()),
            JwtError::CreateError(msg) => ApiError::Internal(format!("Token creation failed: {msg}")),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_envelope() {
        let response = ApiError::validation("Title is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["errors"][0]["msg"], "Title is required");
    }

    #[tokio::test]
    async fn test_unauthorized_envelope() {
        let response = ApiError::Unauthorized("Token expired".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = body_json(response).await;
        assert_eq!(json["msg"], "Token expired");
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = ApiError::NotFound("Task not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["msg"], "Task not found");
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let response =
            ApiError::Internal("connection reset by peer".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["errors"][0]["msg"], "Server error");
        // The detail must not leak
        assert!(!json.to_string().contains("connection reset"));
    }

    #[test]
    fn test_display() {
        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");

        let err = ApiError::Validation(vec![
            ErrorDetail { msg: "a".into() },
            ErrorDetail { msg: "b".into() },
        ]);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }
}
