// src/error.rs

use axum::{
    Json,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (validation failure, malformed quiz, unmet quiz gate)
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden (ownership mismatch on course mutation)
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (duplicate username/email/enrollment/attempt)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a uniform JSON envelope with the appropriate
/// HTTP status code. Internal errors are logged and redacted.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized", msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", msg),
        };
        let body = Json(json!({
            "statusCode": status.as_u16(),
            "error": error,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

/// Axum Middleware: Error Envelope.
///
/// `IntoResponse` runs after the request is gone, so the request-scoped
/// envelope fields are stamped here instead: every JSON error body that
/// carries a `statusCode` gains the `path` and `method` of the request
/// that produced it. Non-error responses and non-envelope bodies (e.g.
/// the bare 401 from the auth middleware) pass through untouched.
pub async fn error_envelope_middleware(req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().to_string();

    let response = next.run(req).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    if let Ok(serde_json::Value::Object(mut envelope)) = serde_json::from_slice(&bytes) {
        if envelope.contains_key("statusCode") {
            envelope.insert("path".to_string(), json!(path));
            envelope.insert("method".to_string(), json!(method));

            if let Ok(enriched) = serde_json::to_vec(&envelope) {
                parts
                    .headers
                    .insert(header::CONTENT_LENGTH, enriched.len().into());
                return Response::from_parts(parts, Body::from(enriched));
            }
        }
    }

    Response::from_parts(parts, Body::from(bytes))
}

/// Converts `sqlx::Error` into the matching `AppError`.
///
/// Database constraint violations are translated by Postgres error code:
/// unique violations (23505) surface as 409 Conflict, foreign-key
/// violations (23503) as 400 Bad Request. Everything else is a 500.
/// Allows using the `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => {
                    return AppError::Conflict(format!(
                        "Resource already exists: {}",
                        db_err.constraint().unwrap_or("unique constraint")
                    ));
                }
                Some("23503") => {
                    return AppError::BadRequest(format!(
                        "Referenced resource does not exist: {}",
                        db_err.constraint().unwrap_or("foreign key constraint")
                    ));
                }
                _ => {}
            }
        }
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
