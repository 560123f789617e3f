// HTTP API Error Types
use axum::extract::rejection::JsonRejection;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::manager::DatabaseError;
use crate::database::validation::ValidationError;
use crate::filter::FilterError;
use crate::services::identity::IdentityError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (login-code exchange failed upstream)
    IdentityExchange(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::IdentityExchange(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::IdentityExchange(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::IdentityExchange(_) => "IDENTITY_EXCHANGE_FAILED",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Failure envelope: `{ code, message, data: null, timestamp, error: { type, fields? } }`
    pub fn to_json(&self) -> Value {
        let mut error = json!({ "type": self.error_code() });
        if let ApiError::ValidationError {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            error["fields"] = json!(field_errors);
        }

        json!({
            "code": self.status_code(),
            "message": self.message(),
            "data": Value::Null,
            "timestamp": chrono::Utc::now().timestamp_millis(),
            "error": error
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    /// Validation failure pinned to a single request field
    pub fn field_error(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        ApiError::validation_error(message, Some(field_errors))
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn identity_exchange(message: impl Into<String>) -> Self {
        ApiError::IdentityExchange(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// Generic message unless `expose_detail` opts into appending the cause
    fn internal(generic: &str, detail: impl std::fmt::Display, expose_detail: bool) -> Self {
        if expose_detail {
            ApiError::internal_server_error(format!("{}: {}", generic, detail))
        } else {
            ApiError::internal_server_error(generic)
        }
    }

    /// Storage error mapping; `expose_detail` mirrors `API_EXPOSE_ERROR_DETAIL`
    pub fn from_database(err: DatabaseError, expose_detail: bool) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Conflict(msg) => ApiError::conflict(msg),
            DatabaseError::Validation(e) => e.into(),
            DatabaseError::Filter(e) => e.into(),
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database configuration error: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => match sqlx_err {
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                    tracing::error!("Database connection error: {}", sqlx_err);
                    ApiError::service_unavailable("Database temporarily unavailable")
                }
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    ApiError::conflict("Record already exists")
                }
                _ => {
                    // Log the real error but return generic message
                    tracing::error!("SQLx error: {}", sqlx_err);
                    ApiError::internal("Database error occurred", sqlx_err, expose_detail)
                }
            },
        }
    }
}

// Convert other error types to ApiError
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err.field() {
            Some(field) => ApiError::field_error(field, err.to_string()),
            None => ApiError::validation_error(err.to_string(), None),
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::field_error(err.field(), err.to_string())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::from_database(err, crate::config::CONFIG.api.expose_error_detail)
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotConfigured => {
                tracing::error!("Identity exchange requested but WECHAT_APP_ID/WECHAT_APP_SECRET are unset");
                ApiError::identity_exchange("Login is not available")
            }
            IdentityError::Unavailable(ref detail) => {
                tracing::warn!("Identity service unavailable: {}", detail);
                ApiError::identity_exchange("Login service unavailable, please retry")
            }
            other => ApiError::identity_exchange(format!("Failed to exchange login code: {}", other)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_carry_field_messages() {
        let err: ApiError = ValidationError::MissingField("openId").into();
        assert_eq!(err.status_code(), 400);

        let body = err.to_json();
        assert_eq!(body["code"], 400);
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["error"]["type"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["fields"]["openId"], "openId is required");
        assert!(body["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn storage_errors_map_to_status() {
        let not_found: ApiError = DatabaseError::NotFound("Category not found".into()).into();
        assert_eq!(not_found.status_code(), 404);

        let conflict: ApiError = DatabaseError::Conflict("taken".into()).into();
        assert_eq!(conflict.status_code(), 409);

        let pool: ApiError = DatabaseError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert_eq!(pool.status_code(), 503);

        let internal = ApiError::from_database(DatabaseError::Sqlx(sqlx::Error::RowNotFound), false);
        assert_eq!(internal.status_code(), 500);
        assert_eq!(internal.message(), "Database error occurred");
    }

    #[test]
    fn storage_detail_is_sent_only_when_opted_in() {
        let hidden = ApiError::from_database(DatabaseError::Sqlx(sqlx::Error::RowNotFound), false);
        assert!(!hidden.to_json()["message"].as_str().unwrap().contains("no rows"));

        let exposed = ApiError::from_database(DatabaseError::Sqlx(sqlx::Error::RowNotFound), true);
        assert_eq!(exposed.status_code(), 500);
        assert!(exposed.message().starts_with("Database error occurred: "));
    }

    #[test]
    fn unknown_sort_is_a_field_error() {
        let err: ApiError = FilterError::InvalidSortField("owner".into()).into();
        let body = err.to_json();
        assert_eq!(body["error"]["type"], "VALIDATION_ERROR");
        assert!(body["error"]["fields"]["sort"].is_string());
    }

    #[test]
    fn identity_failures_are_bad_gateway() {
        let err: ApiError = IdentityError::Rejected {
            code: 40163,
            message: "code been used".into(),
        }
        .into();
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.to_json()["error"]["type"], "IDENTITY_EXCHANGE_FAILED");

        let err: ApiError = IdentityError::Unavailable("timeout".into()).into();
        assert_eq!(err.status_code(), 502);
    }
}
