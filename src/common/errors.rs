use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use std::fmt;

/// Application errors, each mapped to a transport status code
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Validation errors for user input (400 Bad Request)
    ValidationError { field: String, message: String },
    /// Resource not found (404 Not Found)
    NotFound { resource: String, id: String },
    /// Request conflicts with work already in progress (409 Conflict)
    Conflict { resource: String, message: String },
    /// Upstream service errors (502 Bad Gateway)
    ExternalServiceError { service: String, message: String },
    /// Database could not be reached (503 Service Unavailable)
    DatabaseUnavailable { message: String },
    /// Generic application error (500 Internal Server Error)
    InternalError { message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::ExternalServiceError { .. } => StatusCode::BAD_GATEWAY,
            ApiError::DatabaseUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::ExternalServiceError { .. } => "EXTERNAL_SERVICE_ERROR",
            ApiError::DatabaseUnavailable { .. } => "DATABASE_UNAVAILABLE",
            ApiError::InternalError { .. } => "INTERNAL_ERROR",
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "ValidationError",
            ApiError::NotFound { .. } => "NotFound",
            ApiError::Conflict { .. } => "Conflict",
            ApiError::ExternalServiceError { .. } => "ExternalServiceError",
            ApiError::DatabaseUnavailable { .. } => "DatabaseUnavailable",
            ApiError::InternalError { .. } => "InternalError",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation failed for field '{field}': {message}")
            }
            ApiError::NotFound { resource, id } => {
                write!(f, "{resource} with id '{id}' not found")
            }
            ApiError::Conflict { resource, message } => {
                write!(f, "Conflict on {resource}: {message}")
            }
            ApiError::ExternalServiceError { service, message } => {
                write!(f, "External service '{service}' error: {message}")
            }
            ApiError::DatabaseUnavailable { message } => {
                write!(f, "Database unavailable: {message}")
            }
            ApiError::InternalError { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "type": self.kind(),
            }
        }));

        (self.status(), body).into_response()
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(conn_err) => ApiError::DatabaseUnavailable {
                message: conn_err.to_string(),
            },
            DbErr::ConnectionAcquire(acquire_err) => ApiError::DatabaseUnavailable {
                message: acquire_err.to_string(),
            },
            DbErr::RecordNotFound(msg) => ApiError::NotFound {
                resource: "record".to_string(),
                id: msg,
            },
            _ => ApiError::InternalError {
                message: err.to_string(),
            },
        }
    }
}

#[macro_export]
macro_rules! validation_error {
    ($field:expr, $message:expr) => {
        $crate::common::errors::ApiError::ValidationError {
            field: $field.to_string(),
            message: $message.to_string(),
        }
    };
}
