//! Application error type and its HTTP representation.
//!
//! Every fallible operation in the library returns [`AppError`]. Handlers
//! return it directly and axum turns it into a JSON body of the form:
//!
//! ```json
//! { "error": { "code": "alias_taken", "message": "...", "details": {} } }
//! ```

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Seconds a client should wait before retrying after [`AppError::CodeExhausted`].
const RETRY_AFTER_SECONDS: &str = "1";

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload, also embedded in batch responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Custom alias failed the character-class check.
    #[error("Invalid alias '{alias}': {reason}")]
    InvalidAlias { alias: String, reason: String },

    /// Custom alias is already in use. Never retried.
    #[error("Alias '{alias}' is already taken")]
    AliasTaken { alias: String },

    /// The store rejected an insert because the code already exists.
    #[error("Short code '{code}' already exists")]
    DuplicateKey { code: String },

    /// The allocation loop ran out of attempts. Transient.
    #[error("Failed to allocate a unique short code after {attempts} attempts")]
    CodeExhausted { attempts: u32 },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Gone { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn gone(message: impl Into<String>, details: Value) -> Self {
        Self::Gone {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn invalid_alias(alias: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAlias {
            alias: alias.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for failures a caller may retry unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CodeExhausted { .. } | Self::Internal { .. })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidAlias { .. } => StatusCode::BAD_REQUEST,
            Self::AliasTaken { .. } | Self::DuplicateKey { .. } => StatusCode::CONFLICT,
            Self::CodeExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Gone { .. } => StatusCode::GONE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into its serializable form.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, details) = match self {
            Self::Validation { details, .. } => ("validation_error", details.clone()),
            Self::InvalidAlias { alias, .. } => ("invalid_alias", json!({ "alias": alias })),
            Self::AliasTaken { alias } => ("alias_taken", json!({ "alias": alias })),
            Self::DuplicateKey { code } => ("duplicate_key", json!({ "code": code })),
            Self::CodeExhausted { attempts } => (
                "code_exhausted",
                json!({ "attempts": attempts, "retryable": true }),
            ),
            Self::Unauthorized { .. } => ("unauthorized", json!({})),
            Self::Forbidden { details, .. } => ("forbidden", details.clone()),
            Self::NotFound { details, .. } => ("not_found", details.clone()),
            Self::Gone { details, .. } => ("gone", details.clone()),
            Self::Internal { details, .. } => ("internal_error", details.clone()),
        };

        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, AppError::CodeExhausted { .. }) {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from_static(RETRY_AFTER_SECONDS),
            );
        }
        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::DuplicateKey {
                code: db.constraint().unwrap_or_default().to_string(),
            };
        }

        tracing::error!(error = %e, "Database error");
        AppError::internal("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}
