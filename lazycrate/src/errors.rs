//! # Error Handling
//!
//! Two layers:
//! - [`LazyLoadError`] is what [`lazy_load`](crate::lazy_load) returns: either
//!   the descriptor was rejected, or the store failed.
//! - [`ApiError`] is the HTTP-facing error. It maps validation failures to
//!   422 with the full error list and store failures to 500 with a sanitized
//!   message.
//!
//! ## Philosophy
//!
//! **Never expose internal errors to users**. Database errors are logged
//! server-side with `tracing` but never sent to clients.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lazycrate::{ApiError, lazy_load};
//!
//! async fn people(
//!     State(db): State<DatabaseConnection>,
//!     Json(descriptor): Json<serde_json::Value>,
//! ) -> Result<Json<LazyLoaded<Person>>, ApiError> {
//!     Ok(Json(lazy_load::<Person>(&db, &descriptor).await?))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

use crate::validation::{ValidationError, ValidationErrors};

/// Failure of a lazy load.
#[derive(Debug)]
pub enum LazyLoadError {
    /// The descriptor was rejected; no query was issued.
    Invalid(ValidationErrors),
    /// The store reported an error; passed through unchanged.
    Store(DbErr),
}

impl fmt::Display for LazyLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "{errors}"),
            Self::Store(err) => write!(f, "Store error: {err}"),
        }
    }
}

impl std::error::Error for LazyLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ValidationErrors> for LazyLoadError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

impl From<DbErr> for LazyLoadError {
    fn from(err: DbErr) -> Self {
        Self::Store(err)
    }
}

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - body is not a JSON descriptor
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 422 Unprocessable Entity - descriptor failed validation
    ValidationFailed {
        /// Every validation error, sent to the user
        errors: ValidationErrors,
    },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },
}

impl ApiError {
    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a 422 Validation Failed error
    #[must_use]
    pub fn validation_failed(errors: ValidationErrors) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Create a 500 Internal Server Error from a database error
    ///
    /// The database error details are logged but NOT sent to the user.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message (sanitized)
    fn user_message(&self) -> String {
        match self {
            Self::BadRequest { message } | Self::Database { message, .. } => message.clone(),
            Self::ValidationFailed { errors } => {
                if errors.len() == 1 {
                    errors.errors()[0].message.clone()
                } else {
                    format!("Validation failed: {}", errors.messages().join(", "))
                }
            }
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(
                    error = ?internal,
                    "Database error occurred"
                );
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[serde_with::skip_serializing_none]
#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: String,
    details: Option<&'a [ValidationError]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = match &self {
            Self::ValidationFailed { errors } => ErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errors.errors()),
            },
            _ => ErrorResponse {
                error: self.user_message(),
                details: None,
            },
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// All `DbErr` variants become 500 Internal Server Error
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::database(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation_failed(errors)
    }
}

impl From<LazyLoadError> for ApiError {
    fn from(err: LazyLoadError) -> Self {
        match err {
            LazyLoadError::Invalid(errors) => Self::validation_failed(errors),
            LazyLoadError::Store(err) => Self::database(err),
        }
    }
}
