//!
//! # Error Handling
//!
//! This module defines `AppError`, the single error type shared by the stores,
//! the token and password services, and the HTTP handlers.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers can return
//! it directly and Actix Web renders a JSON body of the form `{"message": "..."}`.
//! Domain outcomes (not found, forbidden, duplicate user, bad credentials, token
//! problems, validation) carry a short client-facing message. Backend failures
//! are logged with their detail and answered with a generic message.

use actix_web::{error::BlockingError, error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use validator::ValidationErrors;

/// Represents all errors that can occur within the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The requested record does not exist (HTTP 404).
    #[error("{0}")]
    NotFound(String),
    /// The caller is authenticated but does not own the resource (HTTP 401).
    #[error("User not authorized")]
    Forbidden,
    /// No usable credential was presented on a protected route (HTTP 401).
    #[error("{0}")]
    Unauthenticated(String),
    /// A username or email is already taken (HTTP 400).
    #[error("User already exists")]
    DuplicateKey,
    /// Login failed. Deliberately does not say whether the email exists (HTTP 400).
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// The token is malformed or its signature does not match (HTTP 401).
    #[error("Invalid token")]
    InvalidToken,
    /// The token signature is valid but its expiry has passed (HTTP 401).
    #[error("Token expired")]
    ExpiredToken,
    /// The request payload is malformed or fails validation (HTTP 400).
    #[error("{0}")]
    Validation(String),
    /// The backing store could not be reached; callers may retry (HTTP 503).
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    /// Any other unexpected failure (HTTP 500).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The message placed in the response body. Backend detail never leaves the process.
    pub fn client_message(&self) -> String {
        match self {
            AppError::StoreUnavailable(_) => "Service temporarily unavailable".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden
            | AppError::Unauthenticated(_)
            | AppError::InvalidToken
            | AppError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AppError::DuplicateKey | AppError::InvalidCredentials | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::StoreUnavailable(detail) | AppError::Internal(detail) = self {
            log::error!("{}", detail);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.client_message()
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`, unique-constraint violations become
/// `DuplicateKey`, and connectivity failures become `StoreUnavailable`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::DuplicateKey,
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => AppError::StoreUnavailable(error.to_string()),
            _ => AppError::Internal(format!("Database error: {}", error)),
        }
    }
}

/// Builds the client message from field names and rule messages only. The
/// rejected values carried in `params` are never rendered.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        let parts: Vec<String> = fields
            .into_iter()
            .map(|(field, errs)| {
                let reasons: Vec<String> = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("invalid {}", e.code),
                    })
                    .collect();
                format!("{}: {}", field, reasons.join(", "))
            })
            .collect();

        if parts.is_empty() {
            AppError::Validation("Invalid input".into())
        } else {
            AppError::Validation(parts.join("; "))
        }
    }
}

/// Signature and format problems are `InvalidToken`; only a past `exp` is `ExpiredToken`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        match error.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
            _ => AppError::InvalidToken,
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("Password hashing failed: {}", error))
    }
}

impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::Internal(format!("Blocking task failed: {}", error))
    }
}
