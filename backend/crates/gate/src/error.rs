//! Gate Error Types
//!
//! Gate-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Gate-specific result type alias
pub type GateResult<T> = Result<T, GateError>;

/// Gate-specific error variants
#[derive(Debug, Error)]
pub enum GateError {
    /// Bad email or password at a portal login
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Transport or permission failure reading a role record
    #[error("Role lookup failed: {0}")]
    RoleLookup(String),

    /// Role record absent for the caller
    #[error("No role record for this account")]
    MissingRoleRecord,

    /// Portal slug not present in the taxonomy
    #[error("Unknown portal: {0}")]
    UnknownPortal(String),

    /// Page not declared by the portal
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Session token malformed, forged, or expired
    #[error("Session not found or expired")]
    SessionInvalid,

    #[error("Invalid uid: {0:?}")]
    InvalidUid(String),

    #[error("Password rejected: {0}")]
    PasswordPolicy(#[from] platform::password::PasswordPolicyError),

    /// Bad startup configuration (taxonomy, seed file, environment)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GateError::InvalidCredentials | GateError::SessionInvalid => ErrorKind::Unauthorized,
            GateError::MissingRoleRecord => ErrorKind::Forbidden,
            GateError::UnknownPortal(_) | GateError::PageNotFound(_) => ErrorKind::NotFound,
            GateError::InvalidUid(_) | GateError::PasswordPolicy(_) => ErrorKind::BadRequest,
            GateError::RoleLookup(_) => ErrorKind::BadGateway,
            GateError::InvalidConfig(_) | GateError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            GateError::InvalidCredentials => err.with_action("Check your email and password"),
            GateError::SessionInvalid => err.with_action("Please sign in again"),
            // Store details stay in the logs
            GateError::RoleLookup(_) => AppError::new(self.kind(), "Upstream store error"),
            GateError::InvalidConfig(_) | GateError::Internal(_) => {
                AppError::internal("Internal error")
            }
            _ => err,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            GateError::Internal(msg) | GateError::InvalidConfig(msg) => {
                tracing::error!(message = %msg, "Gate internal error");
            }
            GateError::RoleLookup(msg) => {
                tracing::warn!(message = %msg, "Role lookup failed");
            }
            GateError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Gate error");
            }
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
