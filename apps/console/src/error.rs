//! # Console Error Type
//!
//! What the operator sees when a workflow step fails.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError ──► CoreError ───────┐                                 │
//! │                                       ├──► ConsoleError ──► Notifier    │
//! │  reqwest / status ──► CatalogError ───┘    { code, message }            │
//! │                                                                         │
//! │  `message` is the server's `mensajeError` when it sent one.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use caja_catalog::CatalogError;
use caja_core::{CoreError, ValidationError};

/// Result type for workflow operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Serializes as:
/// ```json
/// { "code": "VALIDATION_ERROR", "message": "name is required" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Operator input to correct; nothing was sent.
    ValidationError,

    NotFound,

    /// The API answered with an error status.
    ApiError,

    /// The API could not be reached or timed out.
    Unavailable,

    /// Local configuration is unusable.
    ConfigError,

    /// The workflow was used out of order (e.g. confirm while submitting).
    BusinessLogic,

    /// Raised by the sale flow receiving a split.
    PaymentError,

    Internal,
}

impl ConsoleError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ConsoleError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ConsoleError::new(ErrorCode::ValidationError, message)
    }

    pub fn payment(message: impl Into<String>) -> Self {
        ConsoleError::new(ErrorCode::PaymentError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ConsoleError::new(ErrorCode::Internal, message)
    }

    pub fn is_validation(&self) -> bool {
        self.code == ErrorCode::ValidationError
    }
}

impl From<ValidationError> for ConsoleError {
    fn from(err: ValidationError) -> Self {
        ConsoleError::validation(err.to_string())
    }
}

impl From<CoreError> for ConsoleError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::UnknownMember(_) => ConsoleError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::SplitInFlight | CoreError::SplitClosed => {
                ConsoleError::new(ErrorCode::BusinessLogic, err.to_string())
            }
        }
    }
}

impl From<CatalogError> for ConsoleError {
    fn from(err: CatalogError) -> Self {
        let code = match &err {
            CatalogError::NotFound(_) => ErrorCode::NotFound,
            CatalogError::Status { .. } | CatalogError::Decode(_) | CatalogError::MissingId => {
                ErrorCode::ApiError
            }
            CatalogError::Transport(_) | CatalogError::Timeout => ErrorCode::Unavailable,
            CatalogError::InvalidConfig(_)
            | CatalogError::InvalidUrl(_)
            | CatalogError::ConfigLoadFailed(_)
            | CatalogError::ConfigSaveFailed(_) => ErrorCode::ConfigError,
        };
        ConsoleError::new(code, err.operator_message())
    }
}

impl std::fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ConsoleError {}
