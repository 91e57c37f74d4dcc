//! # Catalog Error Types
//!
//! Failures talking to the payment-methods API or loading the console's
//! connection settings.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Response            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Transport      │  │  Status                 │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  NotFound               │ │
//! │  │  ConfigLoad/Save│  │                 │  │  Decode, MissingId      │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are retried. The workflow surfaces them to the operator.

use thiserror::Error;

use caja_core::MethodId;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid catalog configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Connection refused, DNS failure, broken body...
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    // =========================================================================
    // Response Errors
    // =========================================================================
    /// Non-success HTTP status. `message` is the server's `mensajeError` or
    /// `message` when the body carried one.
    #[error("API returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Status { status: u16, message: Option<String> },

    #[error("Payment method {0} not found")]
    NotFound(MethodId),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// Create succeeded but the response carried no id.
    #[error("Create response did not include the new payment method id")]
    MissingId,
}

impl CatalogError {
    /// The text shown to the operator.
    ///
    /// A server-provided message wins over the generic description.
    pub fn operator_message(&self) -> String {
        match self {
            CatalogError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status, when the failure came with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Status { status, .. } => Some(*status),
            CatalogError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CatalogError::Timeout
        } else if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for CatalogError {
    fn from(err: url::ParseError) -> Self {
        CatalogError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(err: toml::de::Error) -> Self {
        CatalogError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CatalogError {
    fn from(err: toml::ser::Error) -> Self {
        CatalogError::ConfigSaveFailed(err.to_string())
    }
}
