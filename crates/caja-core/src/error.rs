//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  caja-core errors (this file)                                           │
//! │  ├── CoreError        - State machine misuse, unknown members           │
//! │  └── ValidationError  - Operator input that blocks an operation         │
//! │                                                                         │
//! │  caja-catalog errors (separate crate)                                   │
//! │  └── CatalogError     - REST collaborator failures                      │
//! │                                                                         │
//! │  caja-console errors (app)                                              │
//! │  └── ConsoleError     - What the operator sees (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ConsoleError → Notifier            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation errors are detected before any network call and never reach
//! the catalog.

use thiserror::Error;

use crate::money::Money;
use crate::types::MethodId;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An amount was entered for a method that is not one of the split's
    /// components.
    #[error("Payment method {0} is not a component of this split")]
    UnknownMember(MethodId),

    /// A confirmation is already in flight.
    #[error("Split confirmation already in progress")]
    SplitInFlight,

    /// The split dialog is not open.
    #[error("Split dialog is closed")]
    SplitClosed,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true when the error is operator input to be corrected inline.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Operator input that blocks an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// A composite needs at least `min` components.
    #[error("A composite needs at least {min} components (selected {actual})")]
    TooFewComponents { min: usize, actual: usize },

    /// A composite may only combine simple methods.
    #[error("'{name}' is a composite method and cannot be a component")]
    NestedComposite { id: MethodId, name: String },

    /// The same method appears twice in the component list.
    #[error("Payment method {id} is listed more than once")]
    DuplicateComponent { id: MethodId },

    /// Split amounts do not add up to the total.
    #[error("Split amounts must add up to the total (difference {difference})")]
    Unbalanced { difference: Money },

    /// The entered amounts add up to more than can be represented.
    #[error("Split amounts are too large to add up")]
    AmountOutOfRange,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooFewComponents { min: 2, actual: 1 };
        assert_eq!(
            err.to_string(),
            "A composite needs at least 2 components (selected 1)"
        );

        let err = ValidationError::Unbalanced {
            difference: Money::from_cents(100),
        };
        assert_eq!(
            err.to_string(),
            "Split amounts must add up to the total (difference 1.00)"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::DuplicateComponent { id: 4 }.into();
        assert!(core_err.is_validation());
        assert!(!CoreError::SplitInFlight.is_validation());
    }
}
