//! # Validation Module
//!
//! Rules a composite definition must satisfy before anything is sent to
//! the catalog.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Save Gate                                          │
//! │                                                                         │
//! │  Operator clicks Save                                                   │
//! │       │                                                                 │
//! │       ├── name blank?            → Required { field: "name" }           │
//! │       ├── fewer than 2 members?  → TooFewComponents                     │
//! │       ├── same id twice?         → DuplicateComponent                   │
//! │       ├── member is COMPOSITE?   → NestedComposite                      │
//! │       │                                                                 │
//! │       └── OK → create/update, then replace components                   │
//! │                                                                         │
//! │  Every check runs before the first request.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{MethodId, MethodKind, PaymentMethod};
use crate::MIN_COMPOSITE_COMPONENTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a composite's display name.
///
/// ```rust
/// use caja_core::validation::validate_composite_name;
///
/// assert!(validate_composite_name("Efectivo + Tarjeta").is_ok());
/// assert!(validate_composite_name("   ").is_err());
/// ```
pub fn validate_composite_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    Ok(())
}

/// Validates that at least [`MIN_COMPOSITE_COMPONENTS`] members are selected.
pub fn validate_component_count(members: &[MethodId]) -> ValidationResult<()> {
    if members.len() < MIN_COMPOSITE_COMPONENTS {
        return Err(ValidationError::TooFewComponents {
            min: MIN_COMPOSITE_COMPONENTS,
            actual: members.len(),
        });
    }

    Ok(())
}

/// Validates that no member id repeats.
pub fn validate_distinct(members: &[MethodId]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(members.len());
    for &id in members {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateComponent { id });
        }
    }

    Ok(())
}

/// Validates that no member is itself a composite.
///
/// `editing` is the composite being saved; listing it as its own member is
/// nesting too. Ids missing from `methods` pass: a stale reference is not
/// fatal here.
pub fn validate_no_nesting(
    members: &[MethodId],
    methods: &[PaymentMethod],
    editing: Option<MethodId>,
) -> ValidationResult<()> {
    for &id in members {
        let found = methods.iter().find(|m| m.id == id);

        if let Some(method) = found {
            if method.kind == MethodKind::Composite || Some(id) == editing {
                return Err(ValidationError::NestedComposite {
                    id,
                    name: method.name.clone(),
                });
            }
        } else if Some(id) == editing {
            return Err(ValidationError::NestedComposite {
                id,
                name: id.to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn method(id: MethodId, kind: MethodKind) -> PaymentMethod {
        PaymentMethod {
            id,
            name: format!("Method {}", id),
            description: None,
            icon: None,
            order: 0,
            kind,
            active: true,
            percentage_adjustment: 0.0,
        }
    }

    #[test]
    fn test_validate_composite_name() {
        assert!(validate_composite_name("Mixto").is_ok());
        assert_eq!(
            validate_composite_name(" \t "),
            Err(ValidationError::Required {
                field: "name".to_string()
            })
        );
    }

    #[test]
    fn test_validate_component_count() {
        assert!(validate_component_count(&[]).is_err());
        assert!(validate_component_count(&[1]).is_err());
        assert!(validate_component_count(&[1, 2]).is_ok());
    }

    #[test]
    fn test_validate_distinct() {
        assert!(validate_distinct(&[1, 2, 3]).is_ok());
        assert_eq!(
            validate_distinct(&[1, 2, 1]),
            Err(ValidationError::DuplicateComponent { id: 1 })
        );
    }

    #[test]
    fn test_validate_no_nesting() {
        let methods = vec![
            method(1, MethodKind::Simple),
            method(2, MethodKind::Simple),
            method(9, MethodKind::Composite),
        ];

        assert!(validate_no_nesting(&[1, 2], &methods, None).is_ok());
        assert!(validate_no_nesting(&[1, 42], &methods, None).is_ok());
        assert!(matches!(
            validate_no_nesting(&[1, 9], &methods, None),
            Err(ValidationError::NestedComposite { id: 9, .. })
        ));
        assert!(matches!(
            validate_no_nesting(&[1, 2], &methods, Some(2)),
            Err(ValidationError::NestedComposite { id: 2, .. })
        ));
    }
}
