//! # caja-core: Pure Business Logic for Composite Payment Methods
//!
//! This crate holds every rule of the composite payment-method workflow as
//! plain data and pure functions. It never talks to the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caja Console Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser front-end (out of scope)                │   │
//! │  │     Composite editor modal ──► Split payment modal              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 caja-console (async workflows)                  │   │
//! │  │     CompositeEditor::save, SplitDialog::confirm, ...            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ caja-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │ catalog │ │ editor  │ │  split  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              caja-catalog (REST collaborator)                   │   │
//! │  │              GET/POST/PUT /medios-pago[/{id}/componentes]        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Payment methods, components and API payload shapes
//! - [`money`] - Integer cents, tolerant operator-text parsing, display
//! - [`error`] - Domain error types
//! - [`validation`] - Composite definition rules
//! - [`catalog`] - Derived, filtered views over the payment-method catalog
//! - [`editor`] - Composite definition editor state machine
//! - [`split`] - Split collection dialog state machine
//!
//! ## Example Usage
//!
//! ```rust
//! use caja_core::money::Money;
//! use caja_core::split::{SplitComponent, SplitState};
//!
//! let mut split = SplitState::new();
//! split.open(
//!     "250,00",
//!     "Cash + Card",
//!     vec![SplitComponent::new(1, "Cash"), SplitComponent::new(2, "Card")],
//! );
//! split.set_amount(1, "100").unwrap();
//! split.autofill_last();
//!
//! assert!(split.is_balanced());
//! assert_eq!(split.amount_of(2), Some(Money::from_cents(15000)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod editor;
pub mod error;
pub mod money;
pub mod split;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use editor::{CompositeForm, Direction, EditorMode, EditorState};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use split::{SplitAllocation, SplitComponent, SplitLine, SplitPhase, SplitState, SplitSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum number of distinct simple methods a composite must combine.
pub const MIN_COMPOSITE_COMPONENTS: usize = 2;

/// Largest difference (in cents) between the sale total and the sum of the
/// split amounts that still counts as balanced.
pub const BALANCE_TOLERANCE_CENTS: i64 = 1;
