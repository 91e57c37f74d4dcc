//! # Caja Console Library
//!
//! Operator workflows for composite payment methods: the definition editor
//! used in back-office and the split dialog used at checkout.
//!
//! ## Module Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         caja_console                                    │
//! │                                                                         │
//! │  workflow/ ──► CompositeEditor, SplitDialog, split_components()         │
//! │  notify    ──► Notifier trait + Tracing / Recording                     │
//! │  error     ──► ConsoleError { code, message }                           │
//! │                                                                         │
//! │  All API access goes through Arc<dyn caja_catalog::CatalogApi>.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod notify;
pub mod workflow;

pub use error::{ConsoleError, ConsoleResult, ErrorCode};
pub use notify::{
    Notification, NotificationKind, Notifier, RecordingNotifier, TracingNotifier,
};
pub use workflow::{split_components, CompositeEditor, PaymentSplitSink, SplitDialog};

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,caja=debug,reqwest=warn";

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - ERROR: Failed API calls, errors shown to the operator
/// - WARN: Rejected input, ignored configuration
/// - INFO: Saved composites, registered splits
/// - DEBUG: Every workflow step and request id
///
/// Set `RUST_LOG=debug` for verbose output.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
