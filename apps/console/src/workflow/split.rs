//! # Split Dialog Workflow
//!
//! Wraps [`SplitState`] and hands a balanced allocation to the sale flow
//! through a [`PaymentSplitSink`].
//!
//! ```text
//! confirm()
//!   ├── unbalanced ──► Notifier::validation        (sink not called)
//!   └── balanced ──► Submitting ──► sink.register(&allocation)
//!                                     ├── ok  ──► Closed
//!                                     └── err ──► Collecting, amounts kept,
//!                                                 Notifier::error
//! ```
//!
//! Dropping the `confirm` future mid-flight also returns to Collecting.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use caja_core::{
    CoreError, MethodId, Money, SplitAllocation, SplitComponent, SplitPhase, SplitState,
    SplitSummary,
};

use crate::error::{ConsoleError, ConsoleResult};
use crate::notify::Notifier;

/// Keeps the dialog in Submitting until settled. Unsettled on drop means
/// the submission failed.
struct Submission<'a> {
    state: &'a mut SplitState,
    settled: bool,
}

impl<'a> Submission<'a> {
    fn new(state: &'a mut SplitState) -> Self {
        Submission {
            state,
            settled: false,
        }
    }

    fn settle(mut self, success: bool) {
        self.state.finish_confirm(success);
        self.settled = true;
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Split submission abandoned");
            self.state.finish_confirm(false);
        }
    }
}

/// Receives the confirmed allocation (normally the sale/checkout flow).
#[async_trait]
pub trait PaymentSplitSink: Send + Sync {
    async fn register(&self, allocation: &SplitAllocation) -> ConsoleResult<()>;
}

pub struct SplitDialog {
    sink: Arc<dyn PaymentSplitSink>,
    notifier: Arc<dyn Notifier>,
    state: SplitState,
}

impl SplitDialog {
    pub fn new(sink: Arc<dyn PaymentSplitSink>, notifier: Arc<dyn Notifier>) -> Self {
        SplitDialog {
            sink,
            notifier,
            state: SplitState::new(),
        }
    }

    pub fn state(&self) -> &SplitState {
        &self.state
    }

    pub fn phase(&self) -> SplitPhase {
        self.state.phase()
    }

    pub fn open(
        &mut self,
        total: &str,
        composite_name: &str,
        components: Vec<SplitComponent>,
    ) {
        debug!(total, composite_name, components = components.len(), "Opening split dialog");
        self.state.open(total, composite_name, components);
    }

    pub fn replace_components(&mut self, components: Vec<SplitComponent>) {
        self.state.replace_components(components);
    }

    pub fn set_amount(&mut self, member_id: MethodId, raw: &str) -> ConsoleResult<()> {
        self.state.set_amount(member_id, raw).map_err(ConsoleError::from)
    }

    pub fn amount_of(&self, member_id: MethodId) -> Option<Money> {
        self.state.amount_of(member_id)
    }

    pub fn autofill_last(&mut self) {
        self.state.autofill_last();
    }

    pub fn summary(&self) -> SplitSummary {
        self.state.summary()
    }

    pub fn can_confirm(&self) -> bool {
        self.state.can_confirm()
    }

    /// Releases the allocation to the sink once the amounts balance.
    pub async fn confirm(&mut self) -> ConsoleResult<SplitAllocation> {
        let allocation = match self.state.begin_confirm() {
            Ok(allocation) => allocation,
            Err(CoreError::Validation(e)) => {
                warn!(error = %e, "Split rejected");
                self.notifier.validation(&e.to_string());
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let submission = Submission::new(&mut self.state);
        match self.sink.register(&allocation).await {
            Ok(()) => {
                submission.settle(true);
                info!(
                    composite = self.state.composite_name(),
                    legs = allocation.len(),
                    total = %self.state.parsed_total(),
                    "Split registered"
                );
                Ok(allocation)
            }
            Err(e) => {
                submission.settle(false);
                self.notifier.error(&e);
                Err(e)
            }
        }
    }

    pub fn cancel(&mut self) {
        debug!("Split dialog cancelled");
        self.state.cancel();
    }
}
