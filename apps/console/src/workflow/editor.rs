//! # Composite Editor Workflow
//!
//! Drives [`EditorState`] against the catalog API.
//!
//! ## Save Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  save()                                                                 │
//! │    │                                                                    │
//! │    ├── validate_against(snapshot) ── fail ──► Notifier::validation      │
//! │    │                                          (no request sent)         │
//! │    ▼                                                                    │
//! │  saving = true                                                          │
//! │    │                                                                    │
//! │    ├── New:  POST /medios-pago              ──► new id                  │
//! │    ├── Edit: PUT  /medios-pago/{id}                                     │
//! │    ├── PUT /medios-pago/{id}/componentes    (orden 1..n)                │
//! │    ├── GET /medios-pago                     (fresh snapshot)            │
//! │    │                                                                    │
//! │    ├── ok  ──► Notifier::success, start_new()                           │
//! │    └── err ──► Notifier::error, state kept for retry                    │
//! │                                                                         │
//! │  saving = false     (also when the save future is dropped)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Steps run one after another. A failure after the create leaves the new
//! composite in the catalog without components; saving again from the
//! refreshed list repairs it.

use std::ops::Deref;
use std::sync::Arc;

use tracing::{debug, info, warn};

use caja_catalog::CatalogApi;
use caja_core::{
    Catalog, CompositeForm, Direction, EditorMode, EditorState, MethodId, PaymentMethod,
};

use crate::error::{ConsoleError, ConsoleResult};
use crate::notify::Notifier;

pub const SAVED_MESSAGE: &str = "Composite payment method saved";

/// Holds `EditorState::saving` up for as long as it lives.
struct SavingFlag<'a>(&'a mut EditorState);

impl<'a> SavingFlag<'a> {
    fn raise(state: &'a mut EditorState) -> Self {
        state.saving = true;
        SavingFlag(state)
    }
}

impl Deref for SavingFlag<'_> {
    type Target = EditorState;

    fn deref(&self) -> &EditorState {
        self.0
    }
}

impl Drop for SavingFlag<'_> {
    fn drop(&mut self) {
        self.0.saving = false;
    }
}

pub struct CompositeEditor {
    api: Arc<dyn CatalogApi>,
    notifier: Arc<dyn Notifier>,
    state: EditorState,
    snapshot: Catalog,
}

impl CompositeEditor {
    pub fn new(api: Arc<dyn CatalogApi>, notifier: Arc<dyn Notifier>) -> Self {
        CompositeEditor {
            api,
            notifier,
            state: EditorState::new(),
            snapshot: Catalog::default(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.snapshot
    }

    pub fn form_mut(&mut self) -> &mut CompositeForm {
        &mut self.state.form
    }

    pub fn set_composite_query(&mut self, query: impl Into<String>) {
        self.state.composite_query = query.into();
    }

    pub fn set_simple_query(&mut self, query: impl Into<String>) {
        self.state.simple_query = query.into();
    }

    /// Left pane: active composites matching the composite query.
    pub fn composites(&self) -> Vec<&PaymentMethod> {
        self.snapshot.composites(&self.state.composite_query)
    }

    /// Checklist: active simple methods matching the simple query.
    pub fn simples(&self) -> Vec<&PaymentMethod> {
        self.snapshot.simples(&self.state.simple_query)
    }

    /// Ordered member list, minus ids the catalog no longer lists.
    pub fn selected_members(&self) -> Vec<&PaymentMethod> {
        self.snapshot.selected_members(&self.state.members)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Resets to New mode and fetches the catalog.
    pub async fn open(&mut self) -> ConsoleResult<()> {
        debug!("Opening composite editor");
        self.state.start_new();
        self.refresh().await
    }

    /// Replaces the snapshot with a fresh `GET /medios-pago`.
    pub async fn refresh(&mut self) -> ConsoleResult<()> {
        match self.api.list_methods().await {
            Ok(methods) => {
                self.snapshot = Catalog::new(methods);
                debug!(count = self.snapshot.len(), "Catalog snapshot refreshed");
                Ok(())
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    pub fn start_new(&mut self) {
        self.state.start_new();
    }

    /// Discards all editor state.
    pub fn close(&mut self) {
        debug!("Closing composite editor");
        self.state.start_new();
    }

    /// Selects `method` for editing and loads its persisted components.
    ///
    /// On failure the selection stays and the member list stays empty.
    pub async fn load_composite(&mut self, method: PaymentMethod) -> ConsoleResult<()> {
        let id = method.id;
        debug!(id, "Loading composite");
        self.state.begin_edit(method);

        match self.api.list_components(id).await {
            Ok(rows) => {
                self.state.set_members_from_rows(rows);
                debug!(id, members = ?self.state.members, "Composite components loaded");
                Ok(())
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    // =========================================================================
    // Member List
    // =========================================================================

    pub fn toggle_member(&mut self, id: MethodId) {
        self.state.toggle_member(id);
    }

    pub fn remove_member(&mut self, id: MethodId) {
        self.state.remove_member(id);
    }

    pub fn move_member(&mut self, id: MethodId, direction: Direction) {
        self.state.move_member(id, direction);
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Validates, then persists the composite and its ordered members.
    ///
    /// Returns the composite id on success.
    pub async fn save(&mut self) -> ConsoleResult<MethodId> {
        if let Err(e) = self.state.validate_against(&self.snapshot) {
            warn!(error = %e, "Composite rejected before save");
            self.notifier.validation(&e.to_string());
            return Err(e.into());
        }

        let flag = SavingFlag::raise(&mut self.state);
        let result = persist(self.api.as_ref(), &flag).await;
        drop(flag);

        match result {
            Ok((id, methods)) => {
                self.snapshot = Catalog::new(methods);
                info!(id, "Composite saved");
                self.notifier.success(SAVED_MESSAGE);
                self.state.start_new();
                Ok(id)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    fn report(&self, error: ConsoleError) -> ConsoleError {
        self.notifier.error(&error);
        error
    }
}

/// Writes the composite and its members, then re-reads the catalog.
///
/// Returns the composite id and the fresh method list.
async fn persist(
    api: &dyn CatalogApi,
    state: &EditorState,
) -> ConsoleResult<(MethodId, Vec<PaymentMethod>)> {
    let payload = state.composite_payload();

    let id = match (state.mode, state.target_id()) {
        (EditorMode::Edit, Some(id)) => {
            api.update_method(id, &payload).await?;
            id
        }
        _ => api.create_method(&payload).await?,
    };

    let components = state.component_set(id);
    api.replace_components(id, &components).await?;

    let methods = api.list_methods().await?;
    Ok((id, methods))
}

// =============================================================================
// Unit Tests
// =============================================================================
