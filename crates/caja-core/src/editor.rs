//! # Composite Definition Editor
//!
//! Pure state of the editor where an administrator creates or modifies a
//! composite method and chooses its ordered simple members.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Editor State Machine                              │
//! │                                                                         │
//! │            start_new / close / save ok                                  │
//! │         ┌──────────────────────────────┐                                │
//! │         ▼                              │                                │
//! │      ┌─────┐   begin_edit(m)   ┌──────┴─┐                               │
//! │      │ New │ ─────────────────►│  Edit  │◄──┐ begin_edit(other)         │
//! │      └─────┘                   └────────┘───┘                           │
//! │                                                                         │
//! │  In either mode: toggle_member / remove_member / move_member            │
//! │  mutate `members`, the ordered list persisted as 1-based `orden`.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Network calls live in the console's `CompositeEditor`; this type only
//! decides what to send.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::types::{
    ordered_member_ids, ComponentRow, ComponentsPayload, CompositeComponent, MethodId,
    MethodKind, MethodPayload, PaymentMethod,
};
use crate::validation::{
    validate_component_count, validate_composite_name, validate_distinct, validate_no_nesting,
    ValidationResult,
};

/// Whether the editor creates a new composite or modifies the selected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum EditorMode {
    #[default]
    New,
    Edit,
}

/// Direction for [`EditorState::move_member`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Direction {
    Up,
    Down,
}

/// Editable fields of the composite itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompositeForm {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub order: i64,
}

impl CompositeForm {
    /// Seeds the form from an existing method.
    pub fn from_method(method: &PaymentMethod) -> Self {
        CompositeForm {
            name: method.name.clone(),
            description: method.description.clone().unwrap_or_default(),
            icon: method.icon.clone().unwrap_or_default(),
            order: method.order,
        }
    }
}

/// State of the composite definition editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EditorState {
    pub mode: EditorMode,

    /// Composite being edited. `None` in New mode.
    pub selected: Option<PaymentMethod>,

    pub composite_query: String,
    pub simple_query: String,

    pub form: CompositeForm,

    /// Ordered member ids. Order here is the order persisted.
    pub members: Vec<MethodId>,

    /// True while a save is in flight.
    pub saving: bool,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to New mode with an empty form and no members.
    pub fn start_new(&mut self) {
        *self = EditorState::default();
    }

    /// Enters Edit mode for `method` and seeds the form from it.
    ///
    /// Members are cleared until the persisted components arrive through
    /// [`EditorState::set_members_from_rows`].
    pub fn begin_edit(&mut self, method: PaymentMethod) {
        self.mode = EditorMode::Edit;
        self.form = CompositeForm::from_method(&method);
        self.selected = Some(method);
        self.members.clear();
    }

    /// Replaces the member list with persisted rows, sorted by `orden`.
    pub fn set_members_from_rows(&mut self, rows: Vec<ComponentRow>) {
        self.members = ordered_member_ids(rows);
    }

    pub fn is_selected(&self, id: MethodId) -> bool {
        self.selected.as_ref().map(|m| m.id) == Some(id)
    }

    pub fn is_member(&self, id: MethodId) -> bool {
        self.members.contains(&id)
    }

    /// Removes `id` if present, otherwise appends it.
    pub fn toggle_member(&mut self, id: MethodId) {
        if self.is_member(id) {
            self.remove_member(id);
        } else {
            self.members.push(id);
        }
    }

    pub fn remove_member(&mut self, id: MethodId) {
        self.members.retain(|m| *m != id);
    }

    /// Swaps `id` with its neighbour. No-op when absent or at the boundary.
    pub fn move_member(&mut self, id: MethodId, direction: Direction) {
        let Some(idx) = self.members.iter().position(|m| *m == id) else {
            return;
        };

        match direction {
            Direction::Up if idx > 0 => self.members.swap(idx, idx - 1),
            Direction::Down if idx + 1 < self.members.len() => self.members.swap(idx, idx + 1),
            _ => {}
        }
    }

    /// Name and member count checks.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_composite_name(&self.form.name)?;
        validate_component_count(&self.members)?;
        Ok(())
    }

    /// [`EditorState::validate`] plus duplicate and nesting checks against
    /// the current catalog snapshot.
    pub fn validate_against(&self, catalog: &Catalog) -> ValidationResult<()> {
        self.validate()?;
        validate_distinct(&self.members)?;
        validate_no_nesting(&self.members, catalog.methods(), self.target_id())?;
        Ok(())
    }

    /// Id of the composite being edited, if any.
    pub fn target_id(&self) -> Option<MethodId> {
        match self.mode {
            EditorMode::Edit => self.selected.as_ref().map(|m| m.id),
            EditorMode::New => None,
        }
    }

    /// Body for the create/update request. The adjustment is only sent on
    /// create.
    pub fn composite_payload(&self) -> MethodPayload {
        MethodPayload {
            name: self.form.name.trim().to_string(),
            description: self.form.description.clone(),
            icon: self.form.icon.clone(),
            order: self.form.order,
            percentage_adjustment: match self.mode {
                EditorMode::New => Some(0.0),
                EditorMode::Edit => None,
            },
            kind: MethodKind::Composite,
        }
    }

    /// The complete component set for `composite_id`, `orden` 1..=n.
    pub fn component_set(&self, composite_id: MethodId) -> ComponentsPayload {
        ComponentsPayload {
            components: self
                .members
                .iter()
                .enumerate()
                .map(|(i, &member_id)| CompositeComponent {
                    composite_id,
                    member_id,
                    order: (i + 1) as u32,
                    active: true,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
