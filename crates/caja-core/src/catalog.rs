//! # Catalog Views
//!
//! Derived, filtered views over a snapshot of the payment-method catalog.
//!
//! The catalog itself belongs to the API. A [`Catalog`] is just the last
//! list fetched; views are recomputed from it on every call and nothing is
//! patched locally. After a mutation the caller fetches a fresh list.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /medios-pago ──► Catalog ──┬──► composites(query)                  │
//! │                                 ├──► simples(query)                     │
//! │                                 └──► selected_members(ids)              │
//! │                                                                         │
//! │  composites / simples:                                                  │
//! │    active only → kind filter → stable sort by `order`                   │
//! │    → case-insensitive substring of "name description"                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{MethodId, PaymentMethod};

/// A snapshot of `GET /medios-pago`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    methods: Vec<PaymentMethod>,
}

impl Catalog {
    pub fn new(methods: Vec<PaymentMethod>) -> Self {
        Catalog { methods }
    }

    /// All methods, in the order the API returned them.
    pub fn methods(&self) -> &[PaymentMethod] {
        &self.methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Looks up any method (active or not, any kind) by id.
    pub fn find(&self, id: MethodId) -> Option<&PaymentMethod> {
        self.methods.iter().find(|m| m.id == id)
    }

    /// Active composite methods matching `query`, sorted by `order`.
    pub fn composites(&self, query: &str) -> Vec<&PaymentMethod> {
        self.view(query, PaymentMethod::is_active_composite)
    }

    /// Active simple methods matching `query`, sorted by `order`.
    pub fn simples(&self, query: &str) -> Vec<&PaymentMethod> {
        self.view(query, PaymentMethod::is_active_simple)
    }

    /// Maps the editor's ordered member ids to simple-method records.
    ///
    /// Ids that are not (or no longer) active simple methods are left out of
    /// the view. The id list itself is not touched.
    pub fn selected_members(&self, ids: &[MethodId]) -> Vec<&PaymentMethod> {
        let simples = self.simples("");
        ids.iter()
            .filter_map(|id| simples.iter().find(|m| m.id == *id).copied())
            .collect()
    }

    fn view(&self, query: &str, keep: fn(&PaymentMethod) -> bool) -> Vec<&PaymentMethod> {
        let needle = query.trim().to_lowercase();

        let mut view: Vec<&PaymentMethod> = self.methods.iter().filter(|m| keep(m)).collect();
        view.sort_by_key(|m| m.order);

        if needle.is_empty() {
            return view;
        }
        view.into_iter()
            .filter(|m| m.search_text().to_lowercase().contains(&needle))
            .collect()
    }
}

impl From<Vec<PaymentMethod>> for Catalog {
    fn from(methods: Vec<PaymentMethod>) -> Self {
        Catalog::new(methods)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
