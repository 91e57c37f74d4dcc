//! In-process [`CatalogApi`] used by workflow tests and offline demos.
//!
//! Every call is recorded in order, and any operation can be made to fail
//! with a chosen status and server message, or to never answer.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use caja_core::{
    ComponentRow, ComponentsPayload, MethodId, MethodKind, MethodPayload, MethodRef, PaymentMethod,
};

use crate::client::CatalogApi;
use crate::error::{CatalogError, CatalogResult};

/// Operations that can be made to fail or stall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListMethods,
    ListComponents,
    CreateMethod,
    UpdateMethod,
    ReplaceComponents,
}

/// A call as received, with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCall {
    ListMethods,
    ListComponents(MethodId),
    CreateMethod(MethodPayload),
    UpdateMethod(MethodId, MethodPayload),
    ReplaceComponents(MethodId, ComponentsPayload),
}

impl CatalogCall {
    pub fn operation(&self) -> Operation {
        match self {
            CatalogCall::ListMethods => Operation::ListMethods,
            CatalogCall::ListComponents(_) => Operation::ListComponents,
            CatalogCall::CreateMethod(_) => Operation::CreateMethod,
            CatalogCall::UpdateMethod(..) => Operation::UpdateMethod,
            CatalogCall::ReplaceComponents(..) => Operation::ReplaceComponents,
        }
    }
}

#[derive(Debug, Clone)]
struct Failure {
    status: u16,
    message: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    methods: Vec<PaymentMethod>,
    components: HashMap<MethodId, Vec<ComponentRow>>,
    calls: Vec<CatalogCall>,
    failures: HashMap<Operation, Failure>,
    stalled: HashSet<Operation>,
    withhold_created_id: bool,
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: Mutex<Inner>,
}

impl InMemoryCatalog {
    pub fn new(methods: Vec<PaymentMethod>) -> Self {
        InMemoryCatalog {
            inner: Mutex::new(Inner {
                methods,
                ..Inner::default()
            }),
        }
    }

    /// Seeds the persisted component rows of a composite.
    pub async fn set_components(&self, composite_id: MethodId, rows: Vec<ComponentRow>) {
        self.inner.lock().await.components.insert(composite_id, rows);
    }

    /// Makes every later call of `operation` fail until cleared.
    pub async fn fail_on(&self, operation: Operation, status: u16, message: Option<&str>) {
        self.inner.lock().await.failures.insert(
            operation,
            Failure {
                status,
                message: message.map(str::to_string),
            },
        );
    }

    /// Makes every later call of `operation` hang after being recorded.
    pub async fn stall_on(&self, operation: Operation) {
        self.inner.lock().await.stalled.insert(operation);
    }

    /// Clears injected failures and stalls.
    pub async fn clear_failures(&self) {
        let mut inner = self.inner.lock().await;
        inner.failures.clear();
        inner.stalled.clear();
    }

    /// Makes creates succeed without reporting the new id.
    pub async fn withhold_created_ids(&self) {
        self.inner.lock().await.withhold_created_id = true;
    }

    pub async fn calls(&self) -> Vec<CatalogCall> {
        self.inner.lock().await.calls.clone()
    }

    /// Calls other than catalog reads.
    pub async fn mutations(&self) -> Vec<CatalogCall> {
        let reads: HashSet<Operation> = [Operation::ListMethods, Operation::ListComponents]
            .into_iter()
            .collect();
        self.calls()
            .await
            .into_iter()
            .filter(|c| !reads.contains(&c.operation()))
            .collect()
    }

    pub async fn methods(&self) -> Vec<PaymentMethod> {
        self.inner.lock().await.methods.clone()
    }

    pub async fn components_of(&self, composite_id: MethodId) -> Vec<ComponentRow> {
        self.inner
            .lock()
            .await
            .components
            .get(&composite_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Records `call` and hands back the locked state, honouring injected
    /// failures and stalls. A stalled call releases the lock first.
    async fn enter(&self, call: CatalogCall) -> CatalogResult<MutexGuard<'_, Inner>> {
        let mut inner = self.inner.lock().await;
        let stalled = inner.stalled.contains(&call.operation());
        inner.record(call)?;

        if stalled {
            drop(inner);
            return std::future::pending().await;
        }
        Ok(inner)
    }
}

impl Inner {
    /// Records `call`, then returns the injected failure for it, if any.
    fn record(&mut self, call: CatalogCall) -> CatalogResult<()> {
        let operation = call.operation();
        debug!(?operation, "In-memory catalog call");
        self.calls.push(call);

        match self.failures.get(&operation) {
            Some(failure) => Err(CatalogError::Status {
                status: failure.status,
                message: failure.message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> MethodId {
        self.methods.iter().map(|m| m.id).max().unwrap_or(0) + 1
    }
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn list_methods(&self) -> CatalogResult<Vec<PaymentMethod>> {
        let inner = self.enter(CatalogCall::ListMethods).await?;
        Ok(inner.methods.clone())
    }

    async fn list_components(&self, composite_id: MethodId) -> CatalogResult<Vec<ComponentRow>> {
        let inner = self.enter(CatalogCall::ListComponents(composite_id)).await?;

        if !inner.methods.iter().any(|m| m.id == composite_id) {
            return Err(CatalogError::NotFound(composite_id));
        }
        Ok(inner.components.get(&composite_id).cloned().unwrap_or_default())
    }

    async fn create_method(&self, payload: &MethodPayload) -> CatalogResult<MethodId> {
        let mut inner = self.enter(CatalogCall::CreateMethod(payload.clone())).await?;

        let id = inner.next_id();
        inner.methods.push(PaymentMethod {
            id,
            name: payload.name.clone(),
            description: Some(payload.description.clone()).filter(|d| !d.is_empty()),
            icon: Some(payload.icon.clone()).filter(|i| !i.is_empty()),
            order: payload.order,
            kind: payload.kind,
            active: true,
            percentage_adjustment: payload.percentage_adjustment.unwrap_or(0.0),
        });

        if inner.withhold_created_id {
            return Err(CatalogError::MissingId);
        }
        Ok(id)
    }

    async fn update_method(&self, id: MethodId, payload: &MethodPayload) -> CatalogResult<()> {
        let mut inner = self.enter(CatalogCall::UpdateMethod(id, payload.clone())).await?;

        let method = inner
            .methods
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        method.name = payload.name.clone();
        method.description = Some(payload.description.clone()).filter(|d| !d.is_empty());
        method.icon = Some(payload.icon.clone()).filter(|i| !i.is_empty());
        method.order = payload.order;
        method.kind = payload.kind;
        Ok(())
    }

    async fn replace_components(
        &self,
        composite_id: MethodId,
        components: &ComponentsPayload,
    ) -> CatalogResult<()> {
        let mut inner = self
            .enter(CatalogCall::ReplaceComponents(composite_id, components.clone()))
            .await?;

        let is_composite = inner
            .methods
            .iter()
            .any(|m| m.id == composite_id && m.kind == MethodKind::Composite);
        if !is_composite {
            return Err(CatalogError::NotFound(composite_id));
        }

        let rows = components
            .components
            .iter()
            .map(|c| ComponentRow {
                order: Some(i64::from(c.order)),
                member: Some(MethodRef {
                    id: Some(c.member_id),
                }),
                member_id: None,
            })
            .collect();
        inner.components.insert(composite_id, rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caja_core::CompositeComponent;

    fn simple(id: MethodId, name: &str) -> PaymentMethod {
        PaymentMethod {
            id,
            name: name.to_string(),
            description: None,
            icon: None,
            order: 0,
            kind: MethodKind::Simple,
            active: true,
            percentage_adjustment: 0.0,
        }
    }

    fn composite_payload(name: &str) -> MethodPayload {
        MethodPayload {
            name: name.to_string(),
            description: String::new(),
            icon: String::new(),
            order: 0,
            percentage_adjustment: Some(0.0),
            kind: MethodKind::Composite,
        }
    }

    #[tokio::test]
    async fn test_create_then_replace_components() {
        let catalog = InMemoryCatalog::new(vec![simple(1, "Efectivo"), simple(2, "Tarjeta")]);

        let id = catalog.create_method(&composite_payload("Mixto")).await.unwrap();
        assert_eq!(id, 3);

        let components = ComponentsPayload {
            components: vec![
                CompositeComponent {
                    composite_id: id,
                    member_id: 2,
                    order: 1,
                    active: true,
                },
                CompositeComponent {
                    composite_id: id,
                    member_id: 1,
                    order: 2,
                    active: true,
                },
            ],
        };
        catalog.replace_components(id, &components).await.unwrap();

        let rows = catalog.list_components(id).await.unwrap();
        assert_eq!(rows, catalog.components_of(id).await);
        assert_eq!(caja_core::ordered_member_ids(rows), vec![2, 1]);
        assert_eq!(catalog.mutations().await.len(), 2);
        assert_eq!(catalog.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn test_injected_failure_is_recorded() {
        let catalog = InMemoryCatalog::new(vec![simple(1, "Efectivo")]);
        catalog
            .fail_on(Operation::ListMethods, 503, Some("Mantenimiento"))
            .await;

        let err = catalog.list_methods().await.unwrap_err();
        assert_eq!(err.operator_message(), "Mantenimiento");
        assert_eq!(catalog.calls().await, vec![CatalogCall::ListMethods]);

        catalog.clear_failures().await;
        assert_eq!(catalog.list_methods().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stalled_call_is_recorded_and_releases_the_lock() {
        let catalog = InMemoryCatalog::new(vec![simple(1, "Efectivo")]);
        catalog.stall_on(Operation::CreateMethod).await;

        let payload = composite_payload("Mixto");
        tokio::select! {
            biased;
            _ = catalog.create_method(&payload) => panic!("create should hang"),
            _ = tokio::task::yield_now() => {}
        }

        assert_eq!(catalog.methods().await.len(), 1);
        assert_eq!(catalog.mutations().await.len(), 1);

        catalog.clear_failures().await;
        assert_eq!(catalog.create_method(&composite_payload("Mixto")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_unknown_method() {
        let catalog = InMemoryCatalog::default();
        assert!(matches!(
            catalog.update_method(5, &composite_payload("X")).await,
            Err(CatalogError::NotFound(5))
        ));
    }
}
