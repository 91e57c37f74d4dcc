//! # Workflows
//!
//! Async operator workflows over the pure state in `caja-core`.
//!
//! - [`editor`] - Composite definition editor (`CompositeEditor`)
//! - [`split`] - Split collection dialog (`SplitDialog`)

pub mod editor;
pub mod split;

pub use editor::CompositeEditor;
pub use split::{PaymentSplitSink, SplitDialog};

use caja_catalog::CatalogApi;
use caja_core::{ordered_member_ids, Catalog, MethodId, SplitComponent};

use crate::error::ConsoleResult;

/// The ordered members of a composite, ready for [`SplitDialog::open`].
///
/// Members the snapshot does not list as active simple methods are left
/// out.
pub async fn split_components(
    api: &dyn CatalogApi,
    snapshot: &Catalog,
    composite_id: MethodId,
) -> ConsoleResult<Vec<SplitComponent>> {
    let rows = api.list_components(composite_id).await?;
    let ids = ordered_member_ids(rows);

    Ok(snapshot
        .selected_members(&ids)
        .into_iter()
        .map(|m| SplitComponent {
            id: m.id,
            name: m.name.clone(),
            description: m.description.clone(),
        })
        .collect())
}
