//! # Caja Console Entry Point
//!
//! Read-only inspector for the payment-method catalog: lists every active
//! composite with its members in persisted order, then the simple methods
//! available to build new composites.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (defaults < caja.toml < CAJA_* environment)
//! 3. Build the HTTP catalog client
//! 4. Fetch the catalog and each composite's components
//!
//! ```text
//! caja-console [path/to/caja.toml]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use caja_catalog::{CatalogApi, CatalogConfig, HttpCatalog};
use caja_console::{init_tracing, split_components, ConsoleError, Notifier, TracingNotifier};
use caja_core::Catalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = CatalogConfig::load(config_path).context("Failed to load console configuration")?;
    info!(base_url = %config.api.base_url, "Configuration loaded");

    let api: Arc<dyn CatalogApi> =
        Arc::new(HttpCatalog::from_config(&config).context("Failed to build catalog client")?);
    let notifier = TracingNotifier;

    let methods = match api.list_methods().await {
        Ok(methods) => methods,
        Err(e) => {
            let err = ConsoleError::from(e);
            notifier.error(&err);
            return Err(err).context("Failed to fetch payment methods");
        }
    };
    let catalog = Catalog::new(methods);
    info!(count = catalog.len(), "Catalog fetched");

    println!("Composite payment methods");
    for composite in catalog.composites("") {
        println!("  [{}] {}", composite.id, composite.name);
        match split_components(api.as_ref(), &catalog, composite.id).await {
            Ok(members) if members.is_empty() => println!("      (no components)"),
            Ok(members) => {
                for (i, member) in members.iter().enumerate() {
                    println!("      {}. [{}] {}", i + 1, member.id, member.name);
                }
            }
            Err(e) => {
                notifier.error(&e);
                println!("      (components unavailable: {})", e.message);
            }
        }
    }

    println!("Simple payment methods");
    for method in catalog.simples("") {
        match method.description.as_deref().filter(|d| !d.is_empty()) {
            Some(description) => println!("  [{}] {} - {}", method.id, method.name, description),
            None => println!("  [{}] {}", method.id, method.name),
        }
    }

    Ok(())
}
