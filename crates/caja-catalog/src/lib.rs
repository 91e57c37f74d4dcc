//! # caja-catalog: Payment-Methods REST Collaborator
//!
//! Everything the console needs from the payment-methods API, behind the
//! [`CatalogApi`] trait.
//!
//! ## Module Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        caja-catalog                                     │
//! │                                                                         │
//! │  ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐             │
//! │  │  client   │  │  memory   │  │  config   │  │   error   │             │
//! │  │           │  │           │  │           │  │           │             │
//! │  │ CatalogApi│  │ InMemory  │  │ TOML+env  │  │ Catalog   │             │
//! │  │ Http impl │  │ Catalog   │  │ settings  │  │ Error     │             │
//! │  └───────────┘  └───────────┘  └───────────┘  └───────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use caja_catalog::{CatalogApi, CatalogConfig, HttpCatalog};
//!
//! let config = CatalogConfig::load(None)?;
//! let catalog = HttpCatalog::from_config(&config)?;
//! let methods = catalog.list_methods().await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod memory;

pub use client::{CatalogApi, HttpCatalog, Session, METHODS_PATH, REQUEST_ID_HEADER};
pub use config::{ApiSettings, CatalogConfig, SessionSettings};
pub use error::{CatalogError, CatalogResult};
pub use memory::{CatalogCall, InMemoryCatalog, Operation};
