//! kubeanno-catalog — the table of resource kinds the exporter enumerates.
//!
//! Each registered kind maps to a [`ResourceLister`] that returns every
//! live object of that kind, projected down to [`ObjectMetadata`].
//! Adding a kind means adding one catalog entry; the collection engine
//! never changes.
//!
//! # Architecture
//!
//! ```text
//! Catalog<C>
//!   └── CatalogEntry { kind, lister: Box<dyn ResourceLister<C>> }
//!         └── list(&C) → Vec<ObjectMetadata> | ListError
//!
//! builtin_catalog() → Catalog<kube::Client>   (KubeLister<K> per kind)
//! resolve_client()  → kube::Client            (kubeconfig, then in-cluster)
//! ```
//!
//! [`ObjectMetadata`]: kubeanno_core::ObjectMetadata

pub mod catalog;
pub mod client;
pub mod kube_lister;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use catalog::{BoxError, Catalog, CatalogEntry, ListError, ListFuture, ResourceLister};
pub use client::{ClientError, resolve_client};
pub use kube_lister::{KubeLister, builtin_catalog};
