//! Catalog table and the lister seam.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tracing::debug;

use kubeanno_core::{ObjectMetadata, ResourceKind};

/// Error type listers report; any backend error can be boxed into it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Boxed future alias for lister results.
pub type ListFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<ObjectMetadata>, BoxError>> + Send + 'a>>;

/// Lists every live object of one kind across all namespaces.
///
/// `C` is the cluster client handle. Production uses `kube::Client`;
/// tests inject an in-memory cluster. Implementations do not retry.
pub trait ResourceLister<C>: Send + Sync {
    fn list<'a>(&'a self, client: &'a C) -> ListFuture<'a>;
}

/// A per-kind list call failed (network, authorization, API server).
#[derive(Debug, Error)]
#[error("failed to list {kind}: {source}")]
pub struct ListError {
    pub kind: ResourceKind,
    #[source]
    pub source: BoxError,
}

/// One registered kind and its lister.
pub struct CatalogEntry<C> {
    kind: ResourceKind,
    lister: Box<dyn ResourceLister<C>>,
}

impl<C> CatalogEntry<C> {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Run the lister, tagging any failure with this entry's kind.
    pub async fn list(&self, client: &C) -> Result<Vec<ObjectMetadata>, ListError> {
        let objects = self.lister.list(client).await.map_err(|source| ListError {
            kind: self.kind,
            source,
        })?;
        debug!(kind = %self.kind, objects = objects.len(), "listed objects");
        Ok(objects)
    }
}

/// Static mapping from kind to lister, iterated in registration order.
pub struct Catalog<C> {
    entries: Vec<CatalogEntry<C>>,
}

impl<C> Default for Catalog<C> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<C> Catalog<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lister for `kind`.
    ///
    /// Re-registering a kind swaps its lister and keeps its position.
    pub fn register<L>(&mut self, kind: ResourceKind, lister: L) -> &mut Self
    where
        L: ResourceLister<C> + 'static,
    {
        let lister: Box<dyn ResourceLister<C>> = Box::new(lister);
        match self.entries.iter_mut().find(|e| e.kind == kind) {
            Some(entry) => entry.lister = lister,
            None => self.entries.push(CatalogEntry { kind, lister }),
        }
        self
    }

    /// Builder-style [`Catalog::register`].
    pub fn with<L>(mut self, kind: ResourceKind, lister: L) -> Self
    where
        L: ResourceLister<C> + 'static,
    {
        self.register(kind, lister);
        self
    }

    pub fn kinds(&self) -> Vec<ResourceKind> {
        self.entries.iter().map(|e| e.kind).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry<C>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
