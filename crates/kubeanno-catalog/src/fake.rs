//! In-memory cluster for tests.
//!
//! [`FakeCluster`] stands in for `kube::Client`: each kind is seeded with
//! either a list of objects, a failure, or a call that never completes.
//! Every list call is recorded so tests can assert which kinds were hit.

use std::collections::HashMap;
use std::sync::Mutex;

use kubeanno_core::{ObjectMetadata, ResourceKind};

use crate::catalog::{BoxError, Catalog, ListFuture, ResourceLister};

#[derive(Debug, Clone)]
pub enum FakeResponse {
    Objects(Vec<ObjectMetadata>),
    Fail(String),
    /// The list call never returns; only a deadline gets past it.
    Hang,
}

#[derive(Debug, Default)]
pub struct FakeCluster {
    responses: Mutex<HashMap<ResourceKind, FakeResponse>>,
    calls: Mutex<Vec<ResourceKind>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, kind: ResourceKind, response: FakeResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(kind, response);
    }

    pub fn set_objects(&self, kind: ResourceKind, objects: Vec<ObjectMetadata>) {
        self.set(kind, FakeResponse::Objects(objects));
    }

    pub fn fail(&self, kind: ResourceKind, message: &str) {
        self.set(kind, FakeResponse::Fail(message.to_string()));
    }

    pub fn hang(&self, kind: ResourceKind) {
        self.set(kind, FakeResponse::Hang);
    }

    /// Kinds listed so far, in call order.
    pub fn calls(&self) -> Vec<ResourceKind> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, kind: ResourceKind) -> FakeResponse {
        self.calls.lock().unwrap().push(kind);
        self.responses
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or(FakeResponse::Objects(Vec::new()))
    }
}

/// Lister that reads one kind out of a [`FakeCluster`].
pub struct FakeLister {
    kind: ResourceKind,
}

impl FakeLister {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }
}

impl ResourceLister<FakeCluster> for FakeLister {
    fn list<'a>(&'a self, client: &'a FakeCluster) -> ListFuture<'a> {
        let response = client.respond(self.kind);
        Box::pin(async move {
            match response {
                FakeResponse::Objects(objects) => Ok(objects),
                FakeResponse::Fail(message) => Err(BoxError::from(message)),
                FakeResponse::Hang => std::future::pending().await,
            }
        })
    }
}

/// Catalog over a [`FakeCluster`] with one [`FakeLister`] per kind.
pub fn fake_catalog(kinds: &[ResourceKind]) -> Catalog<FakeCluster> {
    let mut catalog = Catalog::new();
    for kind in kinds {
        catalog.register(*kind, FakeLister::new(*kind));
    }
    catalog
}
