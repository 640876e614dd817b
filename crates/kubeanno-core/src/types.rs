//! Data model shared across the exporter crates.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A class of cluster object, e.g. `Deployment` or `Pod`.
///
/// Kinds are fixed at build time, so the identifier is a static string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceKind(&'static str);

impl ResourceKind {
    pub const DEPLOYMENT: ResourceKind = ResourceKind::new("Deployment");
    pub const POD: ResourceKind = ResourceKind::new("Pod");
    pub const SERVICE: ResourceKind = ResourceKind::new("Service");
    pub const INGRESS: ResourceKind = ResourceKind::new("Ingress");
    pub const CONFIG_MAP: ResourceKind = ResourceKind::new("ConfigMap");
    pub const SECRET: ResourceKind = ResourceKind::new("Secret");
    pub const STATEFUL_SET: ResourceKind = ResourceKind::new("StatefulSet");
    pub const NETWORK_POLICY: ResourceKind = ResourceKind::new("NetworkPolicy");
    pub const CRON_JOB: ResourceKind = ResourceKind::new("CronJob");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The projection of a cluster object the engine works with.
///
/// Only the name and the annotation set survive listing; everything else
/// is dropped by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub name: String,
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: BTreeMap::new(),
        }
    }

    /// Builder-style helper to attach an annotation.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

/// Ordered set of annotation keys the operator wants exported.
///
/// Keys are trimmed; empty and repeated keys are dropped, keeping the
/// first occurrence so emission order follows the configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchList {
    keys: Vec<String>,
}

impl WatchList {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for key in keys {
            let key = key.as_ref().trim();
            if key.is_empty() || out.iter().any(|k| k == key) {
                continue;
            }
            out.push(key.to_string());
        }
        Self { keys: out }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// One published gauge sample: `(kind, name, annotation) = 1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MetricPoint {
    pub kind: ResourceKind,
    pub name: String,
    pub annotation: String,
}

impl MetricPoint {
    pub fn new(kind: ResourceKind, name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            annotation: annotation.into(),
        }
    }
}
