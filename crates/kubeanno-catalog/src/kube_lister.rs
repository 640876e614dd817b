//! Kubernetes listers for the built-in kinds.
//!
//! Listing goes through the metadata-only endpoint so object bodies
//! (Secret data, Pod specs) are never transferred. Results are paged
//! and the continue token is followed until the server reports no more.

use std::fmt::Debug;
use std::marker::PhantomData;

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::batch::v1::CronJob;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret, Service};
use k8s_openapi::api::networking::v1::{Ingress, NetworkPolicy};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, ListParams};
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use tracing::trace;

use kubeanno_core::{ObjectMetadata, ResourceKind};

use crate::catalog::{BoxError, Catalog, ListFuture, ResourceLister};

/// Lists all objects of `K` across every namespace.
pub struct KubeLister<K> {
    page_size: u32,
    _kind: PhantomData<fn() -> K>,
}

impl<K> KubeLister<K> {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            _kind: PhantomData,
        }
    }
}

impl<K> ResourceLister<Client> for KubeLister<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    fn list<'a>(&'a self, client: &'a Client) -> ListFuture<'a> {
        Box::pin(async move {
            let api: Api<K> = Api::all(client.clone());
            let mut params = ListParams::default().limit(self.page_size);
            let mut objects = Vec::new();
            let mut pages = 0u32;

            loop {
                let page = api.list_metadata(&params).await.map_err(BoxError::from)?;
                pages += 1;
                objects.extend(page.items.into_iter().map(|item| project(item.metadata)));

                match page.metadata.continue_ {
                    Some(token) if !token.is_empty() => {
                        params = params.continue_token(&token);
                    }
                    _ => break,
                }
            }

            trace!(kind = %K::kind(&()), pages, objects = objects.len(), "list complete");
            Ok(objects)
        })
    }
}

/// Drop everything but the name and annotations.
pub fn project(meta: ObjectMeta) -> ObjectMetadata {
    ObjectMetadata {
        name: meta.name.unwrap_or_default(),
        annotations: meta.annotations.unwrap_or_default(),
    }
}

/// The fixed set of kinds the exporter watches, in scrape order.
pub fn builtin_catalog(page_size: u32) -> Catalog<Client> {
    Catalog::new()
        .with(ResourceKind::DEPLOYMENT, KubeLister::<Deployment>::new(page_size))
        .with(ResourceKind::POD, KubeLister::<Pod>::new(page_size))
        .with(ResourceKind::SERVICE, KubeLister::<Service>::new(page_size))
        .with(ResourceKind::INGRESS, KubeLister::<Ingress>::new(page_size))
        .with(ResourceKind::CONFIG_MAP, KubeLister::<ConfigMap>::new(page_size))
        .with(ResourceKind::SECRET, KubeLister::<Secret>::new(page_size))
        .with(ResourceKind::STATEFUL_SET, KubeLister::<StatefulSet>::new(page_size))
        .with(ResourceKind::NETWORK_POLICY, KubeLister::<NetworkPolicy>::new(page_size))
        .with(ResourceKind::CRON_JOB, KubeLister::<CronJob>::new(page_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::Resource as _;
    use std::collections::BTreeMap;

    #[test]
    fn builtin_kinds_in_order() {
        let catalog = builtin_catalog(500);
        assert_eq!(
            catalog.kinds(),
            [
                ResourceKind::DEPLOYMENT,
                ResourceKind::POD,
                ResourceKind::SERVICE,
                ResourceKind::INGRESS,
                ResourceKind::CONFIG_MAP,
                ResourceKind::SECRET,
                ResourceKind::STATEFUL_SET,
                ResourceKind::NETWORK_POLICY,
                ResourceKind::CRON_JOB,
            ]
        );
    }

    #[test]
    fn catalog_kind_names_match_api_kinds() {
        assert_eq!(ResourceKind::DEPLOYMENT.as_str(), Deployment::KIND);
        assert_eq!(ResourceKind::CONFIG_MAP.as_str(), ConfigMap::KIND);
        assert_eq!(ResourceKind::STATEFUL_SET.as_str(), StatefulSet::KIND);
        assert_eq!(ResourceKind::NETWORK_POLICY.as_str(), NetworkPolicy::KIND);
        assert_eq!(ResourceKind::CRON_JOB.as_str(), CronJob::KIND);
    }

    #[test]
    fn project_keeps_name_and_annotations_only() {
        let meta = ObjectMeta {
            name: Some("api".into()),
            namespace: Some("default".into()),
            annotations: Some(BTreeMap::from([("owner".to_string(), "x".to_string())])),
            labels: Some(BTreeMap::from([("app".to_string(), "api".to_string())])),
            ..Default::default()
        };
        let projected = project(meta);
        assert_eq!(projected.name, "api");
        assert_eq!(projected.annotations.len(), 1);
        assert_eq!(projected.annotations["owner"], "x");
    }

    #[test]
    fn project_without_annotations() {
        let projected = project(ObjectMeta {
            name: Some("bare".into()),
            ..Default::default()
        });
        assert_eq!(projected.name, "bare");
        assert!(projected.annotations.is_empty());
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let lister = KubeLister::<Pod>::new(0);
        assert_eq!(lister.page_size, 1);
    }

    // ── Paging against a scripted API server ───────────────────

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use http::{Request, Response, StatusCode};
    use kube::client::Body;
    use serde_json::json;

    type Requests = Arc<Mutex<Vec<String>>>;

    /// Client whose API server answers with `responses` in order and
    /// records every request URI.
    fn scripted_client(responses: Vec<(StatusCode, serde_json::Value)>) -> (Client, Requests) {
        let requests: Requests = Arc::new(Mutex::new(Vec::new()));
        let responses = Arc::new(Mutex::new(VecDeque::from(responses)));

        let seen = requests.clone();
        let service = tower::service_fn(move |req: Request<Body>| {
            seen.lock().unwrap().push(req.uri().to_string());
            let (status, body) = responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("more requests than scripted responses");
            async move {
                Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
            }
        });

        (Client::new(service, "default"), requests)
    }

    fn metadata_page(names: &[&str], continue_token: Option<&str>) -> serde_json::Value {
        let items: Vec<_> = names
            .iter()
            .map(|name| {
                json!({
                    "apiVersion": "meta.k8s.io/v1",
                    "kind": "PartialObjectMetadata",
                    "metadata": {
                        "name": name,
                        "namespace": "default",
                        "annotations": { "owner": format!("{name}-owner") }
                    }
                })
            })
            .collect();
        let mut metadata = json!({ "resourceVersion": "100" });
        if let Some(token) = continue_token {
            metadata["continue"] = json!(token);
        }
        json!({
            "apiVersion": "meta.k8s.io/v1",
            "kind": "PartialObjectMetadataList",
            "metadata": metadata,
            "items": items
        })
    }

    fn forbidden() -> serde_json::Value {
        json!({
            "apiVersion": "v1",
            "kind": "Status",
            "status": "Failure",
            "message": "pods is forbidden: User cannot list resource pods",
            "reason": "Forbidden",
            "code": 403
        })
    }

    #[tokio::test]
    async fn follows_continue_token_across_pages() {
        let (client, requests) = scripted_client(vec![
            (StatusCode::OK, metadata_page(&["a", "b"], Some("p2"))),
            (StatusCode::OK, metadata_page(&["c"], None)),
        ]);
        let catalog = Catalog::new().with(ResourceKind::POD, KubeLister::<Pod>::new(2));

        let objects = catalog.entries().next().unwrap().list(&client).await.unwrap();

        let names: Vec<_> = objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(objects[2].annotations["owner"], "c-owner");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        // Cluster-wide list, not namespaced.
        assert!(requests[0].starts_with("/api/v1/pods?"), "{}", requests[0]);
        assert!(requests[0].contains("limit=2"));
        assert!(!requests[0].contains("continue="));
        assert!(requests[1].contains("continue=p2"), "{}", requests[1]);
        assert!(requests[1].contains("limit=2"));
    }

    #[tokio::test]
    async fn empty_continue_token_ends_listing() {
        let (client, requests) =
            scripted_client(vec![(StatusCode::OK, metadata_page(&["only"], Some("")))]);
        let catalog = Catalog::new().with(ResourceKind::POD, KubeLister::<Pod>::new(500));

        let objects = catalog.entries().next().unwrap().list(&client).await.unwrap();

        assert_eq!(objects.len(), 1);
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failing_page_aborts_kind() {
        let (client, requests) = scripted_client(vec![
            (StatusCode::OK, metadata_page(&["a", "b"], Some("p2"))),
            (StatusCode::FORBIDDEN, forbidden()),
        ]);
        let catalog = Catalog::new().with(ResourceKind::POD, KubeLister::<Pod>::new(2));

        let err = catalog.entries().next().unwrap().list(&client).await.unwrap_err();

        assert_eq!(err.kind, ResourceKind::POD);
        assert!(err.to_string().starts_with("failed to list Pod: "), "{err}");
        assert!(err.to_string().contains("forbidden"), "{err}");
        assert_eq!(requests.lock().unwrap().len(), 2);
    }
}
