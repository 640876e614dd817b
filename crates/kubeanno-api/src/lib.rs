//! kubeanno-api — HTTP surface of the annotations exporter.
//!
//! Every `GET /metrics` runs one collection cycle and then serves whatever
//! the snapshot holds, even when the cycle failed.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Run a cycle, then Prometheus exposition |
//! | GET | `/healthz` | Liveness |
//! | GET | `/api/v1/snapshot` | Currently published points as JSON |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use kubeanno_engine::CollectionEngine;

/// Shared state for handlers.
pub struct ApiState<C> {
    pub engine: Arc<CollectionEngine<C>>,
}

impl<C> Clone for ApiState<C> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

/// Build the complete router (metrics + health + snapshot API).
pub fn build_router<C>(engine: Arc<CollectionEngine<C>>) -> Router
where
    C: Send + Sync + 'static,
{
    let state = ApiState { engine };

    let api_routes = Router::new()
        .route("/snapshot", get(handlers::get_snapshot::<C>))
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::prometheus_metrics::<C>).with_state(state))
}
