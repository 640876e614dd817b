//! HTTP handlers.

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::ApiState;

/// Header Prometheus sets to tell targets how long it will wait.
pub const SCRAPE_TIMEOUT_HEADER: &str = "x-prometheus-scrape-timeout-seconds";

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
        })
    }
}

// ── Metrics ────────────────────────────────────────────────────

/// GET /metrics
///
/// A failed cycle is logged here and otherwise ignored: the response
/// always carries the current snapshot.
pub async fn prometheus_metrics<C>(
    State(state): State<ApiState<C>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    C: Send + Sync + 'static,
{
    let caller_deadline = scrape_timeout(&headers).map(|timeout| Instant::now() + timeout);

    match state.engine.on_scrape(caller_deadline).await {
        Ok(report) => debug!(
            kinds = report.kinds,
            objects = report.objects,
            points = report.points,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "scrape complete"
        ),
        Err(e) => warn!(error = %e, "failed to collect annotations"),
    }

    let body = state.engine.gauge().render().await;
    (StatusCode::OK, [(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body)
}

/// Parse the scrape timeout Prometheus advertises, ignoring junk values.
fn scrape_timeout(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(SCRAPE_TIMEOUT_HEADER)?.to_str().ok()?;
    let secs: f64 = raw.trim().parse().ok()?;
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}

// ── Snapshot ───────────────────────────────────────────────────

/// GET /api/v1/snapshot
pub async fn get_snapshot<C>(State(state): State<ApiState<C>>) -> impl IntoResponse
where
    C: Send + Sync + 'static,
{
    ApiResponse::ok(state.engine.gauge().points().await)
}

// ── Health ─────────────────────────────────────────────────────

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SCRAPE_TIMEOUT_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn scrape_timeout_parses_seconds() {
        assert_eq!(scrape_timeout(&headers("10")), Some(Duration::from_secs(10)));
        assert_eq!(scrape_timeout(&headers("2.5")), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn scrape_timeout_ignores_invalid() {
        assert_eq!(scrape_timeout(&HeaderMap::new()), None);
        assert_eq!(scrape_timeout(&headers("soon")), None);
        assert_eq!(scrape_timeout(&headers("0")), None);
        assert_eq!(scrape_timeout(&headers("-3")), None);
        assert_eq!(scrape_timeout(&headers("inf")), None);
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        assert_eq!(healthz().await, "ok");
    }
}
