//! Gauge vector keyed by `{kind, name, annotation}`.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::trace;

use kubeanno_core::MetricPoint;

use crate::prometheus::render_prometheus;

/// Outcome of the most recent collection cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrapeStatus {
    pub success: bool,
    pub duration: Duration,
}

/// The published snapshot. Every point present has value 1; absence
/// means no match, there are no zero-valued samples.
#[derive(Debug, Default)]
pub struct AnnotationGauge {
    points: RwLock<BTreeSet<MetricPoint>>,
    /// Cycles recorded so far; status gauges are hidden until the first.
    cycles: AtomicU64,
    last_success: AtomicBool,
    last_duration_us: AtomicU64,
}

impl AnnotationGauge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all label combinations.
    pub async fn reset(&self) {
        let mut points = self.points.write().await;
        let dropped = points.len();
        points.clear();
        trace!(dropped, "snapshot reset");
    }

    /// Set a label combination to 1.
    pub async fn set(&self, point: MetricPoint) {
        self.points.write().await.insert(point);
    }

    /// Set several label combinations under one write lock.
    pub async fn set_all(&self, batch: impl IntoIterator<Item = MetricPoint>) {
        let mut points = self.points.write().await;
        points.extend(batch);
    }

    /// Current points in (kind, name, annotation) order.
    pub async fn points(&self) -> Vec<MetricPoint> {
        self.points.read().await.iter().cloned().collect()
    }

    pub async fn contains(&self, point: &MetricPoint) -> bool {
        self.points.read().await.contains(point)
    }

    pub async fn len(&self) -> usize {
        self.points.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.read().await.is_empty()
    }

    pub fn record_cycle(&self, success: bool, duration: Duration) {
        self.last_success.store(success, Ordering::Relaxed);
        self.last_duration_us
            .store(duration.as_micros() as u64, Ordering::Relaxed);
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Status of the last recorded cycle, if any.
    pub fn last_status(&self) -> Option<ScrapeStatus> {
        if self.cycles.load(Ordering::Relaxed) == 0 {
            return None;
        }
        Some(ScrapeStatus {
            success: self.last_success.load(Ordering::Relaxed),
            duration: Duration::from_micros(self.last_duration_us.load(Ordering::Relaxed)),
        })
    }

    /// Render the snapshot and scrape status in Prometheus text format.
    pub async fn render(&self) -> String {
        let points = self.points().await;
        render_prometheus(&points, self.last_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubeanno_core::ResourceKind;

    fn point(kind: ResourceKind, name: &str, annotation: &str) -> MetricPoint {
        MetricPoint::new(kind, name, annotation)
    }

    #[tokio::test]
    async fn set_and_read_back() {
        let gauge = AnnotationGauge::new();
        gauge.set(point(ResourceKind::POD, "worker", "team")).await;
        gauge.set(point(ResourceKind::DEPLOYMENT, "api", "owner")).await;

        let points = gauge.points().await;
        assert_eq!(points.len(), 2);
        // Sorted by kind first.
        assert_eq!(points[0].kind, ResourceKind::DEPLOYMENT);
    }

    #[tokio::test]
    async fn setting_twice_is_idempotent() {
        let gauge = AnnotationGauge::new();
        gauge.set(point(ResourceKind::POD, "worker", "team")).await;
        gauge.set(point(ResourceKind::POD, "worker", "team")).await;
        assert_eq!(gauge.len().await, 1);
    }

    #[tokio::test]
    async fn same_name_different_kind_are_distinct() {
        let gauge = AnnotationGauge::new();
        gauge
            .set_all([
                point(ResourceKind::DEPLOYMENT, "api", "owner"),
                point(ResourceKind::SERVICE, "api", "owner"),
            ])
            .await;
        assert_eq!(gauge.len().await, 2);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let gauge = AnnotationGauge::new();
        gauge.set(point(ResourceKind::POD, "worker", "team")).await;
        gauge.reset().await;
        assert!(gauge.is_empty().await);
        assert!(!gauge.contains(&point(ResourceKind::POD, "worker", "team")).await);
    }

    #[tokio::test]
    async fn status_hidden_until_first_cycle() {
        let gauge = AnnotationGauge::new();
        assert!(gauge.last_status().is_none());

        gauge.record_cycle(false, Duration::from_millis(1500));
        let status = gauge.last_status().unwrap();
        assert!(!status.success);
        assert_eq!(status.duration, Duration::from_millis(1500));

        gauge.record_cycle(true, Duration::from_millis(20));
        assert!(gauge.last_status().unwrap().success);
    }

    #[tokio::test]
    async fn render_includes_points() {
        let gauge = AnnotationGauge::new();
        gauge.set(point(ResourceKind::POD, "worker", "team")).await;
        let output = gauge.render().await;
        assert!(output.contains(
            "kube_annotations_exporter{kind=\"Pod\",name=\"worker\",annotation=\"team\"} 1"
        ));
    }
}
