//! Collection engine — resets and rebuilds the annotation snapshot.
//!
//! Kinds are listed sequentially in catalog order, so a failure at kind N
//! leaves exactly the matches of kinds `0..N` published. The cycle lock
//! covers the whole reset/rebuild window; overlapping scrapes queue behind
//! it, bounded by their own deadline.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use kubeanno_catalog::Catalog;
use kubeanno_core::{MetricPoint, ObjectMetadata, ResourceKind, WatchList, scan};
use kubeanno_metrics::AnnotationGauge;

use crate::error::CollectError;

/// Ceiling for a single cycle when none is configured.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5 * 60);

/// Summary of a completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Kinds listed.
    pub kinds: usize,
    /// Objects scanned across all kinds.
    pub objects: usize,
    /// Distinct points published.
    pub points: usize,
    pub elapsed: Duration,
}

pub struct CollectionEngine<C> {
    client: Arc<C>,
    catalog: Catalog<C>,
    watch_list: WatchList,
    gauge: Arc<AnnotationGauge>,
    deadline: Duration,
    /// Held for the whole reset/rebuild window.
    cycle: Mutex<()>,
}

impl<C> CollectionEngine<C>
where
    C: Send + Sync,
{
    pub fn new(
        client: Arc<C>,
        catalog: Catalog<C>,
        watch_list: WatchList,
        gauge: Arc<AnnotationGauge>,
    ) -> Self {
        Self {
            client,
            catalog,
            watch_list,
            gauge,
            deadline: DEFAULT_DEADLINE,
            cycle: Mutex::new(()),
        }
    }

    /// Override the per-cycle ceiling.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn gauge(&self) -> &Arc<AnnotationGauge> {
        &self.gauge
    }

    pub fn watch_list(&self) -> &WatchList {
        &self.watch_list
    }

    pub fn catalog(&self) -> &Catalog<C> {
        &self.catalog
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Trigger for the exposition layer: run one cycle.
    ///
    /// `caller_deadline` tightens the configured ceiling, never extends it.
    pub async fn on_scrape(
        &self,
        caller_deadline: Option<Instant>,
    ) -> Result<CycleReport, CollectError> {
        match caller_deadline {
            Some(deadline) => self.collect_until(deadline).await,
            None => self.collect().await,
        }
    }

    /// Run one cycle bounded by the configured ceiling.
    pub async fn collect(&self) -> Result<CycleReport, CollectError> {
        let started = Instant::now();
        self.run_cycle(started, started + self.deadline).await
    }

    /// Run one cycle that must finish by `deadline` (capped by the ceiling).
    pub async fn collect_until(&self, deadline: Instant) -> Result<CycleReport, CollectError> {
        let started = Instant::now();
        let deadline = deadline.min(started + self.deadline);
        self.run_cycle(started, deadline).await
    }

    /// Every cycle records its outcome on the gauge's scrape-status series.
    /// The record is made while the window is still held, so a queued
    /// cycle can never be overwritten by the one it waited for.
    async fn run_cycle(
        &self,
        started: Instant,
        deadline: Instant,
    ) -> Result<CycleReport, CollectError> {
        let budget = deadline.saturating_duration_since(started);

        let _window = match timeout_at(deadline, self.cycle.lock()).await {
            Ok(window) => window,
            Err(_) => {
                warn!(?budget, "collection cycle still running, skipping");
                self.gauge.record_cycle(false, started.elapsed());
                return Err(CollectError::Busy { budget });
            }
        };

        let result = self.rebuild(started, deadline, budget).await;
        self.gauge.record_cycle(result.is_ok(), started.elapsed());
        result
    }

    /// Reset, then list and publish kind by kind. Caller holds the window.
    async fn rebuild(
        &self,
        started: Instant,
        deadline: Instant,
        budget: Duration,
    ) -> Result<CycleReport, CollectError> {
        self.gauge.reset().await;

        let mut report = CycleReport::default();
        for entry in self.catalog.entries() {
            let kind = entry.kind();
            let objects = timeout_at(deadline, entry.list(self.client.as_ref()))
                .await
                .map_err(|_| CollectError::DeadlineExceeded { kind, budget })??;

            let points = match_points(kind, &objects, &self.watch_list);
            debug!(
                %kind,
                objects = objects.len(),
                matches = points.len(),
                "kind scanned"
            );

            report.kinds += 1;
            report.objects += objects.len();
            self.gauge.set_all(points).await;
        }

        report.points = self.gauge.len().await;
        report.elapsed = started.elapsed();
        debug!(
            kinds = report.kinds,
            objects = report.objects,
            points = report.points,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "collection cycle complete"
        );
        Ok(report)
    }
}

/// Points for every (object, watched key) pair present in one kind's listing.
fn match_points(
    kind: ResourceKind,
    objects: &[ObjectMetadata],
    watch_list: &WatchList,
) -> Vec<MetricPoint> {
    if watch_list.is_empty() {
        return Vec::new();
    }
    objects
        .iter()
        .flat_map(|obj| {
            scan(&obj.annotations, watch_list)
                .into_iter()
                .map(move |key| MetricPoint::new(kind, obj.name.clone(), key))
        })
        .collect()
}
