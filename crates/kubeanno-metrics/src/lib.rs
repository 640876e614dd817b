//! kubeanno-metrics — the published snapshot of annotation gauges.
//!
//! The snapshot is an owned store, constructed once and handed to the
//! collection engine (writer) and the HTTP layer (reader). Tests build a
//! fresh store each, so there is no process-global registry.
//!
//! # Architecture
//!
//! ```text
//! AnnotationGauge
//!   ├── reset() / set(point)  ← collection engine, once per cycle
//!   ├── record_cycle()        ← last-scrape success and duration
//!   └── render()              → text/plain for /metrics
//! ```

pub mod gauge;
pub mod prometheus;

pub use gauge::{AnnotationGauge, ScrapeStatus};
pub use prometheus::{METRIC_NAME, render_prometheus};
