//! Prometheus text exposition format.
//!
//! Renders the annotation snapshot (and the last scrape status) into the
//! 0.0.4 text format for scraping by a Prometheus server.

use std::fmt::Write;

use kubeanno_core::MetricPoint;

use crate::gauge::ScrapeStatus;

/// Gauge family holding one sample per matched annotation.
pub const METRIC_NAME: &str = "kube_annotations_exporter";

const SUCCESS_NAME: &str = "kube_annotations_exporter_last_scrape_success";
const DURATION_NAME: &str = "kube_annotations_exporter_last_scrape_duration_seconds";

/// Render points and the optional scrape status into Prometheus text format.
///
/// The annotation family headers are always written, even with no points.
pub fn render_prometheus(points: &[MetricPoint], status: Option<ScrapeStatus>) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "# HELP {METRIC_NAME} Watched annotation present on a cluster object.\n"
    ));
    out.push_str(&format!("# TYPE {METRIC_NAME} gauge\n"));
    for p in points {
        let _ = writeln!(
            out,
            "{METRIC_NAME}{{kind=\"{}\",name=\"{}\",annotation=\"{}\"}} 1",
            escape_label(p.kind.as_str()),
            escape_label(&p.name),
            escape_label(&p.annotation),
        );
    }

    if let Some(status) = status {
        out.push_str(&format!(
            "# HELP {SUCCESS_NAME} Whether the last collection cycle completed (1) or failed (0).\n"
        ));
        out.push_str(&format!("# TYPE {SUCCESS_NAME} gauge\n"));
        let _ = writeln!(out, "{SUCCESS_NAME} {}", u8::from(status.success));

        out.push_str(&format!(
            "# HELP {DURATION_NAME} Wall time of the last collection cycle.\n"
        ));
        out.push_str(&format!("# TYPE {DURATION_NAME} gauge\n"));
        let _ = writeln!(out, "{DURATION_NAME} {:.6}", status.duration.as_secs_f64());
    }

    out
}

/// Escape a label value: backslash, double quote, and newline.
fn escape_label(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}
