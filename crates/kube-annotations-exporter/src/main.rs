//! kube-annotations-exporter — Prometheus exporter for watched annotations.
//!
//! Every scrape lists the built-in Kubernetes kinds across all namespaces
//! and exports `kube_annotations_exporter{kind,name,annotation} 1` for each
//! watched annotation key present on an object.
//!
//! # Usage
//!
//! ```text
//! kube-annotations-exporter --port 8080 --annotations owner,team
//! ```

mod cli;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kubeanno_core::LogFormat;
use kubeanno_engine::CollectionEngine;
use kubeanno_metrics::AnnotationGauge;

use crate::cli::Cli;

const DEFAULT_LOG_FILTER: &str = "info,kube_annotations_exporter=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_from(cli::normalize_legacy_args(std::env::args_os()));
    let config = cli.load_config()?;

    init_tracing(config.log_format);

    let watch_list = config.watch_list();
    info!(
        port = config.port,
        annotations = watch_list.len(),
        deadline_secs = config.deadline_secs,
        page_size = config.page_size,
        "kube-annotations-exporter starting"
    );
    if watch_list.is_empty() {
        warn!("no annotations configured, every scrape will export an empty snapshot");
    }

    // ── Cluster client ─────────────────────────────────────────

    let client = kubeanno_catalog::resolve_client()
        .await
        .context("failed to get cluster client")?;

    // ── Collection engine ──────────────────────────────────────

    let catalog = kubeanno_catalog::builtin_catalog(config.page_size);
    info!(kinds = ?catalog.kinds(), "resource catalog ready");

    let gauge = Arc::new(AnnotationGauge::new());
    let engine = CollectionEngine::new(Arc::new(client), catalog, watch_list, gauge)
        .with_deadline(config.deadline());

    // ── HTTP server ────────────────────────────────────────────

    let router = kubeanno_api::build_router(Arc::new(engine));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!(%addr, "starting webserver");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    info!("kube-annotations-exporter stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
