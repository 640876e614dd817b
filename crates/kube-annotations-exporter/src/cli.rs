//! Command-line flags and config layering.
//!
//! Precedence, lowest first: built-in defaults, `--config` file, the
//! legacy `CONFIG_PORT` / `CONFIG_ANNOTATIONS` environment variables, then
//! flags (each flag also reads an `EXPORTER_*` environment variable).
//!
//! The single-dash `-port` and `-annotations` spellings are accepted too,
//! see [`normalize_legacy_args`].

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use kubeanno_core::{ConfigOverrides, ExporterConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "kube-annotations-exporter",
    about = "Export watched Kubernetes annotations as Prometheus gauges",
    version
)]
pub struct Cli {
    /// Optional TOML config file.
    #[arg(long, env = "EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to serve /metrics on.
    #[arg(long, env = "EXPORTER_PORT")]
    pub port: Option<u16>,

    /// Annotation keys to export, comma separated.
    #[arg(long, env = "EXPORTER_ANNOTATIONS", value_delimiter = ',')]
    pub annotations: Option<Vec<String>>,

    /// Ceiling for one scrape cycle, in seconds.
    #[arg(long, env = "EXPORTER_DEADLINE_SECS")]
    pub deadline_secs: Option<u64>,

    /// Objects requested per list page.
    #[arg(long, env = "EXPORTER_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Log output format (json or text).
    #[arg(long, env = "EXPORTER_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            annotations: self.annotations.clone(),
            deadline_secs: self.deadline_secs,
            page_size: self.page_size,
            log_format: self.log_format,
        }
    }

    /// Resolve the effective, validated configuration.
    pub fn load_config(&self) -> anyhow::Result<ExporterConfig> {
        self.load_config_with(|name| std::env::var(name).ok())
    }

    /// [`load_config`](Self::load_config) with an explicit environment.
    fn load_config_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<ExporterConfig> {
        let base = match &self.config {
            Some(path) => ExporterConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ExporterConfig::default(),
        };
        let config = base.merge(legacy_overrides(env)?).merge(self.overrides());
        config.validate()?;
        Ok(config)
    }
}

/// `CONFIG_PORT` and `CONFIG_ANNOTATIONS`, as read by earlier releases.
fn legacy_overrides(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<ConfigOverrides> {
    let port = env("CONFIG_PORT")
        .map(|raw| {
            raw.trim()
                .parse::<u16>()
                .with_context(|| format!("invalid CONFIG_PORT {raw:?}"))
        })
        .transpose()?;
    let annotations = env("CONFIG_ANNOTATIONS").map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(String::from)
            .collect()
    });
    Ok(ConfigOverrides {
        port,
        annotations,
        ..Default::default()
    })
}

/// Rewrite `-port` and `-annotations` (with or without `=value`) to their
/// double-dash forms. Everything after a bare `--` is left alone.
pub fn normalize_legacy_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    const LEGACY: [&str; 2] = ["-port", "-annotations"];

    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            let name = text.split_once('=').map_or(text, |(name, _)| name);
            if LEGACY.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}
