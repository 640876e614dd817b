//! Exporter configuration file parser.
//!
//! The file is optional; every field falls back to a default, and the
//! binary layers command-line flags on top via [`ExporterConfig::merge`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::WatchList;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DEADLINE_SECS: u64 = 300;
pub const DEFAULT_PAGE_SIZE: u32 = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Log output format for the daemon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            other => Err(ConfigError::Invalid(format!("unknown log format '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExporterConfig {
    /// Port the metrics server listens on.
    pub port: u16,
    /// Annotation keys to export.
    pub annotations: Vec<String>,
    /// Ceiling for one scrape cycle, in seconds.
    pub deadline_secs: u64,
    /// Objects requested per list page.
    pub page_size: u32,
    pub log_format: LogFormat,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            annotations: Vec::new(),
            deadline_secs: DEFAULT_DEADLINE_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            log_format: LogFormat::default(),
        }
    }
}

/// Values that override the file, typically from flags or environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub annotations: Option<Vec<String>>,
    pub deadline_secs: Option<u64>,
    pub page_size: Option<u32>,
    pub log_format: Option<LogFormat>,
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        Ok(config)
    }

    /// Apply overrides on top of this config.
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(annotations) = overrides.annotations {
            self.annotations = annotations;
        }
        if let Some(deadline) = overrides.deadline_secs {
            self.deadline_secs = deadline;
        }
        if let Some(page_size) = overrides.page_size {
            self.page_size = page_size;
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deadline_secs == 0 {
            return Err(ConfigError::Invalid("deadline_secs must be greater than 0".into()));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn watch_list(&self) -> WatchList {
        WatchList::new(&self.annotations)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}
