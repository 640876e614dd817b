//! kubeanno-core — shared types for the annotations exporter.
//!
//! Holds the data model that flows through a scrape cycle, the pure
//! annotation scanner, and the exporter's configuration file model.

pub mod config;
pub mod scanner;
pub mod types;

pub use config::{ConfigError, ConfigOverrides, ExporterConfig, LogFormat};
pub use scanner::scan;
pub use types::*;
