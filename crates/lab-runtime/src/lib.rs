//! # Lab Runtime Library
//!
//! Configuration, logging and the scenario runner behind the `lab-runtime`
//! binary. Exposed as a library for testing.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod runner;
pub mod telemetry;

pub use config::{load_config, load_config_from, ConfigError, ConfigWarning, LabConfig, LoggingConfig};
pub use runner::{run, LabReport};
pub use telemetry::init_tracing;

/// Runtime version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
