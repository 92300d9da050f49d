//! Observability for the storefront.
//!
//! This crate provides:
//! - `LogLevel` / `LogFormat` - log settings as they appear in config files
//! - `LogConfig` - the `[log]` config section
//! - `init` - install the global `tracing` subscriber

mod logging;

pub use logging::*;
