//! Logging setup for OCP tools.
//!
//! # Configuration
//!
//! Logging format is controlled via `OCP_LOG_FORMAT` env var:
//! - `json` - Structured JSON output (for ELK/Loki)
//! - `pretty` - Human-readable colored output (default for TTY)
//! - `compact` - Compact single-line format
//!
//! The filter comes from `OCP_LOG_LEVEL`, falling back to `RUST_LOG`.
//!
//! # Example
//!
//! ```no_run
//! use ocp_reconciler::observability::{TracingConfig, init_tracing};
//!
//! let config = TracingConfig::builder()
//!     .json_format(true)
//!     .log_filter("info,ocp_reconciler=debug")
//!     .build();
//! init_tracing(&config)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod config;
mod tracing_setup;

pub use config::{LogFormat, TracingConfig, TracingConfigBuilder};
pub use tracing_setup::init_tracing;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.log_filter(), "info");
        assert!(config.use_stderr());
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::builder()
            .log_format(LogFormat::Json)
            .log_filter("debug")
            .include_location(true)
            .use_stderr(false)
            .build();

        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.log_filter(), "debug");
        assert!(config.include_location());
        assert!(!config.use_stderr());
    }

    #[test]
    fn test_unknown_format_falls_back() {
        let format: LogFormat = "yaml".parse().unwrap();
        assert_eq!(format, LogFormat::Compact);
        let format: LogFormat = "PRETTY".parse().unwrap();
        assert_eq!(format, LogFormat::Pretty);
    }

    #[test]
    fn test_config_from_env() {
        // Must not panic with missing env vars
        let config = TracingConfig::from_env();
        assert!(config.include_target());
    }
}
