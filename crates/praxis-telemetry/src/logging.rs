//! Structured logging for Praxis services.
//!
//! Services log through `tracing`; this module owns the subscriber
//! setup. Output is JSON for machines or pretty-printed for humans,
//! filtered through the usual `EnvFilter` syntax.
//!
//! # Example
//!
//! ```rust,ignore
//! use praxis_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//!
//! tracing::info!(operation = "create_note", "service starting");
//! ```

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g. "info", "praxis=debug,tokio=warn").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include the target (module path).
    pub include_target: bool,

    /// Service name for log fields.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "praxis".to_string(),
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
            service_name: "praxis".to_string(),
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "praxis".to_string(),
        }
    }
}

/// Initializes the global logging subscriber.
///
/// May be called once per process; later calls fail because a global
/// subscriber is already installed.
///
/// # Errors
///
/// Returns [`TelemetryError::LoggingInit`] if the filter directive is
/// invalid or a subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| TelemetryError::LoggingInit(format!("invalid filter directive: {e}")))?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns [`TelemetryError::LoggingInit`] if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Standard log field names for Praxis services.
///
/// Use these for consistency across logs.
pub mod fields {
    /// Invocation ID field name.
    pub const INVOCATION_ID: &str = "invocation_id";

    /// Operation name field name.
    pub const OPERATION: &str = "operation";

    /// Middleware stage field name.
    pub const STAGE: &str = "stage";

    /// Resolved fault code field name.
    pub const FAULT_CODE: &str = "fault_code";

    /// Duration field name (in milliseconds).
    pub const DURATION_MS: &str = "duration_ms";

    /// Error field name.
    pub const ERROR: &str = "error";

    /// Service name field name.
    pub const SERVICE_NAME: &str = "service.name";
}

/// Logs an invocation start event.
#[macro_export]
macro_rules! log_invocation_start {
    ($invocation_id:expr, $operation:expr) => {
        tracing::info!(
            invocation_id = %$invocation_id,
            operation = %$operation,
            "invocation started"
        );
    };
}

/// Logs an invocation completion event.
#[macro_export]
macro_rules! log_invocation_complete {
    ($invocation_id:expr, $duration_ms:expr) => {
        tracing::info!(
            invocation_id = %$invocation_id,
            duration_ms = $duration_ms,
            "invocation completed"
        );
    };
}

/// Logs a resolved invocation fault.
#[macro_export]
macro_rules! log_invocation_fault {
    ($invocation_id:expr, $code:expr, $fault:expr) => {
        tracing::error!(
            invocation_id = %$invocation_id,
            fault_code = %$code,
            error = %$fault,
            "invocation failed"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert_eq!(config.level, "info");
        assert_eq!(config.service_name, "praxis");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.span_events);
        assert!(config.file_line_info);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_production_config() {
        let config = LogConfig::production();
        assert!(config.json_format);
        assert!(!config.span_events);
        assert!(!config.file_line_info);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_field_names() {
        assert_eq!(fields::INVOCATION_ID, "invocation_id");
        assert_eq!(fields::OPERATION, "operation");
        assert_eq!(fields::FAULT_CODE, "fault_code");
    }

    #[test]
    fn test_create_env_filter_valid() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("praxis=debug,tokio=warn").is_ok());
    }

    #[test]
    fn test_disabled_logging_is_a_no_op() {
        let config = LogConfig {
            enabled: false,
            ..Default::default()
        };

        assert!(init_logging(&config).is_ok());
        // Still fine a second time: nothing was installed.
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_invocation_macros_emit_without_a_subscriber() {
        log_invocation_start!("0192f0c1", "create_note");
        log_invocation_complete!("0192f0c1", 12u64);
        log_invocation_fault!("0192f0c1", "DUPLICATE", "saving note");
    }
}
