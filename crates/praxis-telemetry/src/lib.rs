//! Structured logging bootstrap for Praxis services.
//!
//! Every crate in the workspace logs through `tracing`; this crate owns
//! the subscriber that turns those events into output. Call
//! [`init_logging`] once at startup with a [`LogConfig`], and the rest
//! of the process logs through it.
//!
//! # Example
//!
//! ```rust,ignore
//! use praxis_telemetry::{init_logging, LogConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&LogConfig::production())?;
//!
//!     tracing::info!(service.name = "notes", "service starting");
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/praxis-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
