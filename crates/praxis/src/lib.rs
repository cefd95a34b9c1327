//! # Praxis
//!
//! **Middleware-composable operation framework with automatic fault
//! mapping**
//!
//! Praxis is an opinionated framework for building in-process service
//! layers that provides:
//!
//! - 🔗 **Composable Middleware** – onion-ordered stages, compiled once
//!   per operation at build
//! - 🏷️ **Two-Layer Fault Taxonomy** – opaque domain kinds resolved
//!   through wrap chains into caller-visible envelopes
//! - ⚡ **Typed End to End** – handlers and stages share the operation's
//!   request/response types, no serialization in between
//! - 🛑 **Cooperative Cancellation** – contexts carry deadlines and a
//!   shared cancel signal; cancellation always outranks domain faults
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use praxis::prelude::*;
//!
//! struct NoteVault { /* ... */ }
//!
//! async fn create_note(
//!     _ctx: OpContext,
//!     deps: Deps<NoteVault>,
//!     req: CreateNote,
//! ) -> OpResult<NoteCreated> {
//!     // Your handler logic here
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     praxis::telemetry::init_logging(&LogConfig::production())?;
//!
//!     let service = ServiceBuilder::new()
//!         .store(NoteVault::open()?)
//!         .operation("create_note", create_note)
//!         .middleware::<CreateNote, NoteCreated, _>("create_note", ValidateStage::new())
//!         .build()?;
//!
//!     let created = service
//!         .invoke(OpContext::new(), "create_note", req)
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Every invocation travels one compiled chain, first-registered stage
//! outermost:
//!
//! ```text
//! invoke → stage A → stage B → stage C → handler
//!                                           ↓
//! result ← stage A ← stage B ← stage C ←───┘
//! ```
//!
//! Faults coming back out are plain values; the service's resolver
//! walks their wrap chains against the fault table and renders the
//! matching envelope for callers.

#![doc(html_root_url = "https://docs.rs/praxis/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use praxis_core as core;

// Re-export middleware types
pub use praxis_middleware as middleware;

// Re-export service assembly types
pub use praxis_service as service;

// Re-export telemetry bootstrap
pub use praxis_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use praxis::prelude::*;
/// ```
pub mod prelude {
    pub use praxis_core::{
        BoxFuture, CancelSignal, Cancelled, DeadlineExceeded, Deps, DetailVisibility, Fault,
        FaultEnvelope, FaultKind, FaultMapping, FaultTable, FaultTableBuilder, Handler,
        InvocationId, MemoryCache, OpContext, OpResult, Resolver, Signal, StatusClass, ValueCache,
    };

    // Re-export chain composition types
    pub use praxis_middleware::{BoxedMiddleware, Chain, FnMiddleware, Middleware, Next};

    // Re-export the bundled stages
    pub use praxis_middleware::stages::{
        require_in_range, require_non_empty, AuditEntry, AuditOutcome, AuditSink, AuditStage,
        CacheKey, CacheStage, KeyScope, MemoryAuditSink, Notifier, NotifyEvent, NotifyStage,
        RateLimitBuilder, RateLimitStage, Validate, ValidateStage,
    };

    // Re-export service assembly types
    pub use praxis_service::{BuildError, Service, ServiceBuilder};

    // Re-export logging bootstrap
    pub use praxis_telemetry::{init_logging, LogConfig, TelemetryError, TelemetryResult};
}
