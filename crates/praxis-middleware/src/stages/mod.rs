//! Bundled middleware stages.
//!
//! These cover the cross-cutting concerns most services want without
//! writing their own [`Middleware`](crate::Middleware):
//!
//! - [`validate`] - reject malformed requests before the handler
//! - [`rate_limit`] - cap invocation rates in a sliding window
//! - [`cache`] - serve repeated requests from a shared cache
//! - [`audit`] - record every invocation's outcome
//! - [`notify`] - announce successful invocations, best-effort
//!
//! None of them is mandatory; services register the ones they need, per
//! operation, in whatever order fits. First registered runs outermost.

pub mod audit;
pub mod cache;
pub mod notify;
pub mod rate_limit;
pub mod validate;

// Re-export main types
pub use audit::{AuditEntry, AuditOutcome, AuditSink, AuditStage, MemoryAuditSink};
pub use cache::{CacheKey, CacheStage};
pub use notify::{Notifier, NotifyEvent, NotifyStage};
pub use rate_limit::{KeyScope, RateLimitBuilder, RateLimitStage};
pub use validate::{require_in_range, require_non_empty, Validate, ValidateStage};
