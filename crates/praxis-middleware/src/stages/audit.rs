//! Invocation audit stage.
//!
//! Records one entry per invocation after the inner chain finishes,
//! whether it succeeded or failed. Because the record is written in the
//! post phase, an audit stage registered outside a short-circuiting
//! stage still captures rejected invocations.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use praxis_core::{BoxFuture, InvocationId, OpContext, OpResult};

use crate::middleware::{Middleware, Next};

/// One audited invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Which invocation this entry describes.
    pub invocation_id: InvocationId,
    /// The operation name, or `"unknown"` before dispatch stamping.
    pub operation: String,
    /// How the invocation ended.
    pub outcome: AuditOutcome,
    /// Time from context creation to the end of the inner chain.
    pub elapsed: Duration,
}

/// Terminal state of an audited invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The inner chain returned a response.
    Succeeded,
    /// The inner chain returned a fault.
    Failed,
}

/// Destination for audit entries.
///
/// Implementations must tolerate concurrent calls; the stage makes no
/// effort to serialise them.
pub trait AuditSink: Send + Sync + 'static {
    /// Accepts one entry.
    fn record(&self, entry: AuditEntry);
}

/// Middleware stage that writes an [`AuditEntry`] per invocation.
#[derive(Clone)]
pub struct AuditStage {
    sink: Arc<dyn AuditSink>,
}

impl AuditStage {
    /// Creates a stage writing to the given sink.
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }
}

impl std::fmt::Debug for AuditStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditStage").finish_non_exhaustive()
    }
}

impl<Req, Res> Middleware<Req, Res> for AuditStage
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn name(&self) -> &'static str {
        "audit"
    }

    fn process(
        &self,
        ctx: OpContext,
        request: Req,
        next: Next<Req, Res>,
    ) -> BoxFuture<'static, OpResult<Res>> {
        let sink = Arc::clone(&self.sink);
        Box::pin(async move {
            let result = next.run(ctx.clone(), request).await;
            let entry = AuditEntry {
                invocation_id: ctx.invocation_id(),
                operation: ctx.operation().unwrap_or("unknown").to_owned(),
                outcome: if result.is_ok() {
                    AuditOutcome::Succeeded
                } else {
                    AuditOutcome::Failed
                },
                elapsed: ctx.elapsed(),
            };
            tracing::debug!(
                invocation_id = %entry.invocation_id,
                operation = %entry.operation,
                outcome = ?entry.outcome,
                elapsed_ms = u64::try_from(entry.elapsed.as_millis()).unwrap_or(u64::MAX),
                "invocation audited"
            );
            sink.record(entry);
            result
        })
    }
}

/// In-memory [`AuditSink`] for tests and single-process deployments.
///
/// Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditSink {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, entry: AuditEntry) {
        self.entries.lock().push(entry);
    }
}
