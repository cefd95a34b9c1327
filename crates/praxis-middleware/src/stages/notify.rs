//! Post-success notification stage.
//!
//! Tells an observer about invocations that completed successfully.
//! Notification is strictly best-effort: a failing notifier is logged
//! and the invocation result is returned untouched, so downstream
//! consumers can never break an operation.

use std::sync::Arc;

use praxis_core::{BoxFuture, InvocationId, OpContext, OpResult};

use crate::middleware::{Middleware, Next};

/// What a notifier learns about a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyEvent {
    /// Which invocation completed.
    pub invocation_id: InvocationId,
    /// The operation name, or `"unknown"` before dispatch stamping.
    pub operation: String,
}

/// Observer for successful invocations.
pub trait Notifier: Send + Sync + 'static {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Delivery failures are reported to the stage, which logs and
    /// swallows them.
    fn notify(&self, event: NotifyEvent) -> BoxFuture<'static, anyhow::Result<()>>;
}

/// Middleware stage that notifies after successful invocations.
///
/// Failed invocations are never announced.
#[derive(Clone)]
pub struct NotifyStage {
    notifier: Arc<dyn Notifier>,
}

impl NotifyStage {
    /// Creates a stage delivering to the given notifier.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

impl std::fmt::Debug for NotifyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyStage").finish_non_exhaustive()
    }
}

impl<Req, Res> Middleware<Req, Res> for NotifyStage
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn name(&self) -> &'static str {
        "notify"
    }

    fn process(
        &self,
        ctx: OpContext,
        request: Req,
        next: Next<Req, Res>,
    ) -> BoxFuture<'static, OpResult<Res>> {
        let notifier = Arc::clone(&self.notifier);
        Box::pin(async move {
            let result = next.run(ctx.clone(), request).await;
            if result.is_ok() {
                let event = NotifyEvent {
                    invocation_id: ctx.invocation_id(),
                    operation: ctx.operation().unwrap_or("unknown").to_owned(),
                };
                if let Err(err) = notifier.notify(event).await {
                    tracing::warn!(
                        invocation_id = %ctx.invocation_id(),
                        error = %err,
                        "notifier failed, invocation result unaffected"
                    );
                }
            }
            result
        })
    }
}
