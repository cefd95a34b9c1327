//! The immutable service produced by [`ServiceBuilder`].
//!
//! A [`Service`] owns one compiled chain per operation, a fault
//! resolver over the table it was built with, and the switch deciding
//! whether envelopes carry raw chain text. Nothing in it can change
//! after `build`, so a single instance behind an [`Arc`] serves any
//! number of concurrent invocations.
//!
//! [`ServiceBuilder`]: crate::ServiceBuilder

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use praxis_core::{
    DetailVisibility, Fault, FaultEnvelope, FaultMapping, FaultTable, InvocationId, OpContext,
    OpResult, Resolver,
};
use praxis_middleware::Chain;

/// One operation as compiled: the erased chain plus enough metadata to
/// explain a mistyped invocation.
pub(crate) struct CompiledOp {
    pub(crate) chain: Box<dyn Any + Send + Sync>,
    pub(crate) request_type: &'static str,
    pub(crate) response_type: &'static str,
    pub(crate) stage_names: Vec<&'static str>,
}

/// An immutable set of invocable operations.
///
/// Invocation is typed end to end: the caller names the operation and
/// supplies its request type, and the compiled chain runs with no
/// serialization in between. Faults coming back are plain values; feed
/// them to [`resolve`](Self::resolve) or [`envelope`](Self::envelope)
/// to turn them into caller-visible responses.
pub struct Service {
    ops: HashMap<String, CompiledOp>,
    resolver: Resolver,
    visibility: Arc<DetailVisibility>,
}

impl Service {
    pub(crate) fn from_parts(
        ops: HashMap<String, CompiledOp>,
        faults: FaultTable,
        verbose_faults: bool,
    ) -> Self {
        Self {
            ops,
            resolver: Resolver::new(Arc::new(faults)),
            visibility: Arc::new(DetailVisibility::new(verbose_faults)),
        }
    }

    /// Runs one invocation through an operation's compiled chain.
    ///
    /// The context is checked before anything else, so an invocation
    /// that arrives cancelled or past its deadline never starts. The
    /// context then travels the chain unchanged, stamped with the
    /// operation name.
    ///
    /// # Errors
    ///
    /// Returns whatever fault the chain produced, a `NOT_FOUND` fault
    /// for an unregistered operation, or a kindless internal fault when
    /// the caller's types disagree with the registered ones.
    pub async fn invoke<Req, Res>(
        &self,
        ctx: OpContext,
        operation: &str,
        request: Req,
    ) -> OpResult<Res>
    where
        Req: Send + 'static,
        Res: Send + 'static,
    {
        ctx.ensure_live()?;

        let Some(op) = self.ops.get(operation) else {
            return Err(Fault::not_found(format!(
                "operation '{operation}' is not registered"
            )));
        };
        let Some(chain) = op.chain.downcast_ref::<Chain<Req, Res>>() else {
            return Err(Fault::internal(format!(
                "operation '{operation}' invoked as {} -> {}, \
                 but it was registered as {} -> {}",
                type_name::<Req>(),
                type_name::<Res>(),
                op.request_type,
                op.response_type,
            )));
        };

        let ctx = ctx.with_operation(operation);
        tracing::debug!(
            operation,
            invocation_id = %ctx.invocation_id(),
            stages = op.stage_names.len(),
            "dispatching invocation"
        );

        let result = chain.call(ctx, request).await;
        if let Err(fault) = &result {
            tracing::debug!(operation, fault = %fault, "invocation returned a fault");
        }
        result
    }

    /// Resolves a fault to its table row.
    #[must_use]
    pub fn resolve<'s>(&'s self, fault: &(dyn Error + 'static)) -> &'s FaultMapping {
        self.resolver.resolve(fault)
    }

    /// Resolves a fault and renders the caller-visible envelope.
    #[must_use]
    pub fn envelope(
        &self,
        fault: &(dyn Error + 'static),
        invocation_id: Option<InvocationId>,
    ) -> FaultEnvelope {
        self.resolver
            .resolve(fault)
            .envelope(fault, &self.visibility, invocation_id)
    }

    /// Returns the resolver, for embedders that render responses
    /// themselves.
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Returns the switch controlling fault detail exposure. Flipping
    /// it affects envelopes rendered from then on.
    #[must_use]
    pub fn detail_visibility(&self) -> &DetailVisibility {
        &self.visibility
    }

    /// Returns `true` if `operation` is registered.
    #[must_use]
    pub fn has_operation(&self, operation: &str) -> bool {
        self.ops.contains_key(operation)
    }

    /// Iterates over the registered operation names, in no particular
    /// order.
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    /// Returns an operation's stage names, outermost first, or `None`
    /// for an unregistered operation.
    #[must_use]
    pub fn stage_names(&self, operation: &str) -> Option<&[&'static str]> {
        self.ops.get(operation).map(|op| op.stage_names.as_slice())
    }

    /// Returns the number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if no operations are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("operations", &self.ops.keys().collect::<Vec<_>>())
            .field("fault_rows", &self.resolver.table().len())
            .field("verbose_faults", &self.visibility.is_verbose())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use praxis_core::{Cancelled, DeadlineExceeded, Deps, FaultKind};

    use crate::builder::ServiceBuilder;

    #[derive(Default)]
    struct Store {
        handler_runs: AtomicUsize,
    }

    async fn echo(_ctx: OpContext, deps: Deps<Store>, req: String) -> OpResult<String> {
        deps.store().handler_runs.fetch_add(1, Ordering::SeqCst);
        Ok(req)
    }

    async fn refuse(_ctx: OpContext, _deps: Deps<Store>, _req: String) -> OpResult<String> {
        Err(Fault::duplicate("a note with this slug already exists"))
    }

    fn service() -> (Arc<Store>, Service) {
        let store = Arc::new(Store::default());
        let service = ServiceBuilder::new()
            .store(Arc::clone(&store))
            .operation("echo", echo)
            .operation("refuse", refuse)
            .build()
            .unwrap();
        (store, service)
    }

    #[tokio::test]
    async fn test_unknown_operation_is_a_not_found_fault() {
        let (_, service) = service();
        let fault = service
            .invoke::<String, String>(OpContext::new(), "nope", String::new())
            .await
            .unwrap_err();

        assert_eq!(fault.kind(), Some(FaultKind::NOT_FOUND));
        assert!(fault.to_string().contains("'nope'"));
    }

    #[tokio::test]
    async fn test_mistyped_invocation_is_an_internal_fault() {
        let (store, service) = service();
        let fault = service
            .invoke::<u32, u32>(OpContext::new(), "echo", 7)
            .await
            .unwrap_err();

        assert_eq!(fault.kind(), None);
        assert!(fault.to_string().contains("was registered as"));
        assert_eq!(store.handler_runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_context_never_reaches_the_chain() {
        let (store, service) = service();
        let ctx = OpContext::new();
        ctx.cancel_signal().cancel();

        let fault = service
            .invoke::<String, String>(ctx, "echo", "hi".to_owned())
            .await
            .unwrap_err();

        let source = fault.source().unwrap();
        assert!(source.is::<Cancelled>());
        assert_eq!(store.handler_runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_deadline_never_reaches_the_chain() {
        let (store, service) = service();
        let ctx = OpContext::new()
            .with_deadline(std::time::Instant::now() - std::time::Duration::from_millis(1));

        let fault = service
            .invoke::<String, String>(ctx, "echo", "hi".to_owned())
            .await
            .unwrap_err();

        let source = fault.source().unwrap();
        assert!(source.is::<DeadlineExceeded>());
        assert_eq!(store.handler_runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_context_is_stamped_with_the_operation_name() {
        async fn read_op(ctx: OpContext, _deps: Deps<Store>, _req: String) -> OpResult<String> {
            Ok(ctx.operation().unwrap_or("<none>").to_owned())
        }

        let service = ServiceBuilder::new()
            .store(Store::default())
            .operation("whoami", read_op)
            .build()
            .unwrap();

        let out: String = service
            .invoke(OpContext::new(), "whoami", String::new())
            .await
            .unwrap();
        assert_eq!(out, "whoami");
    }

    #[tokio::test]
    async fn test_envelope_renders_the_resolved_row() {
        let (_, service) = service();
        let ctx = OpContext::new();
        let id = ctx.invocation_id();

        let fault = service
            .invoke::<String, String>(ctx, "refuse", "slug".to_owned())
            .await
            .unwrap_err();

        let envelope = service.envelope(&fault, Some(id));
        assert_eq!(envelope.code, "DUPLICATE");
        assert_eq!(envelope.status.http_status().as_u16(), 409);
        assert_eq!(envelope.invocation_id, Some(id));
        assert_eq!(envelope.detail, None);
    }

    #[tokio::test]
    async fn test_detail_visibility_can_be_flipped_at_runtime() {
        let (_, service) = service();
        let fault = service
            .invoke::<String, String>(OpContext::new(), "refuse", "slug".to_owned())
            .await
            .unwrap_err();

        assert_eq!(service.envelope(&fault, None).detail, None);

        service.detail_visibility().set_verbose(true);
        let detail = service.envelope(&fault, None).detail.unwrap();
        assert!(detail.contains("slug already exists"));
    }

    #[test]
    fn test_service_debug_lists_operations() {
        let (_, service) = service();
        let debug = format!("{service:?}");
        assert!(debug.contains("echo"));
        assert!(debug.contains("refuse"));
    }
}
