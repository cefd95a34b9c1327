//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that all chain stages
//! implement. A stage sees the typed request on the way in, the typed
//! result on the way out, and decides whether the rest of the chain
//! runs at all.
//!
//! # Example
//!
//! ```ignore
//! use praxis_middleware::{BoxFuture, Middleware, Next};
//! use praxis_core::{OpContext, OpResult};
//!
//! struct Timing;
//!
//! impl<Req: Send + 'static, Res: Send + 'static> Middleware<Req, Res> for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process(
//!         &self,
//!         ctx: OpContext,
//!         request: Req,
//!         next: Next<Req, Res>,
//!     ) -> BoxFuture<'static, OpResult<Res>> {
//!         Box::pin(async move {
//!             let result = next.run(ctx.clone(), request).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "stage timed");
//!             result
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use praxis_core::{BoxFuture, OpContext, OpResult};

/// The callable remainder of a chain: everything inward of one stage.
pub(crate) type NextFn<Req, Res> =
    Arc<dyn Fn(OpContext, Req) -> BoxFuture<'static, OpResult<Res>> + Send + Sync>;

/// A type-erased middleware stage, shareable across compiled chains.
pub type BoxedMiddleware<Req, Res> = Arc<dyn Middleware<Req, Res>>;

/// A middleware stage in an operation chain.
///
/// Stages are generic over the operation's request and response types,
/// so a stage either works for every operation (implemented for all
/// `Req`/`Res`) or is written against one operation's types.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once; not calling it
///   short-circuits the chain, and stages registered outside the
///   short-circuiting one still see the result on the way out.
/// - A stage passes the context along unchanged. The context is the
///   caller's; stages read it and react to it.
/// - A stage returning an error must return cancellation faults from
///   downstream unmodified, so resolution still sees them.
pub trait Middleware<Req, Res>: Send + Sync + 'static {
    /// Returns the name of this stage, used in logs.
    fn name(&self) -> &'static str;

    /// Processes one invocation through this stage.
    ///
    /// The returned future owns everything it needs; implementations
    /// clone their shared state into it rather than borrowing `self`.
    fn process(
        &self,
        ctx: OpContext,
        request: Req,
        next: Next<Req, Res>,
    ) -> BoxFuture<'static, OpResult<Res>>;
}

/// Callback into the remainder of the chain.
///
/// Passed to each stage by value and consumed by
/// [`run`](Self::run), so a stage can continue inward at most once.
/// Dropping it without calling `run` is the short-circuit.
pub struct Next<Req, Res> {
    inner: NextFn<Req, Res>,
}

impl<Req, Res> Next<Req, Res> {
    pub(crate) fn new(inner: NextFn<Req, Res>) -> Self {
        Self { inner }
    }

    /// Invokes the rest of the chain, consuming this callback.
    pub async fn run(self, ctx: OpContext, request: Req) -> OpResult<Res> {
        (self.inner)(ctx, request).await
    }
}

/// A middleware stage built from an async function.
///
/// Lets tests and small services define a stage without a dedicated
/// type:
///
/// ```ignore
/// let stage = FnMiddleware::new("shortcut", |ctx, req, next| async move {
///     next.run(ctx, req).await
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based stage.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<Req, Res, F, Fut> Middleware<Req, Res> for FnMiddleware<F>
where
    Req: Send + 'static,
    Res: Send + 'static,
    F: Fn(OpContext, Req, Next<Req, Res>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = OpResult<Res>> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(
        &self,
        ctx: OpContext,
        request: Req,
        next: Next<Req, Res>,
    ) -> BoxFuture<'static, OpResult<Res>> {
        Box::pin((self.func)(ctx, request, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use praxis_core::Fault;

    #[tokio::test]
    async fn test_next_invokes_the_wrapped_closure() {
        let next: Next<u32, u32> = Next::new(Arc::new(|_ctx, req| {
            Box::pin(async move { Ok(req + 1) })
        }));

        let out = next.run(OpContext::new(), 41).await.unwrap();
        assert_eq!(out, 42);
    }

    #[tokio::test]
    async fn test_fn_middleware_can_short_circuit() {
        let stage = FnMiddleware::new("reject-all", |_ctx, _req: String, next| async move {
            drop(next);
            Err(Fault::out_of_range("rejected before the handler"))
        });

        let next: Next<String, String> = Next::new(Arc::new(|_ctx, req| {
            Box::pin(async move { Ok(req) })
        }));

        let result = stage.process(OpContext::new(), "in".to_owned(), next).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_fn_middleware_reports_its_name() {
        let stage = FnMiddleware::new("timing", |ctx, req: u8, next: Next<u8, u8>| async move {
            next.run(ctx, req).await
        });
        assert_eq!(Middleware::name(&stage), "timing");
    }
}
