//! The core handler abstraction.

use std::future::Future;
use std::pin::Pin;

use crate::context::OpContext;
use crate::deps::Deps;
use crate::fault::OpResult;

/// Boxed future type used across handler and middleware seams.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A core operation handler: pure business logic, no transport and no
/// middleware concerns.
///
/// `S` is the store type the owning service was built over; `Req` and
/// `Res` are the operation's request and response types. Any async
/// function or closure with the matching shape implements this trait,
/// so handlers are usually written as plain `async fn`s:
///
/// ```rust,ignore
/// async fn get_note(ctx: OpContext, deps: Deps<NoteStore>, req: GetNote) -> OpResult<Note> {
///     deps.store().load(&req.id).ok_or_else(|| Fault::not_found("no such note"))
/// }
/// ```
pub trait Handler<S, Req, Res>: Send + Sync + 'static {
    /// Executes the operation.
    fn handle(&self, ctx: OpContext, deps: Deps<S>, request: Req) -> BoxFuture<'static, OpResult<Res>>;
}

impl<S, Req, Res, F, Fut> Handler<S, Req, Res> for F
where
    S: Send + Sync + 'static,
    Req: Send + 'static,
    Res: Send + 'static,
    F: Fn(OpContext, Deps<S>, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = OpResult<Res>> + Send + 'static,
{
    fn handle(&self, ctx: OpContext, deps: Deps<S>, request: Req) -> BoxFuture<'static, OpResult<Res>> {
        Box::pin(self(ctx, deps, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::Fault;
    use std::sync::Arc;

    struct Store;

    async fn double(_ctx: OpContext, _deps: Deps<Store>, input: u32) -> OpResult<u32> {
        input
            .checked_mul(2)
            .ok_or_else(|| Fault::out_of_range("input too large to double"))
    }

    #[tokio::test]
    async fn test_async_fn_is_a_handler() {
        fn assert_handler<H: Handler<Store, u32, u32>>(h: H) -> H {
            h
        }

        let handler = assert_handler(double);
        let deps = Deps::new(Arc::new(Store));
        let out = handler.handle(OpContext::new(), deps, 21).await.unwrap();
        assert_eq!(out, 42);
    }

    #[tokio::test]
    async fn test_closure_is_a_handler() {
        let handler = |_ctx: OpContext, _deps: Deps<Store>, name: String| async move {
            Ok(format!("hello, {name}"))
        };

        let deps = Deps::new(Arc::new(Store));
        let out = handler
            .handle(OpContext::new(), deps, "world".to_owned())
            .await
            .unwrap();
        assert_eq!(out, "hello, world");
    }
}
