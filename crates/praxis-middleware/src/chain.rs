//! Compiled operation chains.
//!
//! A [`Chain`] is the onion a service executes for one operation: the
//! registered middleware stages wrapped around the core handler, first
//! stage outermost. Composition happens exactly once, in
//! [`Chain::compile`]; invoking the chain afterwards allocates no new
//! structure and clones only reference counts.

use std::sync::Arc;

use praxis_core::{Deps, Handler, OpContext, OpResult};

use crate::middleware::{BoxedMiddleware, Next, NextFn};

/// A compiled middleware chain for one operation.
///
/// Cheap to clone; clones share the compiled closure graph. The chain
/// holds no mutable state, so one instance may serve any number of
/// concurrent invocations.
pub struct Chain<Req, Res> {
    entry: NextFn<Req, Res>,
    stage_names: Arc<[&'static str]>,
}

impl<Req, Res> Chain<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    /// Compiles stages around a handler, back to front.
    ///
    /// The innermost layer invokes the handler with a clone of `deps`;
    /// each stage in `stages` is then folded on in reverse registration
    /// order, which leaves the first-registered stage outermost.
    pub fn compile<S>(
        stages: Vec<BoxedMiddleware<Req, Res>>,
        handler: Arc<dyn Handler<S, Req, Res>>,
        deps: Deps<S>,
    ) -> Self
    where
        S: Send + Sync + 'static,
    {
        let stage_names: Arc<[&'static str]> =
            stages.iter().map(|stage| stage.name()).collect();

        let mut entry: NextFn<Req, Res> =
            Arc::new(move |ctx, request| handler.handle(ctx, deps.clone(), request));

        for stage in stages.into_iter().rev() {
            let inner = entry;
            entry = Arc::new(move |ctx, request| {
                stage.process(ctx, request, Next::new(Arc::clone(&inner)))
            });
        }

        Self { entry, stage_names }
    }

    /// Runs one invocation through the chain.
    pub async fn call(&self, ctx: OpContext, request: Req) -> OpResult<Res> {
        (self.entry)(ctx, request).await
    }

    /// Returns the stage names, outermost first.
    #[must_use]
    pub fn stage_names(&self) -> &[&'static str] {
        &self.stage_names
    }

    /// Returns the number of stages wrapped around the handler.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stage_names.len()
    }
}

impl<Req, Res> Clone for Chain<Req, Res> {
    fn clone(&self) -> Self {
        Self {
            entry: Arc::clone(&self.entry),
            stage_names: Arc::clone(&self.stage_names),
        }
    }
}

impl<Req, Res> std::fmt::Debug for Chain<Req, Res> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("stages", &self.stage_names)
            .finish()
    }
}
