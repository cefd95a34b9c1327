//! Fluent registration of operations and their middleware.
//!
//! [`ServiceBuilder`] accumulates typed operation recipes, each a
//! handler plus the stages wrapped around it, and compiles them into an
//! immutable [`Service`]. A recipe keeps its concrete request and
//! response types until `build`, so a stage that disagrees with its
//! handler is rejected at registration rather than during traffic.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use praxis_core::{Deps, FaultTable, Handler, ValueCache};
use praxis_middleware::{BoxedMiddleware, Chain, Middleware};

use crate::service::{CompiledOp, Service};

/// The reason [`ServiceBuilder::build`] could not produce a service.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No store was supplied. Handlers receive their dependencies
    /// through [`Deps`], and a `Deps` cannot exist without its store.
    #[error("service is missing its store; supply one with `ServiceBuilder::store`")]
    MissingStore,
}

/// One registered operation with its concrete types erased, so recipes
/// for different operations can share a single map.
trait AnyRecipe<S>: Send + Sync {
    /// Compiles this recipe into a chain over `deps`. Runs freshly per
    /// call, so services built from the same recipe never share a
    /// compiled graph.
    fn compile(&self, deps: Deps<S>) -> CompiledOp;

    /// Recovers the typed recipe so a stage can be attached.
    fn as_any_mut(&mut self) -> &mut (dyn Any + Send);

    fn request_type(&self) -> &'static str;

    fn response_type(&self) -> &'static str;
}

struct Recipe<S, Req, Res> {
    handler: Arc<dyn Handler<S, Req, Res>>,
    stages: Vec<BoxedMiddleware<Req, Res>>,
}

impl<S, Req, Res> AnyRecipe<S> for Recipe<S, Req, Res>
where
    S: Send + Sync + 'static,
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn compile(&self, deps: Deps<S>) -> CompiledOp {
        let chain = Chain::compile(self.stages.clone(), Arc::clone(&self.handler), deps);
        CompiledOp {
            stage_names: chain.stage_names().to_vec(),
            request_type: type_name::<Req>(),
            response_type: type_name::<Res>(),
            chain: Box::new(chain),
        }
    }

    fn as_any_mut(&mut self) -> &mut (dyn Any + Send) {
        self
    }

    fn request_type(&self) -> &'static str {
        type_name::<Req>()
    }

    fn response_type(&self) -> &'static str {
        type_name::<Res>()
    }
}

/// Assembles operations, middleware, and shared collaborators into a
/// [`Service`].
///
/// The builder is the only mutable phase of a service's life. Once
/// `build` returns, the service is immutable; to change anything, build
/// again. `build` borrows rather than consumes, so one configuration
/// can produce any number of independent services.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use praxis_core::{Deps, OpContext, OpResult};
/// use praxis_service::ServiceBuilder;
///
/// struct Counters;
///
/// async fn double(_ctx: OpContext, _deps: Deps<Counters>, n: u64) -> OpResult<u64> {
///     Ok(n * 2)
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let service = ServiceBuilder::new()
///     .store(Counters)
///     .operation("double", double)
///     .build()
///     .unwrap();
///
/// let out: u64 = service.invoke(OpContext::new(), "double", 21_u64).await.unwrap();
/// assert_eq!(out, 42);
/// # }
/// ```
pub struct ServiceBuilder<S> {
    store: Option<Arc<S>>,
    cache: Option<Arc<dyn ValueCache>>,
    faults: FaultTable,
    verbose_faults: bool,
    recipes: HashMap<String, Box<dyn AnyRecipe<S>>>,
}

impl<S> ServiceBuilder<S> {
    /// Creates an empty builder carrying the standard fault table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: None,
            cache: None,
            faults: FaultTable::standard(),
            verbose_faults: false,
            recipes: HashMap::new(),
        }
    }

    /// Sets the store handlers receive through [`Deps`]. Mandatory.
    #[must_use]
    pub fn store(mut self, store: impl Into<Arc<S>>) -> Self {
        self.store = Some(store.into());
        self
    }

    /// Attaches a cache, offered to handlers and stages through
    /// [`Deps::cache`].
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn ValueCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the standard fault table with a custom one.
    #[must_use]
    pub fn fault_table(mut self, table: FaultTable) -> Self {
        self.faults = table;
        self
    }

    /// Starts built services with fault chain details exposed in
    /// envelopes. Hidden unless asked for; the switch can also be
    /// flipped on a running service.
    #[must_use]
    pub fn verbose_faults(mut self, verbose: bool) -> Self {
        self.verbose_faults = verbose;
        self
    }
}

impl<S> ServiceBuilder<S>
where
    S: Send + Sync + 'static,
{
    /// Registers an operation under `name`.
    ///
    /// The handler fixes the operation's request and response types;
    /// middleware attached later must agree with them. Registering a
    /// name twice replaces the earlier recipe, stages included.
    #[must_use]
    pub fn operation<Req, Res, H>(mut self, name: impl Into<String>, handler: H) -> Self
    where
        Req: Send + 'static,
        Res: Send + 'static,
        H: Handler<S, Req, Res>,
    {
        self.recipes.insert(
            name.into(),
            Box::new(Recipe {
                handler: Arc::new(handler),
                stages: Vec::new(),
            }),
        );
        self
    }

    /// Wraps `operation` in one more middleware stage.
    ///
    /// Stages run in registration order, first registered outermost.
    ///
    /// # Panics
    ///
    /// Panics if `operation` has not been registered, or if the stage's
    /// request and response types differ from the handler's. Both are
    /// wiring mistakes, reported where the wiring happens.
    #[must_use]
    pub fn middleware<Req, Res, M>(mut self, operation: &str, stage: M) -> Self
    where
        Req: Send + 'static,
        Res: Send + 'static,
        M: Middleware<Req, Res>,
    {
        let Some(recipe) = self.recipes.get_mut(operation) else {
            panic!("middleware attached to unknown operation '{operation}'");
        };
        let (registered_req, registered_res) = (recipe.request_type(), recipe.response_type());
        let Some(typed) = recipe.as_any_mut().downcast_mut::<Recipe<S, Req, Res>>() else {
            panic!(
                "middleware for operation '{operation}' handles {} -> {}, \
                 but the operation was registered as {registered_req} -> {registered_res}",
                type_name::<Req>(),
                type_name::<Res>(),
            );
        };
        typed.stages.push(Arc::new(stage));
        self
    }

    /// Compiles every registered operation into an immutable [`Service`].
    ///
    /// Each call compiles fresh chains, so repeated builds yield
    /// services that share nothing but the recipes' stage handles.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingStore`] if no store was supplied.
    /// Nothing else fails here: an empty service is legal, and stage
    /// misuse already panicked at registration.
    pub fn build(&self) -> Result<Service, BuildError> {
        let store = self.store.clone().ok_or(BuildError::MissingStore)?;
        let mut deps = Deps::new(store);
        if let Some(cache) = &self.cache {
            deps = deps.with_cache(Arc::clone(cache));
        }

        let ops: HashMap<String, CompiledOp> = self
            .recipes
            .iter()
            .map(|(name, recipe)| (name.clone(), recipe.compile(deps.clone())))
            .collect();

        tracing::debug!(operations = ops.len(), "service compiled");
        Ok(Service::from_parts(ops, self.faults.clone(), self.verbose_faults))
    }
}

impl<S> Default for ServiceBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for ServiceBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBuilder")
            .field("store", &self.store.is_some())
            .field("cache", &self.cache.is_some())
            .field("operations", &self.recipes.keys().collect::<Vec<_>>())
            .finish()
    }
}
