//! The collaborator bundle handed to handlers.

use std::fmt;
use std::sync::Arc;

use crate::cache::ValueCache;

/// Collaborators captured when a service is built and shared by every
/// invocation of its operations.
///
/// The store `S` is mandatory and typed; the cache is optional and
/// erased. Cloning is cheap, everything inside is reference-counted.
pub struct Deps<S> {
    store: Arc<S>,
    cache: Option<Arc<dyn ValueCache>>,
}

impl<S> Deps<S> {
    /// Bundles a store with no optional collaborators.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store, cache: None }
    }

    /// Attaches a shared cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ValueCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns an owned handle to the store, for work that outlives the
    /// current borrow.
    #[must_use]
    pub fn store_arc(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Returns the cache, if one was attached.
    #[must_use]
    pub fn cache(&self) -> Option<&dyn ValueCache> {
        self.cache.as_deref()
    }
}

// Derived Clone would demand S: Clone; only the Arcs are cloned here.
impl<S> Clone for Deps<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: self.cache.clone(),
        }
    }
}

impl<S> fmt::Debug for Deps<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deps")
            .field("store", &std::any::type_name::<S>())
            .field("cache", &self.cache.is_some())
            .finish()
    }
}
