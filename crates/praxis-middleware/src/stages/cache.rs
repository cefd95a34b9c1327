//! Response caching stage.
//!
//! Serves repeated requests from a shared [`ValueCache`] instead of the
//! handler. Responses are stored as serialised JSON bytes, which keeps
//! one cache usable across operations with different response types.
//!
//! A cache hit short-circuits the inner chain with a successful result;
//! stages registered outside the cache still run their post phases.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use praxis_core::{BoxFuture, OpContext, OpResult, ValueCache};

use crate::middleware::{Middleware, Next};

/// Key derivation for cacheable requests.
///
/// Returning `None` bypasses the cache for that request, which is how
/// mutating or uncacheable variants of an operation opt out.
pub trait CacheKey {
    /// Returns the cache key for this request, if it is cacheable.
    fn cache_key(&self) -> Option<String>;
}

/// Middleware stage that caches successful responses.
///
/// Only successful results are stored; faults pass through untouched.
/// Undecodable entries are dropped and the invocation falls through to
/// the handler, so a stale schema never breaks an operation.
#[derive(Clone)]
pub struct CacheStage {
    cache: Arc<dyn ValueCache>,
}

impl CacheStage {
    /// Creates a stage over the given cache.
    #[must_use]
    pub fn new(cache: Arc<dyn ValueCache>) -> Self {
        Self { cache }
    }
}

impl std::fmt::Debug for CacheStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStage").finish_non_exhaustive()
    }
}

impl<Req, Res> Middleware<Req, Res> for CacheStage
where
    Req: CacheKey + Send + 'static,
    Res: Serialize + DeserializeOwned + Send + 'static,
{
    fn name(&self) -> &'static str {
        "cache"
    }

    fn process(
        &self,
        ctx: OpContext,
        request: Req,
        next: Next<Req, Res>,
    ) -> BoxFuture<'static, OpResult<Res>> {
        let cache = Arc::clone(&self.cache);
        Box::pin(async move {
            let Some(key) = request.cache_key() else {
                return next.run(ctx, request).await;
            };

            if let Some(bytes) = cache.get(&key) {
                match serde_json::from_slice::<Res>(&bytes) {
                    Ok(hit) => {
                        tracing::debug!(key = %key, "cache hit");
                        return Ok(hit);
                    }
                    Err(err) => {
                        tracing::warn!(key = %key, error = %err, "dropping undecodable cache entry");
                        cache.invalidate(&key);
                    }
                }
            }

            let response = next.run(ctx, request).await?;
            match serde_json::to_vec(&response) {
                Ok(bytes) => cache.put(&key, Bytes::from(bytes)),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "response not cached");
                }
            }
            Ok(response)
        })
    }
}
