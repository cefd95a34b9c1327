//! Invocation rate limiting stage.
//!
//! Protects a service from bursts by capping how many invocations pass
//! in a sliding time window. The window count weights the previous
//! window by how much of the current one has elapsed, which smooths the
//! boundary a fixed window would have.
//!
//! A limited invocation short-circuits with an out-of-range fault; the
//! handler and inner stages never run.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use praxis_middleware::stages::RateLimitStage;
//!
//! let stage = RateLimitStage::builder()
//!     .limit(100)
//!     .window(Duration::from_secs(60))
//!     .per_operation()
//!     .build();
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use praxis_core::{BoxFuture, Fault, OpContext, OpResult};
use tokio::sync::Mutex;

use crate::middleware::{Middleware, Next};

/// How invocations are grouped for limiting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyScope {
    /// One shared budget for the whole service.
    #[default]
    Global,
    /// A separate budget per operation name.
    PerOperation,
}

/// Rate limiting middleware stage.
///
/// Clones share the same window state, so registering one stage
/// instance on several operations gives them a common budget.
#[derive(Debug)]
pub struct RateLimitStage {
    config: RateLimitConfig,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl Clone for RateLimitStage {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            windows: Arc::clone(&self.windows),
        }
    }
}

/// Configuration for the rate limit stage.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    limit: u64,
    window: Duration,
    scope: KeyScope,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            window: Duration::from_secs(60),
            scope: KeyScope::default(),
        }
    }
}

/// Counters for one key.
#[derive(Debug)]
struct Window {
    count: u64,
    started_at: Instant,
    prev_count: u64,
}

/// Builder for [`RateLimitStage`].
#[derive(Debug, Clone, Default)]
pub struct RateLimitBuilder {
    config: RateLimitConfig,
}

impl RateLimitBuilder {
    /// Creates a builder with the default budget of 100 per minute.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of invocations per window.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.config.limit = limit;
        self
    }

    /// Sets the window length.
    #[must_use]
    pub fn window(mut self, window: Duration) -> Self {
        self.config.window = window;
        self
    }

    /// Sets the window length in seconds.
    #[must_use]
    pub fn window_secs(self, seconds: u64) -> Self {
        self.window(Duration::from_secs(seconds))
    }

    /// Gives every operation its own budget.
    #[must_use]
    pub fn per_operation(mut self) -> Self {
        self.config.scope = KeyScope::PerOperation;
        self
    }

    /// Shares one budget across all operations.
    #[must_use]
    pub fn global(mut self) -> Self {
        self.config.scope = KeyScope::Global;
        self
    }

    /// Builds the stage.
    #[must_use]
    pub fn build(self) -> RateLimitStage {
        RateLimitStage {
            config: self.config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Outcome of one limit check.
enum Gate {
    Allowed,
    Limited { retry_in: Duration },
}

impl RateLimitStage {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> RateLimitBuilder {
        RateLimitBuilder::new()
    }

    /// Creates a stage with the default budget of 100 per minute,
    /// shared across operations.
    #[must_use]
    pub fn default_limits() -> Self {
        RateLimitBuilder::new().build()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn key_for(&self, ctx: &OpContext) -> String {
        match self.config.scope {
            KeyScope::Global => "global".to_owned(),
            KeyScope::PerOperation => ctx.operation().unwrap_or("unknown").to_owned(),
        }
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn check(&self, key: &str) -> Gate {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        let window = self.config.window;
        let limit = self.config.limit;

        let data = windows.entry(key.to_owned()).or_insert_with(|| Window {
            count: 0,
            started_at: now,
            prev_count: 0,
        });

        let elapsed = now.duration_since(data.started_at);
        if elapsed >= window {
            // Past two whole windows the history is worthless.
            data.prev_count = if elapsed >= window * 2 { 0 } else { data.count };
            data.count = 0;
            data.started_at = now;
        }

        let progress =
            now.duration_since(data.started_at).as_secs_f64() / window.as_secs_f64();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let weighted = data.count + (data.prev_count as f64 * (1.0 - progress)) as u64;

        if weighted >= limit {
            let retry_in = window.saturating_sub(now.duration_since(data.started_at));
            Gate::Limited { retry_in }
        } else {
            data.count += 1;
            Gate::Allowed
        }
    }
}

impl<Req, Res> Middleware<Req, Res> for RateLimitStage
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn process(
        &self,
        ctx: OpContext,
        request: Req,
        next: Next<Req, Res>,
    ) -> BoxFuture<'static, OpResult<Res>> {
        let stage = self.clone();
        Box::pin(async move {
            let key = stage.key_for(&ctx);
            match stage.check(&key).await {
                Gate::Allowed => next.run(ctx, request).await,
                Gate::Limited { retry_in } => {
                    tracing::warn!(
                        key = %key,
                        retry_in_ms = u64::try_from(retry_in.as_millis()).unwrap_or(u64::MAX),
                        "invocation rate limited"
                    );
                    Err(Fault::out_of_range(format!(
                        "rate limit of {} per {:?} exceeded for '{}'",
                        stage.config.limit, stage.config.window, key
                    )))
                }
            }
        })
    }
}
