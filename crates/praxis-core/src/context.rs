//! Per-invocation context and cooperative cancellation.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::fault::{Fault, OpResult};

/// A unique identifier for one invocation, using UUID v7 for
/// time-ordered sortability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID, for callers that propagate ids across
    /// process boundaries.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for InvocationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// The error an invocation returns after its caller abandoned it.
///
/// Travels through fault chains unmodified so the resolver can always
/// recognise cancellation, no matter how many layers wrapped it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// The error an invocation returns after running past its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded;

impl fmt::Display for DeadlineExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation deadline exceeded")
    }
}

impl std::error::Error for DeadlineExceeded {}

/// Cooperative cancellation signal shared by everyone working on one
/// invocation.
///
/// Clones observe the same state. Cancelling is sticky: once triggered,
/// [`is_cancelled`](Self::is_cancelled) stays `true` and
/// [`cancelled`](Self::cancelled) resolves immediately.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    triggered: Arc<AtomicBool>,
    sender: broadcast::Sender<()>,
}

impl CancelSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Triggers the signal, waking every waiter.
    pub fn cancel(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        // No receivers is fine; the flag alone is authoritative.
        let _ = self.sender.send(());
    }

    /// Returns `true` once the signal has been triggered.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Waits until the signal is triggered.
    pub async fn cancelled(&self) {
        // Subscribe before reading the flag so a trigger between the two
        // steps is never missed.
        let mut receiver = self.sender.subscribe();
        if self.is_cancelled() {
            return;
        }
        let _ = receiver.recv().await;
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Ambient state for one invocation.
///
/// The context is created by the caller, threaded through every
/// middleware stage and into the handler, and never replaced along the
/// way. Clones share the same cancellation signal.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use praxis_core::OpContext;
///
/// let ctx = OpContext::new().with_timeout(Duration::from_secs(5));
/// assert!(ctx.ensure_live().is_ok());
///
/// ctx.cancel_signal().cancel();
/// assert!(ctx.ensure_live().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct OpContext {
    invocation_id: InvocationId,
    operation: Option<Arc<str>>,
    started_at: Instant,
    deadline: Option<Instant>,
    cancel: CancelSignal,
}

impl OpContext {
    /// Creates a context with a fresh invocation id and no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            invocation_id: InvocationId::new(),
            operation: None,
            started_at: Instant::now(),
            deadline: None,
            cancel: CancelSignal::new(),
        }
    }

    /// Records the operation name this context is serving. The service
    /// stamps this at dispatch; callers rarely need to.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<Arc<str>>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Sets an absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.with_deadline(deadline)
    }

    /// Returns the invocation id.
    #[must_use]
    pub fn invocation_id(&self) -> InvocationId {
        self.invocation_id
    }

    /// Returns the operation name, once stamped.
    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// Returns the time elapsed since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Returns the deadline, if one was set.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the shared cancellation signal.
    #[must_use]
    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Fails fast if the invocation should stop.
    ///
    /// Returns a cancellation fault once the signal has been triggered,
    /// or a deadline fault once the deadline has passed. Long-running
    /// handlers call this between steps; the service calls it before
    /// dispatch so pre-cancelled work never starts.
    ///
    /// # Errors
    ///
    /// Returns a [`Fault`] wrapping [`Cancelled`] or [`DeadlineExceeded`].
    pub fn ensure_live(&self) -> OpResult<()> {
        if self.cancel.is_cancelled() {
            return Err(Fault::from(Cancelled));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Fault::from(DeadlineExceeded));
            }
        }
        Ok(())
    }
}

impl Default for OpContext {
    fn default() -> Self {
        Self::new()
    }
}
