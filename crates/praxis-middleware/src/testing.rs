//! Test support for chain and service tests.
//!
//! The [`Recorder`] and its [`RecordingStage`] give tests across the
//! workspace a uniform way to assert execution order through a chain.
//!
//! # Example
//!
//! ```
//! use praxis_middleware::testing::Recorder;
//!
//! let recorder = Recorder::new();
//! recorder.note("handler");
//! assert_eq!(recorder.events(), vec!["handler"]);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use praxis_core::{BoxFuture, OpContext, OpResult};

use crate::middleware::{Middleware, Next};

/// A shared, ordered event log.
///
/// Clones share the same log, so one recorder can be handed to several
/// stages and the handler at once.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one event.
    pub fn note(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    /// Returns a snapshot of all events in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Creates a stage that notes `<name>:pre` on the way in and
    /// `<name>:post` on the way out.
    #[must_use]
    pub fn stage(&self, name: &'static str) -> RecordingStage {
        RecordingStage {
            name,
            recorder: self.clone(),
        }
    }
}

/// A pass-through stage that records its pre and post phases.
#[derive(Debug, Clone)]
pub struct RecordingStage {
    name: &'static str,
    recorder: Recorder,
}

impl<Req, Res> Middleware<Req, Res> for RecordingStage
where
    Req: Send + 'static,
    Res: Send + 'static,
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
        let recorder = self.recorder.clone();
        let name = self.name;
        Box::pin(async move {
            recorder.note(format!("{name}:pre"));
            let result = next.run(ctx, request).await;
            recorder.note(format!("{name}:post"));
            result
        })
    }
}
