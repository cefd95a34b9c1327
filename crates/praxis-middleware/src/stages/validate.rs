//! Request validation stage.
//!
//! Rejects malformed requests before the handler runs. The stage only
//! decides placement and short-circuiting; what "valid" means lives on
//! the request type through the [`Validate`] trait, so validation rules
//! stay next to the data they describe.

use std::fmt;

use praxis_core::{BoxFuture, Fault, OpContext, OpResult};

use crate::middleware::{Middleware, Next};

/// A request type that can check its own shape.
///
/// Implementations return classified faults, typically built with the
/// helpers below, so failures map to stable caller-visible codes.
pub trait Validate {
    /// Checks this request, reporting the first problem found.
    ///
    /// # Errors
    ///
    /// Returns a classified [`Fault`] describing the offending field.
    fn validate(&self) -> OpResult<()>;
}

/// Middleware stage that runs [`Validate::validate`] on the way in.
///
/// On failure the inner chain and the handler never run; stages
/// registered outside this one still see the fault on the way out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateStage;

impl ValidateStage {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<Req, Res> Middleware<Req, Res> for ValidateStage
where
    Req: Validate + Send + 'static,
    Res: Send + 'static,
{
    fn name(&self) -> &'static str {
        "validate"
    }

    fn process(
        &self,
        ctx: OpContext,
        request: Req,
        next: Next<Req, Res>,
    ) -> BoxFuture<'static, OpResult<Res>> {
        Box::pin(async move {
            if let Err(fault) = request.validate() {
                tracing::debug!(
                    operation = ctx.operation().unwrap_or("unknown"),
                    invocation_id = %ctx.invocation_id(),
                    fault = %fault,
                    "request rejected by validation"
                );
                return Err(fault);
            }
            next.run(ctx, request).await
        })
    }
}

/// Checks that a string field is present and non-blank.
///
/// # Errors
///
/// Returns a [`FaultKind::MISSING_REQUIRED`] fault naming the field.
///
/// [`FaultKind::MISSING_REQUIRED`]: praxis_core::FaultKind::MISSING_REQUIRED
pub fn require_non_empty(field: &str, value: &str) -> OpResult<()> {
    if value.trim().is_empty() {
        return Err(Fault::missing_required(field));
    }
    Ok(())
}

/// Checks that a value lies within an inclusive range.
///
/// # Errors
///
/// Returns a [`FaultKind::OUT_OF_RANGE`] fault naming the field and
/// bounds.
///
/// [`FaultKind::OUT_OF_RANGE`]: praxis_core::FaultKind::OUT_OF_RANGE
pub fn require_in_range<T>(field: &str, value: T, min: T, max: T) -> OpResult<()>
where
    T: PartialOrd + fmt::Display,
{
    if value < min || value > max {
        return Err(Fault::out_of_range(format!(
            "field '{field}' must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}
