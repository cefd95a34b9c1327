//! # Praxis Middleware
//!
//! Middleware chain composition for the Praxis operation framework.
//!
//! Each operation gets its own onion of middleware stages wrapped around
//! its core handler. Stages see the typed request on the way in and the
//! typed result on the way out, and may short-circuit either direction:
//!
//! ```text
//! Request → A pre → B pre → C pre → Handler
//!                                      ↓
//! Result  ← A post ← B post ← C post ←┘
//! ```
//!
//! ## Key Properties
//!
//! - **Compile once**: [`Chain::compile`] folds the stages around the
//!   handler a single time; invocations reuse the compiled graph and
//!   only bump reference counts.
//! - **First registered runs outermost**: registration order is
//!   execution order for pre phases, reversed for post phases.
//! - **Short-circuit honours the onion**: a stage that never calls
//!   [`Next::run`] skips everything inward; outer stages still see the
//!   result on the way out.
//! - **Typed end to end**: stages are generic over the operation's
//!   request and response types, no `Any` in the hot path.
//!
//! ## Example
//!
//! ```
//! use praxis_middleware::Chain;
//! use praxis_middleware::testing::Recorder;
//! use praxis_core::{Deps, OpContext, OpResult};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! async fn shout(_ctx: OpContext, _deps: Deps<()>, req: String) -> OpResult<String> {
//!     Ok(req.to_uppercase())
//! }
//!
//! let recorder = Recorder::new();
//! let chain = Chain::compile(
//!     vec![Arc::new(recorder.stage("outer")), Arc::new(recorder.stage("inner"))],
//!     Arc::new(shout),
//!     Deps::new(Arc::new(())),
//! );
//!
//! let out = chain.call(OpContext::new(), "hi".to_owned()).await.unwrap();
//! assert_eq!(out, "HI");
//! assert_eq!(
//!     recorder.events(),
//!     vec!["outer:pre", "inner:pre", "inner:post", "outer:post"]
//! );
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/praxis-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod middleware;
pub mod stages;
pub mod testing;

// Re-export main types at crate root
pub use chain::Chain;
pub use middleware::{BoxedMiddleware, FnMiddleware, Middleware, Next};
pub use praxis_core::BoxFuture;
