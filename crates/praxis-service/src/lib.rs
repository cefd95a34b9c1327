//! Operation assembly and dispatch for the Praxis framework.
//!
//! This crate is where the pieces meet: handlers from business code,
//! middleware stages from `praxis-middleware`, and the fault taxonomy
//! from `praxis-core` come together in a [`ServiceBuilder`] and come
//! out as an immutable [`Service`].
//!
//! - Registration is typed. An operation's handler fixes its request
//!   and response types, and every stage attached to it must agree.
//! - Chains are compiled once, at [`ServiceBuilder::build`]. Invoking
//!   never recomposes middleware.
//! - The built service is immutable and shares safely across tasks.
//!   `build` can be called repeatedly for independent services.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use praxis_core::{Deps, Fault, OpContext, OpResult};
//! use praxis_service::ServiceBuilder;
//!
//! struct Greetings;
//!
//! async fn greet(_ctx: OpContext, _deps: Deps<Greetings>, name: String) -> OpResult<String> {
//!     if name.trim().is_empty() {
//!         return Err(Fault::missing_required("name"));
//!     }
//!     Ok(format!("hello, {name}"))
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = ServiceBuilder::new()
//!     .store(Greetings)
//!     .operation("greet", greet)
//!     .build()
//!     .unwrap();
//!
//! let out: String = service
//!     .invoke(OpContext::new(), "greet", "praxis".to_owned())
//!     .await
//!     .unwrap();
//! assert_eq!(out, "hello, praxis");
//!
//! // Faults come back as values; the service renders them for callers.
//! let fault = service
//!     .invoke::<String, String>(OpContext::new(), "greet", String::new())
//!     .await
//!     .unwrap_err();
//! assert_eq!(service.envelope(&fault, None).code, "MISSING_REQUIRED");
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/praxis-service/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod service;

pub use builder::{BuildError, ServiceBuilder};
pub use service::Service;
