//! # Praxis Core
//!
//! Core types for the Praxis operation framework.
//!
//! This crate holds everything the rest of the workspace agrees on:
//!
//! - the fault taxonomy: [`FaultKind`] identities, the [`FaultTable`]
//!   mapping kinds to caller-visible responses, the chain-walking
//!   [`Resolver`], and the serialisable [`FaultEnvelope`];
//! - the per-invocation [`OpContext`] with its [`CancelSignal`];
//! - the [`Handler`] trait core business logic implements;
//! - the [`Deps`] collaborator bundle and the optional [`ValueCache`].
//!
//! Higher layers build on these: `praxis-middleware` composes handlers
//! into onion-shaped chains, and `praxis-service` assembles chains into
//! an immutable service.

#![doc(html_root_url = "https://docs.rs/praxis-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod context;
mod deps;
pub mod fault;
mod handler;

pub use cache::{MemoryCache, ValueCache};
pub use context::{CancelSignal, Cancelled, DeadlineExceeded, InvocationId, OpContext};
pub use deps::Deps;
pub use fault::{
    DetailVisibility, Fault, FaultEnvelope, FaultKind, FaultMapping, FaultTable,
    FaultTableBuilder, OpResult, Resolver, Signal, StatusClass,
};
pub use handler::{BoxFuture, Handler};
