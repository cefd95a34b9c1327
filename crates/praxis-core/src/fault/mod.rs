//! The two-layer fault taxonomy.
//!
//! The inner layer is identity: a [`FaultKind`] names a domain failure
//! category and nothing else. The outer layer is policy: a [`FaultTable`]
//! maps each kind (plus the two cancellation signals) to the stable code,
//! human message, and status class a caller should see, and a [`Resolver`]
//! walks an error's wrap chain to pick the mapping.
//!
//! Keeping the layers apart means business code never mentions codes or
//! statuses, and transport code never inspects error internals.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use praxis_core::{Fault, FaultKind, FaultTable, Resolver, StatusClass};
//!
//! let resolver = Resolver::new(Arc::new(FaultTable::standard()));
//!
//! let err = Fault::new(FaultKind::NOT_FOUND, "note 42 does not exist")
//!     .wrap("loading note for update");
//!
//! let mapping = resolver.resolve(&err);
//! assert_eq!(mapping.code(), "NOT_FOUND");
//! assert_eq!(mapping.status(), StatusClass::NotFound);
//! ```

mod envelope;
mod kind;
mod resolve;
mod table;

pub use envelope::{DetailVisibility, FaultEnvelope};
pub use kind::FaultKind;
pub use resolve::Resolver;
pub use table::{FaultMapping, FaultTable, FaultTableBuilder, Signal, StatusClass};

use std::error::Error;
use std::fmt;

use crate::context::{Cancelled, DeadlineExceeded};

/// Result alias used by handlers, middleware, and services.
pub type OpResult<T> = Result<T, Fault>;

/// A domain failure with optional kind identity and optional cause.
///
/// A `Fault` either carries a [`FaultKind`] (a classified domain failure)
/// or does not (an unclassified internal failure, or a context layer
/// wrapped around a deeper cause). Wrapping never erases the inner kind:
/// the resolver walks the `source` chain, so
/// `Fault::new(kind, ..).wrap("ctx")` still resolves to `kind`.
#[derive(Debug)]
pub struct Fault {
    kind: Option<FaultKind>,
    message: String,
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl Fault {
    /// Creates a classified fault with the given kind and message.
    #[must_use]
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a [`FaultKind::MISSING_REQUIRED`] fault for a named field.
    #[must_use]
    pub fn missing_required(field: impl fmt::Display) -> Self {
        Self::new(
            FaultKind::MISSING_REQUIRED,
            format!("required field '{field}' is missing or empty"),
        )
    }

    /// Creates a [`FaultKind::OUT_OF_RANGE`] fault.
    #[must_use]
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(FaultKind::OUT_OF_RANGE, message)
    }

    /// Creates a [`FaultKind::INVALID_TYPE`] fault.
    #[must_use]
    pub fn invalid_type(message: impl Into<String>) -> Self {
        Self::new(FaultKind::INVALID_TYPE, message)
    }

    /// Creates a [`FaultKind::DUPLICATE`] fault.
    #[must_use]
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(FaultKind::DUPLICATE, message)
    }

    /// Creates a [`FaultKind::NOT_FOUND`] fault.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FaultKind::NOT_FOUND, message)
    }

    /// Creates an unclassified internal fault.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unclassified internal fault wrapping an underlying cause.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: None,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Attaches an underlying cause to this fault, keeping its kind.
    #[must_use]
    pub fn with_source(mut self, source: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Wraps this fault in a new context layer.
    ///
    /// The outer layer carries no kind of its own; resolution walks
    /// through it to whatever the chain holds underneath.
    #[must_use]
    pub fn wrap(self, message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
            source: Some(Box::new(self)),
        }
    }

    /// Returns this fault's own kind, if it carries one.
    ///
    /// This does not walk the chain; use a
    /// [`Resolver`] to classify a wrapped fault.
    #[must_use]
    pub fn kind(&self) -> Option<FaultKind> {
        self.kind
    }

    /// Returns the message of this layer.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|cause| cause.as_ref() as &(dyn Error + 'static))
    }
}

impl From<Cancelled> for Fault {
    fn from(signal: Cancelled) -> Self {
        Self {
            kind: None,
            message: signal.to_string(),
            source: Some(Box::new(signal)),
        }
    }
}

impl From<DeadlineExceeded> for Fault {
    fn from(signal: DeadlineExceeded) -> Self {
        Self {
            kind: None,
            message: signal.to_string(),
            source: Some(Box::new(signal)),
        }
    }
}

impl From<anyhow::Error> for Fault {
    fn from(err: anyhow::Error) -> Self {
        Self {
            kind: None,
            message: err.to_string(),
            source: Some(err.into()),
        }
    }
}
