//! The outer taxonomy layer: kind-to-response mapping.

use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::FaultKind;

/// Transport-neutral status family for a resolved fault.
///
/// Wire adapters project a class onto their own vocabulary; the HTTP
/// projection ships here because every current caller wants it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    /// The request itself was malformed or failed validation.
    BadRequest,
    /// The referenced resource does not exist.
    NotFound,
    /// The request conflicts with existing state.
    Conflict,
    /// The caller abandoned the invocation.
    Cancelled,
    /// The invocation ran out of time.
    Timeout,
    /// Anything the service cannot blame on the caller.
    Internal,
}

impl StatusClass {
    /// Projects this class onto an HTTP status code.
    #[must_use]
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            // 499 is the conventional client-closed-request code; it has
            // no constant in the http crate.
            Self::Cancelled => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// What a table entry matches: a domain kind or a cancellation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Matches faults whose chain carries this kind.
    Kind(FaultKind),
    /// Matches faults whose chain carries [`Cancelled`](crate::Cancelled).
    Cancelled,
    /// Matches faults whose chain carries
    /// [`DeadlineExceeded`](crate::DeadlineExceeded).
    DeadlineExceeded,
}

/// One row of a [`FaultTable`]: the caller-visible rendering of a signal.
#[derive(Debug, Clone)]
pub struct FaultMapping {
    signal: Option<Signal>,
    code: String,
    message: String,
    status: StatusClass,
}

impl FaultMapping {
    fn new(signal: Option<Signal>, code: &str, message: &str, status: StatusClass) -> Self {
        Self {
            signal,
            code: code.to_owned(),
            message: message.to_owned(),
            status,
        }
    }

    /// Returns the signal this mapping matches, or `None` for the
    /// unclassified fallback row.
    #[must_use]
    pub fn signal(&self) -> Option<Signal> {
        self.signal
    }

    /// Returns the stable machine-readable code, e.g. `"NOT_FOUND"`.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the canned human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the status class.
    #[must_use]
    pub fn status(&self) -> StatusClass {
        self.status
    }
}

/// An ordered mapping from fault signals to caller-visible responses.
///
/// Row order is registration order, and the resolver honours it: when a
/// wrap chain somehow carries two kinds, the earlier row wins. The table
/// always holds exactly one fallback row for unclassified faults, kept
/// outside the ordered entries because it matches by default rather than
/// by signal.
///
/// # Example
///
/// ```
/// use praxis_core::{FaultKind, FaultTable, Signal, StatusClass};
///
/// let table = FaultTable::standard();
/// let row = table.get(Signal::Kind(FaultKind::DUPLICATE)).unwrap();
/// assert_eq!(row.code(), "DUPLICATE");
/// assert_eq!(row.status(), StatusClass::Conflict);
/// assert_eq!(table.fallback().code(), "INTERNAL");
/// ```
#[derive(Debug, Clone)]
pub struct FaultTable {
    entries: IndexMap<Signal, FaultMapping>,
    fallback: FaultMapping,
}

impl FaultTable {
    /// Returns a builder for a custom table.
    #[must_use]
    pub fn builder() -> FaultTableBuilder {
        FaultTableBuilder::default()
    }

    /// Returns the standard table covering every [`FaultKind`], both
    /// cancellation signals, and the internal fallback.
    #[must_use]
    pub fn standard() -> Self {
        Self::builder()
            .kind(
                FaultKind::MISSING_REQUIRED,
                "MISSING_REQUIRED",
                "A required field is missing or empty.",
                StatusClass::BadRequest,
            )
            .kind(
                FaultKind::OUT_OF_RANGE,
                "OUT_OF_RANGE",
                "A value is outside its permitted range.",
                StatusClass::BadRequest,
            )
            .kind(
                FaultKind::INVALID_TYPE,
                "INVALID_TYPE",
                "A value has the wrong type.",
                StatusClass::BadRequest,
            )
            .kind(
                FaultKind::DUPLICATE,
                "DUPLICATE",
                "The resource already exists.",
                StatusClass::Conflict,
            )
            .kind(
                FaultKind::NOT_FOUND,
                "NOT_FOUND",
                "The requested resource was not found.",
                StatusClass::NotFound,
            )
            .cancelled("CANCELLED", "The operation was cancelled by the caller.")
            .deadline_exceeded("DEADLINE_EXCEEDED", "The operation did not complete in time.")
            .build()
    }

    /// Looks up the row for one signal.
    #[must_use]
    pub fn get(&self, signal: Signal) -> Option<&FaultMapping> {
        self.entries.get(&signal)
    }

    /// Iterates the rows in registration order. The fallback is not
    /// part of the iteration.
    pub fn mappings(&self) -> impl Iterator<Item = &FaultMapping> {
        self.entries.values()
    }

    /// Returns the fallback row for unclassified faults.
    #[must_use]
    pub fn fallback(&self) -> &FaultMapping {
        &self.fallback
    }

    /// Returns the number of signal rows, excluding the fallback.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no signal rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FaultTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for a [`FaultTable`].
///
/// Rows are kept in the order they are added. Adding a second row for
/// the same signal replaces the first in place, so a table never holds
/// two rows for one kind.
#[derive(Debug, Default)]
pub struct FaultTableBuilder {
    entries: IndexMap<Signal, FaultMapping>,
    fallback: Option<FaultMapping>,
}

impl FaultTableBuilder {
    /// Adds a row for a domain kind.
    #[must_use]
    pub fn kind(
        mut self,
        kind: FaultKind,
        code: &str,
        message: &str,
        status: StatusClass,
    ) -> Self {
        let signal = Signal::Kind(kind);
        self.entries
            .insert(signal, FaultMapping::new(Some(signal), code, message, status));
        self
    }

    /// Adds the row for caller cancellation, with status
    /// [`StatusClass::Cancelled`].
    #[must_use]
    pub fn cancelled(mut self, code: &str, message: &str) -> Self {
        self.entries.insert(
            Signal::Cancelled,
            FaultMapping::new(Some(Signal::Cancelled), code, message, StatusClass::Cancelled),
        );
        self
    }

    /// Adds the row for deadline expiry, with status
    /// [`StatusClass::Timeout`].
    #[must_use]
    pub fn deadline_exceeded(mut self, code: &str, message: &str) -> Self {
        self.entries.insert(
            Signal::DeadlineExceeded,
            FaultMapping::new(
                Some(Signal::DeadlineExceeded),
                code,
                message,
                StatusClass::Timeout,
            ),
        );
        self
    }

    /// Overrides the fallback row for unclassified faults. The status is
    /// always [`StatusClass::Internal`].
    #[must_use]
    pub fn fallback(mut self, code: &str, message: &str) -> Self {
        self.fallback = Some(FaultMapping::new(None, code, message, StatusClass::Internal));
        self
    }

    /// Finishes the table. A default `INTERNAL` fallback row is supplied
    /// if none was set.
    #[must_use]
    pub fn build(self) -> FaultTable {
        let fallback = self.fallback.unwrap_or_else(|| {
            FaultMapping::new(None, "INTERNAL", "An internal error occurred.", StatusClass::Internal)
        });
        FaultTable {
            entries: self.entries,
            fallback,
        }
    }
}
