//! Caller-facing rendering of a resolved fault.

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use super::resolve::chain;
use super::{FaultMapping, StatusClass};
use crate::context::InvocationId;

/// Process-wide switch controlling whether envelopes carry raw error text.
///
/// Shared behind an `Arc` between whoever flips it and whoever renders
/// envelopes. Defaults to hidden, which is what production wants; tests
/// and local debugging turn it on.
#[derive(Debug, Default)]
pub struct DetailVisibility {
    verbose: AtomicBool,
}

impl DetailVisibility {
    /// Creates a switch in the given state.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose: AtomicBool::new(verbose),
        }
    }

    /// Returns `true` if raw error text may be exposed.
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    /// Flips the switch.
    pub fn set_verbose(&self, verbose: bool) {
        self.verbose.store(verbose, Ordering::Relaxed);
    }
}

/// The serialisable shape a caller receives for a failed invocation.
///
/// `code`, `message`, and `status` always come from the resolved
/// [`FaultMapping`], never from the raw error. The raw chain text rides
/// along in `detail` only when [`DetailVisibility`] allows it, and never
/// for internal faults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultEnvelope {
    /// Stable machine-readable code.
    pub code: String,
    /// Canned human-readable message.
    pub message: String,
    /// Transport-neutral status family.
    pub status: StatusClass,
    /// Raw error chain text, when visibility allows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The invocation this envelope answers, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<InvocationId>,
}

impl FaultMapping {
    /// Renders this mapping into an envelope for one failed invocation.
    #[must_use]
    pub fn envelope(
        &self,
        err: &(dyn Error + 'static),
        visibility: &DetailVisibility,
        invocation_id: Option<InvocationId>,
    ) -> FaultEnvelope {
        let detail = (visibility.is_verbose() && self.status() != StatusClass::Internal)
            .then(|| chain_text(err));
        FaultEnvelope {
            code: self.code().to_owned(),
            message: self.message().to_owned(),
            status: self.status(),
            detail,
            invocation_id,
        }
    }
}

/// Joins the display of every chain link, outermost first.
fn chain_text(err: &(dyn Error + 'static)) -> String {
    let mut text = String::new();
    for (index, link) in chain(err).enumerate() {
        if index > 0 {
            text.push_str(": ");
        }
        text.push_str(&link.to_string());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{Fault, FaultTable, Resolver};
    use std::sync::Arc;

    fn resolver() -> Resolver {
        Resolver::new(Arc::new(FaultTable::standard()))
    }

    #[test]
    fn test_hidden_by_default() {
        let resolver = resolver();
        let err = Fault::not_found("note 9 does not exist");
        let envelope = resolver
            .resolve(&err)
            .envelope(&err, &DetailVisibility::default(), None);

        assert_eq!(envelope.code, "NOT_FOUND");
        assert_eq!(envelope.message, "The requested resource was not found.");
        assert!(envelope.detail.is_none());
    }

    #[test]
    fn test_verbose_exposes_the_chain_text() {
        let resolver = resolver();
        let err = Fault::duplicate("slug taken").wrap("saving note");
        let envelope = resolver
            .resolve(&err)
            .envelope(&err, &DetailVisibility::new(true), None);

        assert_eq!(envelope.detail.as_deref(), Some("saving note: slug taken"));
    }

    #[test]
    fn test_internal_faults_never_leak_detail() {
        let resolver = resolver();
        let err = Fault::internal("password for db is hunter2");
        let envelope = resolver
            .resolve(&err)
            .envelope(&err, &DetailVisibility::new(true), None);

        assert_eq!(envelope.code, "INTERNAL");
        assert!(envelope.detail.is_none());
        assert!(!envelope.message.contains("hunter2"));
    }

    #[test]
    fn test_envelope_serialises_without_empty_fields() {
        let resolver = resolver();
        let err = Fault::missing_required("title");
        let envelope = resolver
            .resolve(&err)
            .envelope(&err, &DetailVisibility::default(), None);

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["code"], "MISSING_REQUIRED");
        assert_eq!(json["status"], "bad_request");
        assert!(json.get("detail").is_none());
        assert!(json.get("invocation_id").is_none());
    }

    #[test]
    fn test_envelope_carries_the_invocation_id() {
        let resolver = resolver();
        let id = InvocationId::new();
        let err = Fault::out_of_range("page size above 500");
        let envelope =
            resolver
                .resolve(&err)
                .envelope(&err, &DetailVisibility::default(), Some(id));

        assert_eq!(envelope.invocation_id, Some(id));
    }
}
