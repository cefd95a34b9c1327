//! Chain-walking fault resolution.

use std::error::Error;
use std::sync::Arc;

use super::{Fault, FaultKind, FaultMapping, FaultTable, Signal};

/// Resolves any error into a row of a [`FaultTable`].
///
/// Resolution walks the full `source()` chain of the error and picks,
/// in order of precedence:
///
/// 1. the cancellation row, if any link is a [`Cancelled`] signal;
/// 2. the deadline row, if any link is a [`DeadlineExceeded`] signal;
/// 3. the earliest-registered row whose kind appears anywhere in the
///    chain;
/// 4. the table's fallback row.
///
/// Resolution is pure: it never mutates the error or the table, and the
/// same error always resolves to the same row. Wrapping an error in
/// extra context layers does not change the outcome.
///
/// [`Cancelled`]: crate::Cancelled
/// [`DeadlineExceeded`]: crate::DeadlineExceeded
#[derive(Debug, Clone)]
pub struct Resolver {
    table: Arc<FaultTable>,
}

impl Resolver {
    /// Creates a resolver over the given table.
    #[must_use]
    pub fn new(table: Arc<FaultTable>) -> Self {
        Self { table }
    }

    /// Returns the table this resolver reads.
    #[must_use]
    pub fn table(&self) -> &FaultTable {
        &self.table
    }

    /// Resolves an error to its mapping.
    #[must_use]
    pub fn resolve<'t>(&'t self, err: &(dyn Error + 'static)) -> &'t FaultMapping {
        if chain(err).any(|link| link.is::<crate::Cancelled>()) {
            if let Some(mapping) = self.table.get(Signal::Cancelled) {
                return mapping;
            }
        }
        if chain(err).any(|link| link.is::<crate::DeadlineExceeded>()) {
            if let Some(mapping) = self.table.get(Signal::DeadlineExceeded) {
                return mapping;
            }
        }
        for mapping in self.table.mappings() {
            if let Some(Signal::Kind(kind)) = mapping.signal() {
                if chain(err).any(|link| link_kind(link) == Some(kind)) {
                    return mapping;
                }
            }
        }
        self.table.fallback()
    }
}

/// Extracts the kind a single chain link carries, if any.
fn link_kind(link: &(dyn Error + 'static)) -> Option<FaultKind> {
    if let Some(fault) = link.downcast_ref::<Fault>() {
        return fault.kind();
    }
    link.downcast_ref::<FaultKind>().copied()
}

/// Iterates an error and its transitive `source()` links, outermost first.
pub(super) fn chain<'a>(err: &'a (dyn Error + 'static)) -> Chain<'a> {
    Chain { next: Some(err) }
}

pub(super) struct Chain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.source();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Cancelled, DeadlineExceeded};
    use crate::StatusClass;

    fn resolver() -> Resolver {
        Resolver::new(Arc::new(FaultTable::standard()))
    }

    #[test]
    fn test_bare_kind_resolves_directly() {
        let resolver = resolver();
        let err = Fault::not_found("note 7 does not exist");
        assert_eq!(resolver.resolve(&err).code(), "NOT_FOUND");
    }

    #[test]
    fn test_deep_wrapping_does_not_change_the_outcome() {
        let resolver = resolver();
        let err = Fault::duplicate("slug taken")
            .wrap("inserting note")
            .wrap("handling create_note");
        assert_eq!(resolver.resolve(&err).code(), "DUPLICATE");
        assert_eq!(resolver.resolve(&err).status(), StatusClass::Conflict);
    }

    #[test]
    fn test_unclassified_fault_falls_back_to_internal() {
        let resolver = resolver();
        let err = Fault::internal("index corrupted");
        let mapping = resolver.resolve(&err);
        assert_eq!(mapping.code(), "INTERNAL");
        assert_eq!(mapping.status(), StatusClass::Internal);
    }

    #[test]
    fn test_foreign_error_falls_back_to_internal() {
        let resolver = resolver();
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        assert_eq!(resolver.resolve(&err).code(), "INTERNAL");
    }

    #[test]
    fn test_cancellation_outranks_any_kind() {
        let resolver = resolver();
        let err = Fault::not_found("gone").with_source(Cancelled).wrap("outer");
        assert_eq!(resolver.resolve(&err).code(), "CANCELLED");
        assert_eq!(resolver.resolve(&err).status(), StatusClass::Cancelled);
    }

    #[test]
    fn test_cancellation_outranks_deadline() {
        let resolver = resolver();
        let err = Fault::from(DeadlineExceeded).with_source(Cancelled);
        assert_eq!(resolver.resolve(&err).code(), "CANCELLED");
    }

    #[test]
    fn test_deadline_outranks_kinds() {
        let resolver = resolver();
        let err = Fault::out_of_range("too slow").with_source(DeadlineExceeded);
        assert_eq!(resolver.resolve(&err).code(), "DEADLINE_EXCEEDED");
        assert_eq!(resolver.resolve(&err).status(), StatusClass::Timeout);
    }

    #[test]
    fn test_two_kinds_in_one_chain_earliest_row_wins() {
        // NOT_FOUND registers after the validation kinds, so a chain
        // carrying both resolves to the validation row.
        let resolver = resolver();
        let err = Fault::not_found("missing").with_source(Fault::missing_required("id"));
        assert_eq!(resolver.resolve(&err).code(), "MISSING_REQUIRED");

        let flipped = Fault::missing_required("id").with_source(Fault::not_found("missing"));
        assert_eq!(resolver.resolve(&flipped).code(), "MISSING_REQUIRED");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = resolver();
        let err = Fault::invalid_type("expected integer").wrap("parsing payload");
        let first = resolver.resolve(&err).code().to_owned();
        for _ in 0..100 {
            assert_eq!(resolver.resolve(&err).code(), first);
        }
    }

    #[test]
    fn test_bare_kind_value_in_a_foreign_chain_is_found() {
        #[derive(Debug)]
        struct StoreError {
            kind: FaultKind,
        }

        impl std::fmt::Display for StoreError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "store rejected the write")
            }
        }

        impl std::error::Error for StoreError {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.kind)
            }
        }

        let resolver = resolver();
        let err = StoreError {
            kind: FaultKind::DUPLICATE,
        };
        assert_eq!(resolver.resolve(&err).code(), "DUPLICATE");
    }

    #[test]
    fn test_custom_table_missing_cancel_rows_falls_back() {
        let table = FaultTable::builder()
            .kind(FaultKind::NOT_FOUND, "NOT_FOUND", "gone", StatusClass::NotFound)
            .build();
        let resolver = Resolver::new(Arc::new(table));
        assert_eq!(resolver.resolve(&Fault::from(Cancelled)).code(), "INTERNAL");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_kind() -> impl Strategy<Value = FaultKind> {
            proptest::sample::select(FaultKind::all().to_vec())
        }

        proptest! {
            // Wrapping depth never changes what a fault resolves to.
            #[test]
            fn resolution_survives_arbitrary_wrapping(
                kind in any_kind(),
                layers in proptest::collection::vec("[a-z ]{1,20}", 0..8),
            ) {
                let resolver = resolver();
                let expected = resolver
                    .resolve(&Fault::new(kind, "seed"))
                    .code()
                    .to_owned();

                let mut fault = Fault::new(kind, "seed");
                for message in layers {
                    fault = fault.wrap(message);
                }

                prop_assert_eq!(resolver.resolve(&fault).code(), expected);
            }
        }
    }
}
