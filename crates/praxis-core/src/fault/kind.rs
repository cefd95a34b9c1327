//! The closed set of domain failure categories.
//!
//! A [`FaultKind`] is an opaque identity value naming one category of
//! domain failure. Kinds are declared once, here, as associated constants;
//! there is no public constructor, so the set is closed. Business code
//! attaches a kind to a [`Fault`](crate::Fault) and layers context around
//! it; the resolver later finds the kind anywhere in the wrap chain.

use std::fmt;
use std::hash::{Hash, Hasher};

/// An opaque identity for one domain failure category.
///
/// Equality and hashing use the numeric identity only, never the label
/// text. The label exists for display and logging.
///
/// # Example
///
/// ```
/// use praxis_core::FaultKind;
///
/// assert_eq!(FaultKind::NOT_FOUND, FaultKind::NOT_FOUND);
/// assert_ne!(FaultKind::NOT_FOUND, FaultKind::DUPLICATE);
/// assert_eq!(FaultKind::all().len(), 5);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FaultKind {
    id: u8,
    label: &'static str,
}

impl FaultKind {
    /// A required field was absent or empty.
    pub const MISSING_REQUIRED: Self = Self::new(1, "missing_required");

    /// A value fell outside its permitted range.
    pub const OUT_OF_RANGE: Self = Self::new(2, "out_of_range");

    /// A value had the wrong type or shape.
    pub const INVALID_TYPE: Self = Self::new(3, "invalid_type");

    /// The resource already exists.
    pub const DUPLICATE: Self = Self::new(4, "duplicate");

    /// The requested resource does not exist.
    pub const NOT_FOUND: Self = Self::new(5, "not_found");

    const fn new(id: u8, label: &'static str) -> Self {
        Self { id, label }
    }

    /// Returns every kind, in registration order.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::MISSING_REQUIRED,
            Self::OUT_OF_RANGE,
            Self::INVALID_TYPE,
            Self::DUPLICATE,
            Self::NOT_FOUND,
        ]
    }

    /// Returns the snake_case label for this kind.
    #[must_use]
    pub const fn label(self) -> &'static str {
        self.label
    }
}

impl PartialEq for FaultKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FaultKind {}

impl Hash for FaultKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

impl std::error::Error for FaultKind {}
