//! Error types for admission decisions.
//!
//! Distinguishes malformed requests from well-formed resources that fail
//! validation, matching the status reasons the API server reports.

use std::fmt;

use thiserror::Error;

use crate::field::{ErrorList, FieldError, aggregate};

/// Group and kind of a resource, rendered as `Kind.group`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

impl GroupKind {
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}

/// Error type for admission decisions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The request did not carry the expected kind of object
    #[error("{0}")]
    BadRequest(String),

    /// The object was decoded but violates one or more validation rules
    #[error("{kind} {name:?} is invalid: {}", aggregate(.errors))]
    Invalid {
        kind: GroupKind,
        name: String,
        errors: ErrorList,
    },
}

impl AdmissionError {
    /// Machine-readable status reason
    pub fn reason(&self) -> &'static str {
        match self {
            AdmissionError::BadRequest(_) => "BadRequest",
            AdmissionError::Invalid { .. } => "Invalid",
        }
    }

    /// HTTP status code the API server uses for this reason
    pub fn code(&self) -> u16 {
        match self {
            AdmissionError::BadRequest(_) => 400,
            AdmissionError::Invalid { .. } => 422,
        }
    }

    /// Field violations, empty for bad requests
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AdmissionError::BadRequest(_) => &[],
            AdmissionError::Invalid { errors, .. } => errors.as_slice(),
        }
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, AdmissionError::BadRequest(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, AdmissionError::Invalid { .. })
    }
}

/// Result type alias for admission decisions
pub type Result<T> = std::result::Result<T, AdmissionError>;
