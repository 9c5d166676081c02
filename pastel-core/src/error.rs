//! Errors produced while building and running monitors.
//!
//! Building a network from a [`Formula`](crate::formula::Formula) fails with a [`FormulaError`]
//! when the formula is malformed or cannot be evaluated in the requested setting. Updating a
//! network fails with an [`EvaluationError`] when an event cannot be evaluated. Both kinds of
//! error are fatal for the monitor that produced them.

use pastel_bdd::DomainExhausted;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
enum FormulaErrorKind {
    #[error("Malformed formula: {0}")]
    Malformed(String),

    #[error("Invalid time bound {0}")]
    InvalidBound(String),

    #[error("Unsupported combination: {0}")]
    Unsupported(String),
}

/// Error produced while constructing a network.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(transparent)]
pub struct FormulaError(FormulaErrorKind);

impl FormulaError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self(FormulaErrorKind::Malformed(detail.into()))
    }

    pub fn invalid_bound(detail: impl Into<String>) -> Self {
        Self(FormulaErrorKind::InvalidBound(detail.into()))
    }

    pub fn unsupported(detail: impl Into<String>) -> Self {
        Self(FormulaErrorKind::Unsupported(detail.into()))
    }

    pub fn is_invalid_bound(&self) -> bool {
        matches!(self.0, FormulaErrorKind::InvalidBound(_))
    }

    /// Whether the formula is well formed but cannot be evaluated with the requested setting
    /// and options.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.0, FormulaErrorKind::Unsupported(_))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
enum EvaluationErrorKind {
    #[error("Missing field \"{0}\"")]
    FieldMissing(String),

    #[error("Field \"{name}\" holds a {found} value but a {expected} was expected")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid time {time}: {reason}")]
    InvalidTime { time: f64, reason: &'static str },

    #[error(transparent)]
    DomainExhausted(#[from] DomainExhausted),
}

/// Error produced while updating a network with an event.
///
/// The error names the field or timestamp responsible for the failure.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(transparent)]
pub struct EvaluationError(EvaluationErrorKind);

impl EvaluationError {
    pub(crate) fn missing(name: &str) -> Self {
        Self(EvaluationErrorKind::FieldMissing(name.to_owned()))
    }

    pub(crate) fn mismatch(name: &str, expected: &'static str, found: &'static str) -> Self {
        Self(EvaluationErrorKind::TypeMismatch {
            name: name.to_owned(),
            expected,
            found,
        })
    }

    pub(crate) fn invalid_time(time: f64, reason: &'static str) -> Self {
        Self(EvaluationErrorKind::InvalidTime { time, reason })
    }

    pub fn is_field_missing(&self) -> bool {
        matches!(self.0, EvaluationErrorKind::FieldMissing(_))
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.0, EvaluationErrorKind::TypeMismatch { .. })
    }

    pub fn is_invalid_time(&self) -> bool {
        matches!(self.0, EvaluationErrorKind::InvalidTime { .. })
    }

    /// Return the name of the field that produced the error, if any.
    pub fn field(&self) -> Option<&str> {
        match &self.0 {
            EvaluationErrorKind::FieldMissing(name) | EvaluationErrorKind::TypeMismatch { name, .. } => Some(name),
            EvaluationErrorKind::DomainExhausted(err) => Some(err.name()),
            EvaluationErrorKind::InvalidTime { .. } => None,
        }
    }
}

impl From<DomainExhausted> for EvaluationError {
    fn from(err: DomainExhausted) -> Self {
        Self(EvaluationErrorKind::DomainExhausted(err))
    }
}
