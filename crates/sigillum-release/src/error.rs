//! Error types for release policy evaluation.

use crate::verifier::{ValidationFailure, VerificationFailure};

/// Errors from policy construction, evaluation, and attestation building.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    /// A single field fails a structural constraint.
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// A document or request breaks a cross-field or business rule.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A package rejected by the package validator.
    #[error("invalid input: package `{package}` rejected: {source}")]
    PackageRejected {
        /// The package URI that was validated.
        package: String,
        /// The validator's reason.
        source: ValidationFailure,
    },

    /// A referenced project, environment, or root does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A state or consistency fault that prior validation should prevent.
    #[error("internal error: {0}")]
    Internal(String),

    /// The verifier rejected the build. An expected/actual mismatch is
    /// carried as [`VerificationFailure::Mismatch`].
    #[error("verification error: {0}")]
    Verification(#[from] VerificationFailure),

    /// Failed to read a policy document.
    #[error("policy I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`ReleaseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ReleaseError::InvalidField`].
    InvalidField,
    /// See [`ReleaseError::InvalidInput`] and [`ReleaseError::PackageRejected`].
    InvalidInput,
    /// See [`ReleaseError::NotFound`].
    NotFound,
    /// See [`ReleaseError::Internal`].
    Internal,
    /// See [`ReleaseError::Verification`].
    Verification,
    /// See [`ReleaseError::Io`].
    Io,
}

impl ReleaseError {
    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidField(_) => ErrorKind::InvalidField,
            Self::InvalidInput(_) | Self::PackageRejected { .. } => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Verification(_) => ErrorKind::Verification,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}
