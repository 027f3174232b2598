//! Release policy evaluation and attestation.
//!
//! `sigillum-release` decides whether a release satisfies an organization's
//! supply-chain policy and records the outcome in a release attestation.
//!
//! The pipeline has three stages:
//! 1. **Construction**: organization and project policy documents are
//!    parsed and cross-checked into a read-only [`Policy`]
//! 2. **Evaluation**: [`Policy::evaluate`] resolves a package, its
//!    environment and required build root, then asks a [`Verifier`] to
//!    confirm the build
//! 3. **Attestation**: [`PolicyEvaluationResult::attestation_new`] seals the
//!    verified SLSA level into an immutable [`Attestation`]

pub mod creation;
pub mod error;
pub mod organization;
pub mod policy;
pub mod project;
pub mod result;
pub mod verifier;

/// The only policy document format this crate understands.
pub const SUPPORTED_FORMAT: i64 = 1;

/// Highest SLSA build level.
pub const MAX_SLSA_LEVEL: i64 = 4;

// Re-export primary types for convenience.
pub use creation::{Attestation, AttestationOption, Creation};
pub use error::{ErrorKind, ReleaseError};
pub use policy::{EvaluationOptions, Policy};
pub use result::PolicyEvaluationResult;
pub use verifier::{PackageValidator, ValidationFailure, VerificationFailure, Verifier};
