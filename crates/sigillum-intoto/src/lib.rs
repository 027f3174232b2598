//! in-toto v1 value types shared by the Sigillum crates.
//!
//! `sigillum-intoto` holds the small vocabulary every other layer speaks:
//! digest sets, attestation subjects, and resource descriptors. It also
//! computes the SHA-256 digests used as policy evidence.
//!
//! See: <https://github.com/in-toto/attestation/tree/main/spec/v1>

pub mod digest;
pub mod error;
pub mod resource;

pub use error::IntotoError;
pub use resource::{DigestSet, ResourceDescriptor, Subject};
