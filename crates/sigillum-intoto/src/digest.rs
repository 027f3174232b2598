//! SHA-256 helpers for policy evidence.

use sha2::{Digest, Sha256};

use crate::resource::{DigestSet, ResourceDescriptor};

/// Algorithm name used for SHA-256 entries in a [`DigestSet`].
pub const SHA256: &str = "sha256";

/// Compute the SHA-256 hex digest of a byte slice.
#[must_use]
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// A digest set holding only the SHA-256 of `data`.
#[must_use]
pub fn sha256_digest_set(data: &[u8]) -> DigestSet {
    DigestSet::from([(SHA256, sha256_bytes(data))])
}

/// Describe a document by URI and the SHA-256 of its contents.
///
/// This is the form policy evidence takes inside a release attestation.
#[must_use]
pub fn document_descriptor(uri: impl Into<String>, contents: &[u8]) -> ResourceDescriptor {
    ResourceDescriptor::new(uri).with_digests(sha256_digest_set(contents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_value() {
        // SHA-256 of empty string
        assert_eq!(
            sha256_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn document_descriptor_carries_sha256() {
        let desc = document_descriptor("policy/org.json", b"hello");
        assert_eq!(desc.uri, "policy/org.json");
        let digests = desc.digests.expect("digests set");
        assert_eq!(
            digests.get(SHA256),
            Some("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
        );
        assert!(desc.annotations.is_empty());
    }
}
