//! Digest sets, subjects, and resource descriptors.
//!
//! See: <https://github.com/in-toto/attestation/blob/main/spec/v1/resource_descriptor.md>

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::IntotoError;

/// A set of digest algorithms and their encoded values.
///
/// Keys are kept in sorted order so serialized documents are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigestSet(BTreeMap<String, String>);

impl DigestSet {
    /// Create an empty digest set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a digest, returning the previous value for the algorithm.
    pub fn insert(&mut self, algorithm: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(algorithm.into(), value.into())
    }

    /// Look up the digest for an algorithm.
    #[must_use]
    pub fn get(&self, algorithm: &str) -> Option<&str> {
        self.0.get(algorithm).map(String::as_str)
    }

    /// Iterate over `(algorithm, value)` pairs in algorithm order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of algorithms in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set holds no digests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that the set is non-empty and has no empty keys or values.
    pub fn validate(&self) -> Result<(), IntotoError> {
        if self.0.is_empty() {
            return Err(IntotoError::EmptyDigests);
        }
        for (algorithm, value) in &self.0 {
            if algorithm.is_empty() {
                return Err(IntotoError::EmptyAlgorithm);
            }
            if value.is_empty() {
                return Err(IntotoError::EmptyDigestValue(algorithm.clone()));
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DigestSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for DigestSet {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// An artifact the attestation is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Optional URI of the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Content digests.
    #[serde(rename = "digest")]
    pub digests: DigestSet,
}

impl Subject {
    /// A subject identified only by its digests.
    #[must_use]
    pub const fn new(digests: DigestSet) -> Self {
        Self { uri: None, digests }
    }
}

/// A resource referenced from an attestation: a package or a policy document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// URI identifying the resource.
    pub uri: String,
    /// Content digests, when known.
    #[serde(rename = "digest", default, skip_serializing_if = "Option::is_none")]
    pub digests: Option<DigestSet>,
    /// Free-form annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, serde_json::Value>,
}

impl ResourceDescriptor {
    /// A descriptor with only a URI.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Attach content digests.
    #[must_use]
    pub fn with_digests(mut self, digests: DigestSet) -> Self {
        self.digests = Some(digests);
        self
    }

    /// Attach an annotation, replacing any previous value under `key`.
    #[must_use]
    pub fn with_annotation(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Read a string annotation.
    ///
    /// Returns `Ok(None)` when the annotation is absent and an error when it
    /// exists with a non-string value.
    pub fn annotation_str(&self, key: &str) -> Result<Option<&str>, IntotoError> {
        match self.annotations.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| IntotoError::AnnotationType {
                    key: key.to_owned(),
                    expected: "string",
                }),
        }
    }
}
