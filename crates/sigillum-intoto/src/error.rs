//! Error types for the in-toto value types.

/// Errors raised while validating in-toto values.
#[derive(Debug, thiserror::Error)]
pub enum IntotoError {
    /// A digest set has no entries.
    #[error("digest set is empty")]
    EmptyDigests,

    /// A digest set has an empty algorithm name.
    #[error("digest set has an empty algorithm name")]
    EmptyAlgorithm,

    /// A digest set has an empty value for an algorithm.
    #[error("digest `{0}` has an empty value")]
    EmptyDigestValue(String),

    /// An annotation exists but does not hold the expected type.
    #[error("annotation `{key}` is not a {expected}")]
    AnnotationType {
        /// The annotation key.
        key: String,
        /// Name of the expected JSON type.
        expected: &'static str,
    },
}
