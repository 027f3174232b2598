//! Capability interfaces injected by callers.
//!
//! The engine never inspects build provenance itself. A [`Verifier`] is the
//! sole authority on whether an artifact was built by a given builder from a
//! given source, and a [`PackageValidator`] decides whether a package name is
//! structurally acceptable when policies are loaded.

use sigillum_intoto::DigestSet;

/// Why a verifier rejected a build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationFailure {
    /// A value in the provenance did not match the expected one.
    #[error("{field} mismatch: expected `{expected}`, got `{actual}`")]
    Mismatch {
        /// Which value was compared (e.g. `"builder id"`).
        field: String,
        /// The value the policy requires.
        expected: String,
        /// The value found in the provenance.
        actual: String,
    },

    /// Any other rejection.
    #[error("{0}")]
    Rejected(String),
}

/// Why a package validator rejected a package.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationFailure(pub String);

/// Confirms that a concrete artifact matches the builder and source a policy
/// requires.
///
/// Implementations are called once per evaluation, synchronously, with no
/// retries.
pub trait Verifier {
    /// Verify that the artifact identified by `digests` and `package_uri` was
    /// built by `builder_id` from `source_uri`.
    fn verify(
        &self,
        digests: &DigestSet,
        package_uri: &str,
        builder_id: &str,
        source_uri: &str,
    ) -> Result<(), VerificationFailure>;
}

impl<F> Verifier for F
where
    F: Fn(&DigestSet, &str, &str, &str) -> Result<(), VerificationFailure>,
{
    fn verify(
        &self,
        digests: &DigestSet,
        package_uri: &str,
        builder_id: &str,
        source_uri: &str,
    ) -> Result<(), VerificationFailure> {
        self(digests, package_uri, builder_id, source_uri)
    }
}

/// Structural check on package names, run once per project policy at load.
pub trait PackageValidator {
    /// Accept or reject `package_name` with its allowed `environments`.
    fn validate_package(
        &self,
        package_name: &str,
        environments: &[String],
    ) -> Result<(), ValidationFailure>;
}

impl<F> PackageValidator for F
where
    F: Fn(&str, &[String]) -> Result<(), ValidationFailure>,
{
    fn validate_package(
        &self,
        package_name: &str,
        environments: &[String],
    ) -> Result<(), ValidationFailure> {
        self(package_name, environments)
    }
}

/// A verifier that accepts only one exact `(digests, package, builder,
/// source)` combination.
///
/// Useful for tests and for callers that have already extracted the claims
/// from provenance out of band.
#[derive(Debug, Clone)]
pub struct ExpectedBuild {
    /// Digests the artifact must have.
    pub digests: DigestSet,
    /// Package URI the artifact must have.
    pub package_uri: String,
    /// Builder the artifact must have been built by.
    pub builder_id: String,
    /// Source the artifact must have been built from.
    pub source_uri: String,
}

impl Verifier for ExpectedBuild {
    fn verify(
        &self,
        digests: &DigestSet,
        package_uri: &str,
        builder_id: &str,
        source_uri: &str,
    ) -> Result<(), VerificationFailure> {
        if *digests != self.digests {
            return Err(VerificationFailure::Rejected(
                "artifact digests do not match".to_owned(),
            ));
        }
        let checks = [
            ("package uri", self.package_uri.as_str(), package_uri),
            ("builder id", self.builder_id.as_str(), builder_id),
            ("source uri", self.source_uri.as_str(), source_uri),
        ];
        for (field, expected, actual) in checks {
            if expected != actual {
                return Err(VerificationFailure::Mismatch {
                    field: field.to_owned(),
                    expected: expected.to_owned(),
                    actual: actual.to_owned(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected() -> ExpectedBuild {
        ExpectedBuild {
            digests: DigestSet::from([("sha256", "abc")]),
            package_uri: "pkg".to_owned(),
            builder_id: "builder-x".to_owned(),
            source_uri: "src".to_owned(),
        }
    }

    #[test]
    fn expected_build_accepts_exact_match() {
        let digests = DigestSet::from([("sha256", "abc")]);
        expected()
            .verify(&digests, "pkg", "builder-x", "src")
            .expect("exact match verifies");
    }

    #[test]
    fn expected_build_reports_builder_mismatch() {
        let digests = DigestSet::from([("sha256", "abc")]);
        let err = expected()
            .verify(&digests, "pkg", "builder-y", "src")
            .unwrap_err();
        assert_eq!(
            err,
            VerificationFailure::Mismatch {
                field: "builder id".to_owned(),
                expected: "builder-x".to_owned(),
                actual: "builder-y".to_owned(),
            }
        );
    }

    #[test]
    fn expected_build_rejects_other_digests() {
        let digests = DigestSet::from([("sha256", "def")]);
        assert!(matches!(
            expected().verify(&digests, "pkg", "builder-x", "src"),
            Err(VerificationFailure::Rejected(_))
        ));
    }

    #[test]
    fn closures_are_verifiers() {
        let deny = |_: &DigestSet, _: &str, _: &str, _: &str| -> Result<(), VerificationFailure> {
            Err(VerificationFailure::Rejected("no".to_owned()))
        };
        assert!(deny.verify(&DigestSet::new(), "p", "b", "s").is_err());
    }
}
