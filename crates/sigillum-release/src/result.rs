//! The outcome of a policy evaluation.

use sigillum_intoto::{DigestSet, ResourceDescriptor, Subject};

use crate::creation::{AttestationOption, Builder, Creation, ENVIRONMENT_ANNOTATION};
use crate::error::ReleaseError;

/// What a successful evaluation resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Resolution {
    level: i64,
    package_uri: String,
    digests: DigestSet,
    environment: Option<String>,
}

/// Outcome of [`crate::Policy::evaluate`].
///
/// Evaluation failures are captured here rather than returned, so a caller
/// can inspect [`error`](Self::error) before deciding whether to attest. A
/// failed result exposes none of the resolved fields.
#[derive(Debug)]
pub struct PolicyEvaluationResult {
    outcome: Result<Resolution, ReleaseError>,
}

impl PolicyEvaluationResult {
    pub(crate) const fn resolved(
        level: i64,
        package_uri: String,
        digests: DigestSet,
        environment: Option<String>,
    ) -> Self {
        Self {
            outcome: Ok(Resolution {
                level,
                package_uri,
                digests,
                environment,
            }),
        }
    }

    pub(crate) const fn failed(err: ReleaseError) -> Self {
        Self { outcome: Err(err) }
    }

    /// The captured evaluation error, `None` on success.
    #[must_use]
    pub fn error(&self) -> Option<&ReleaseError> {
        self.outcome.as_ref().err()
    }

    /// Returns `true` if the evaluation succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The verified SLSA build level.
    #[must_use]
    pub fn level(&self) -> Option<i64> {
        self.outcome.as_ref().ok().map(|r| r.level)
    }

    /// The evaluated package URI.
    #[must_use]
    pub fn package_uri(&self) -> Option<&str> {
        self.outcome.as_ref().ok().map(|r| r.package_uri.as_str())
    }

    /// The evaluated artifact digests.
    #[must_use]
    pub fn digests(&self) -> Option<&DigestSet> {
        self.outcome.as_ref().ok().map(|r| &r.digests)
    }

    /// The release environment, when one was supplied.
    #[must_use]
    pub fn environment(&self) -> Option<&str> {
        self.outcome
            .as_ref()
            .ok()
            .and_then(|r| r.environment.as_deref())
    }

    /// Turn the result into the captured error, if any.
    pub fn into_result(self) -> Result<(), ReleaseError> {
        self.outcome.map(|_| ())
    }

    /// Build a release attestation carrying the verified level.
    ///
    /// The verified level is set and safe mode entered before any caller
    /// option runs, so `options` may add author and policy metadata but any
    /// [`AttestationOption::SlsaBuildLevel`] fails with
    /// [`ReleaseError::Internal`]. Building from a failed result is also
    /// [`ReleaseError::Internal`].
    pub fn attestation_new(
        self,
        author_id: impl Into<String>,
        options: impl IntoIterator<Item = AttestationOption>,
    ) -> Result<Creation, ReleaseError> {
        let resolution = self.outcome.map_err(|e| {
            ReleaseError::Internal(format!("cannot attest a failed evaluation: {e}"))
        })?;
        if resolution.package_uri.is_empty() || resolution.digests.is_empty() {
            return Err(ReleaseError::Internal(
                "evaluation result has no package or digests".to_owned(),
            ));
        }

        let mut package = ResourceDescriptor::new(resolution.package_uri);
        if let Some(env) = resolution.environment {
            package = package.with_annotation(ENVIRONMENT_ANNOTATION, env);
        }

        let mut builder = Builder::new(author_id.into(), Subject::new(resolution.digests), package);
        builder.set_level(resolution.level)?;
        builder.seal();
        builder.finish(options)
    }
}
