//! Release attestation documents and the safe-mode builder that creates them.
//!
//! Options are applied in the order the caller supplies them against a
//! two-state builder. While the builder is open any option is accepted.
//! Once [`enter_safe_mode`] seals it, the SLSA build level is frozen: a
//! later [`set_slsa_build_level`] aborts the whole build with
//! [`ReleaseError::Internal`], while author and policy metadata stay
//! settable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sigillum_intoto::{ResourceDescriptor, Subject};
use tracing::debug;

use crate::MAX_SLSA_LEVEL;
use crate::error::ReleaseError;

/// The in-toto statement type of every release attestation.
pub const STATEMENT_TYPE: &str = "https://in-toto.io/Statement/v1";
/// The predicate type identifying a release attestation.
pub const PREDICATE_TYPE: &str = "https://slsa.dev/release/v0.1";
/// Property key holding the verified SLSA build level.
pub const BUILD_LEVEL_PROPERTY: &str = "slsa.dev/build/level";
/// Package annotation key holding the release environment.
pub const ENVIRONMENT_ANNOTATION: &str = "environment";

/// A release attestation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attestation {
    /// Statement header.
    pub header: Header,
    /// Release predicate.
    pub predicate: Predicate,
}

/// Statement header: what kind of document this is and what it is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Always [`STATEMENT_TYPE`].
    #[serde(rename = "type")]
    pub statement_type: String,
    /// Always [`PREDICATE_TYPE`].
    pub predicate_type: String,
    /// The attested artifacts.
    pub subjects: Vec<Subject>,
}

/// Who produced the attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Author identity.
    pub id: String,
    /// Author version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The release predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Who produced the attestation.
    pub author: Author,
    /// The released package, with the environment as an annotation.
    pub package: ResourceDescriptor,
    /// Evidence of the policy documents that governed the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<BTreeMap<String, ResourceDescriptor>>,
    /// Additional properties, always including [`BUILD_LEVEL_PROPERTY`].
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Predicate {
    /// The recorded SLSA build level.
    #[must_use]
    pub fn build_level(&self) -> Option<i64> {
        self.properties
            .get(BUILD_LEVEL_PROPERTY)
            .and_then(serde_json::Value::as_i64)
    }

    /// The recorded release environment, if any.
    #[must_use]
    pub fn environment(&self) -> Option<&str> {
        self.package
            .annotations
            .get(ENVIRONMENT_ANNOTATION)
            .and_then(serde_json::Value::as_str)
    }
}

/// A mutation applied while building an attestation.
#[derive(Debug, Clone, PartialEq)]
pub enum AttestationOption {
    /// Set the author version.
    AuthorVersion(String),
    /// Set the policy evidence.
    Policy(BTreeMap<String, ResourceDescriptor>),
    /// Set the SLSA build level. Fails once safe mode is entered.
    SlsaBuildLevel(i64),
    /// Seal the build level.
    EnterSafeMode,
}

/// Set the author version.
#[must_use]
pub fn set_author_version(version: impl Into<String>) -> AttestationOption {
    AttestationOption::AuthorVersion(version.into())
}

/// Record which policy documents governed the decision.
#[must_use]
pub fn set_policy(evidence: BTreeMap<String, ResourceDescriptor>) -> AttestationOption {
    AttestationOption::Policy(evidence)
}

/// Set the SLSA build level directly.
#[must_use]
pub const fn set_slsa_build_level(level: i64) -> AttestationOption {
    AttestationOption::SlsaBuildLevel(level)
}

/// Freeze the SLSA build level for the rest of the build.
#[must_use]
pub const fn enter_safe_mode() -> AttestationOption {
    AttestationOption::EnterSafeMode
}

/// Whether the build level may still change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuilderState {
    /// Every option is accepted.
    Open,
    /// The build level is frozen.
    Sealed,
}

/// Per-call builder state. Never shared between builds.
#[derive(Debug)]
pub(crate) struct Builder {
    author: Author,
    subject: Subject,
    package: ResourceDescriptor,
    policy: Option<BTreeMap<String, ResourceDescriptor>>,
    level: Option<i64>,
    state: BuilderState,
}

impl Builder {
    pub(crate) fn new(author_id: String, subject: Subject, package: ResourceDescriptor) -> Self {
        Self {
            author: Author {
                id: author_id,
                version: None,
            },
            subject,
            package,
            policy: None,
            level: None,
            state: BuilderState::Open,
        }
    }

    /// Record `level`, unless the builder is sealed.
    pub(crate) fn set_level(&mut self, level: i64) -> Result<(), ReleaseError> {
        match self.state {
            BuilderState::Open => {
                self.level = Some(level);
                Ok(())
            }
            BuilderState::Sealed => Err(ReleaseError::Internal(format!(
                "cannot set slsa build level to {level} after entering safe mode"
            ))),
        }
    }

    pub(crate) const fn seal(&mut self) {
        self.state = BuilderState::Sealed;
    }

    fn apply(&mut self, option: AttestationOption) -> Result<(), ReleaseError> {
        match option {
            AttestationOption::AuthorVersion(version) => self.author.version = Some(version),
            AttestationOption::Policy(evidence) => self.policy = Some(evidence),
            AttestationOption::SlsaBuildLevel(level) => self.set_level(level)?,
            AttestationOption::EnterSafeMode => self.seal(),
        }
        Ok(())
    }

    pub(crate) fn finish(
        mut self,
        options: impl IntoIterator<Item = AttestationOption>,
    ) -> Result<Creation, ReleaseError> {
        for option in options {
            self.apply(option)?;
        }

        self.subject
            .digests
            .validate()
            .map_err(|e| ReleaseError::InvalidInput(format!("invalid subject: {e}")))?;
        if self.package.uri.is_empty() {
            return Err(ReleaseError::InvalidInput(
                "package descriptor has an empty uri".to_owned(),
            ));
        }
        let level = self.level.unwrap_or(0);
        if !(0..=MAX_SLSA_LEVEL).contains(&level) {
            return Err(ReleaseError::InvalidInput(format!(
                "slsa build level {level} must be in [0, {MAX_SLSA_LEVEL}]"
            )));
        }

        debug!(package = %self.package.uri, level, sealed = ?self.state, "created release attestation");
        let properties: BTreeMap<String, serde_json::Value> =
            BTreeMap::from([(BUILD_LEVEL_PROPERTY.to_owned(), level.into())]);
        Ok(Creation {
            attestation: Attestation {
                header: Header {
                    statement_type: STATEMENT_TYPE.to_owned(),
                    predicate_type: PREDICATE_TYPE.to_owned(),
                    subjects: vec![self.subject],
                },
                predicate: Predicate {
                    author: self.author,
                    package: self.package,
                    policy: self.policy,
                    properties,
                },
            },
        })
    }
}

/// A finished, immutable release attestation.
#[derive(Debug, Clone, PartialEq)]
pub struct Creation {
    attestation: Attestation,
}

impl Creation {
    /// Build an attestation directly from caller-supplied parts.
    ///
    /// Options run in order. A level set before [`enter_safe_mode`] is kept;
    /// a level set after it fails the build.
    pub fn new(
        author_id: impl Into<String>,
        subject: Subject,
        package: ResourceDescriptor,
        options: impl IntoIterator<Item = AttestationOption>,
    ) -> Result<Self, ReleaseError> {
        Builder::new(author_id.into(), subject, package).finish(options)
    }

    /// The attestation document.
    #[must_use]
    pub const fn attestation(&self) -> &Attestation {
        &self.attestation
    }

    /// Take ownership of the attestation document.
    #[must_use]
    pub fn into_attestation(self) -> Attestation {
        self.attestation
    }

    /// Render the attestation as JSON.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ReleaseError> {
        serde_json::to_vec(&self.attestation)
            .map_err(|e| ReleaseError::Internal(format!("failed to serialize attestation: {e}")))
    }
}
