//! The policy aggregate and release evaluation.
//!
//! A [`Policy`] owns one organization policy and every project policy keyed
//! by package URI. It is built once, never mutated afterwards, and can be
//! shared across threads for concurrent evaluations.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::{self, Read};

use sigillum_intoto::DigestSet;
use tracing::{debug, warn};

use crate::error::ReleaseError;
use crate::organization::OrganizationPolicy;
use crate::project::ProjectPolicy;
use crate::result::PolicyEvaluationResult;
use crate::verifier::{PackageValidator, Verifier};

/// Per-call inputs to [`Policy::evaluate`].
#[derive(Clone, Copy)]
pub struct EvaluationOptions<'a> {
    /// Confirms the artifact was built by the required root from the
    /// required source.
    pub verifier: &'a dyn Verifier,
    /// The environment being released to.
    pub environment: Option<&'a str>,
}

impl<'a> EvaluationOptions<'a> {
    /// Options with a verifier and no environment.
    #[must_use]
    pub const fn new(verifier: &'a dyn Verifier) -> Self {
        Self {
            verifier,
            environment: None,
        }
    }

    /// Set the release environment.
    #[must_use]
    pub const fn with_environment(mut self, environment: &'a str) -> Self {
        self.environment = Some(environment);
        self
    }
}

/// Validated organization and project policies.
#[derive(Debug, Clone)]
pub struct Policy {
    organization: OrganizationPolicy,
    projects: HashMap<String, ProjectPolicy>,
}

impl Policy {
    /// Parse and cross-check policy documents.
    ///
    /// `projects` is consumed once, in order. The first failure aborts
    /// construction; no partial policy is returned.
    pub fn from_readers<R, I>(
        organization: impl Read,
        projects: I,
        validator: Option<&dyn PackageValidator>,
    ) -> Result<Self, ReleaseError>
    where
        R: Read,
        I: IntoIterator<Item = io::Result<R>>,
    {
        let organization = OrganizationPolicy::from_reader(organization)?;
        let projects = projects
            .into_iter()
            .map(|reader| ProjectPolicy::from_reader(reader?))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(organization, projects, validator)
    }

    /// Compose already-parsed documents.
    ///
    /// Runs the package validator on every project, rejects duplicate
    /// package URIs, and rejects projects that require a root the
    /// organization does not define.
    pub fn new(
        organization: OrganizationPolicy,
        projects: impl IntoIterator<Item = ProjectPolicy>,
        validator: Option<&dyn PackageValidator>,
    ) -> Result<Self, ReleaseError> {
        organization.validate()?;

        let mut by_uri = HashMap::new();
        for project in projects {
            project.validate()?;
            let package = &project.package;
            if let Some(validator) = validator {
                validator
                    .validate_package(&package.uri, &package.environment.any_of)
                    .map_err(|source| ReleaseError::PackageRejected {
                        package: package.uri.clone(),
                        source,
                    })?;
            }

            let builder = &project.build_requirements.require_slsa_builder;
            if organization.root_by_name(builder).is_none() {
                return Err(ReleaseError::InvalidInput(format!(
                    "package `{}` requires builder `{builder}` which the organization policy does not define",
                    package.uri
                )));
            }

            match by_uri.entry(package.uri.clone()) {
                Entry::Occupied(e) => {
                    return Err(ReleaseError::InvalidInput(format!(
                        "package `{}` has more than one project policy",
                        e.key()
                    )));
                }
                Entry::Vacant(e) => {
                    e.insert(project);
                }
            }
        }

        debug!(projects = by_uri.len(), "built release policy");
        Ok(Self {
            organization,
            projects: by_uri,
        })
    }

    /// The organization policy.
    #[must_use]
    pub const fn organization(&self) -> &OrganizationPolicy {
        &self.organization
    }

    /// The project policy for a package.
    #[must_use]
    pub fn project(&self, package_uri: &str) -> Option<&ProjectPolicy> {
        self.projects.get(package_uri)
    }

    /// Number of project policies.
    #[must_use]
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Evaluate a release of `package_uri` with content `digests`.
    ///
    /// Errors are captured in the returned result, never returned directly.
    pub fn evaluate(
        &self,
        digests: &DigestSet,
        package_uri: &str,
        options: &EvaluationOptions<'_>,
    ) -> PolicyEvaluationResult {
        match self.resolve(digests, package_uri, options) {
            Ok(level) => {
                debug!(package = package_uri, level, "release evaluation passed");
                PolicyEvaluationResult::resolved(
                    level,
                    package_uri.to_owned(),
                    digests.clone(),
                    options.environment.map(str::to_owned),
                )
            }
            Err(e) => {
                warn!(package = package_uri, error = %e, "release evaluation failed");
                PolicyEvaluationResult::failed(e)
            }
        }
    }

    fn resolve(
        &self,
        digests: &DigestSet,
        package_uri: &str,
        options: &EvaluationOptions<'_>,
    ) -> Result<i64, ReleaseError> {
        let project = self.projects.get(package_uri).ok_or_else(|| {
            ReleaseError::NotFound(format!("no project policy for package `{package_uri}`"))
        })?;

        let allowed = project.environments();
        if !allowed.is_empty() {
            match options.environment {
                Some(env) if allowed.iter().any(|a| a == env) => {}
                Some(env) => {
                    return Err(ReleaseError::NotFound(format!(
                        "environment `{env}` is not allowed for package `{package_uri}`: {allowed:?}"
                    )));
                }
                None => {
                    return Err(ReleaseError::NotFound(format!(
                        "package `{package_uri}` requires one of the environments {allowed:?}"
                    )));
                }
            }
        }

        let requirements = &project.build_requirements;
        // Construction rejects unknown builders; re-checked here.
        let root = self
            .organization
            .root_by_name(&requirements.require_slsa_builder)
            .ok_or_else(|| {
                ReleaseError::Internal(format!(
                    "builder `{}` required by `{package_uri}` is not an organization root",
                    requirements.require_slsa_builder
                ))
            })?;

        debug!(
            package = package_uri,
            builder = %root.id,
            source = %requirements.repository.uri,
            "verifying build"
        );
        options
            .verifier
            .verify(digests, package_uri, &root.id, &requirements.repository.uri)?;

        Ok(root.level())
    }
}
