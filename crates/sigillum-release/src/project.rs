//! Project policy: one package's environments and build requirements.

use std::collections::HashSet;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::SUPPORTED_FORMAT;
use crate::error::ReleaseError;

/// Deployment environments a package may be released to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Environment {
    /// Allowed environment names. Empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<String>,
}

/// The package a project policy governs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Package {
    /// Package URI; the lookup key inside a [`crate::Policy`].
    pub uri: String,
    /// Allowed environments.
    #[serde(default)]
    pub environment: Environment,
}

/// The authoritative source repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Repository {
    /// Repository URI handed to the verifier as the expected source.
    pub uri: String,
}

/// How the package must be built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildRequirements {
    /// Name of the organization root that must have built the package.
    pub require_slsa_builder: String,
    /// Source the package must be built from.
    pub repository: Repository,
}

/// A validated project policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectPolicy {
    /// Document format version.
    pub format: i64,
    /// The governed package.
    pub package: Package,
    /// Build requirements for the package.
    pub build_requirements: BuildRequirements,
}

impl ProjectPolicy {
    /// Parse and validate a project policy from JSON.
    pub fn from_reader(reader: impl Read) -> Result<Self, ReleaseError> {
        let policy: Self = serde_json::from_reader(reader).map_err(|e| {
            ReleaseError::InvalidInput(format!("failed to parse project policy: {e}"))
        })?;
        policy.validate()?;
        debug!(package = %policy.package.uri, "loaded project policy");
        Ok(policy)
    }

    /// Check format and required fields.
    pub fn validate(&self) -> Result<(), ReleaseError> {
        if self.format != SUPPORTED_FORMAT {
            return Err(ReleaseError::InvalidInput(format!(
                "unsupported project policy format {}, expected {SUPPORTED_FORMAT}",
                self.format
            )));
        }
        if self.package.uri.is_empty() {
            return Err(ReleaseError::InvalidInput(
                "project policy has an empty package uri".to_owned(),
            ));
        }
        let package = &self.package.uri;
        if self.build_requirements.require_slsa_builder.is_empty() {
            return Err(ReleaseError::InvalidInput(format!(
                "package `{package}` does not name a required builder"
            )));
        }
        if self.build_requirements.repository.uri.is_empty() {
            return Err(ReleaseError::InvalidInput(format!(
                "package `{package}` has an empty repository uri"
            )));
        }

        let mut seen = HashSet::new();
        for env in &self.package.environment.any_of {
            if env.is_empty() {
                return Err(ReleaseError::InvalidField(format!(
                    "package `{package}` lists an empty environment name"
                )));
            }
            if !seen.insert(env.as_str()) {
                return Err(ReleaseError::InvalidInput(format!(
                    "package `{package}` lists environment `{env}` more than once"
                )));
            }
        }
        Ok(())
    }

    /// The allowed environments; empty when unrestricted.
    #[must_use]
    pub fn environments(&self) -> &[String] {
        &self.package.environment.any_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn project() -> serde_json::Value {
        serde_json::json!({
            "format": 1,
            "package": {
                "uri": "docker.io/org/app",
                "environment": { "anyOf": ["dev", "prod"] }
            },
            "buildRequirements": {
                "requireSlsaBuilder": "github_actions_level_3",
                "repository": { "uri": "https://github.com/org/app" }
            }
        })
    }

    fn parse(json: &serde_json::Value) -> Result<ProjectPolicy, ReleaseError> {
        ProjectPolicy::from_reader(json.to_string().as_bytes())
    }

    #[test]
    fn valid_project_parses() {
        let policy = parse(&project()).expect("valid project");
        assert_eq!(policy.package.uri, "docker.io/org/app");
        assert_eq!(policy.environments(), ["dev", "prod"]);
        assert_eq!(
            policy.build_requirements.require_slsa_builder,
            "github_actions_level_3"
        );
    }

    #[test]
    fn environment_is_optional() {
        let mut json = project();
        json["package"]
            .as_object_mut()
            .unwrap()
            .remove("environment");
        let policy = parse(&json).expect("valid project");
        assert!(policy.environments().is_empty());
    }

    #[test]
    fn wrong_format_rejected() {
        let mut json = project();
        json["format"] = 0.into();
        assert_eq!(parse(&json).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_package_uri_rejected() {
        let mut json = project();
        json["package"]["uri"] = "".into();
        assert_eq!(parse(&json).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_builder_rejected() {
        let mut json = project();
        json["buildRequirements"]["requireSlsaBuilder"] = "".into();
        assert_eq!(parse(&json).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_repository_rejected() {
        let mut json = project();
        json["buildRequirements"]["repository"]["uri"] = "".into();
        assert_eq!(parse(&json).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn missing_repository_rejected() {
        let mut json = project();
        json["buildRequirements"]
            .as_object_mut()
            .unwrap()
            .remove("repository");
        assert_eq!(parse(&json).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_environment_name_is_invalid_field() {
        let mut json = project();
        json["package"]["environment"]["anyOf"] = serde_json::json!(["dev", ""]);
        assert_eq!(parse(&json).unwrap_err().kind(), ErrorKind::InvalidField);
    }

    #[test]
    fn duplicate_environment_rejected() {
        let mut json = project();
        json["package"]["environment"]["anyOf"] = serde_json::json!(["prod", "prod"]);
        assert_eq!(parse(&json).unwrap_err().kind(), ErrorKind::InvalidInput);
    }
}
