//! Organization policy: the trusted build roots and the level each confers.

use std::collections::HashSet;
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReleaseError;
use crate::{MAX_SLSA_LEVEL, SUPPORTED_FORMAT};

/// A trusted build platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Root {
    /// Builder identity as it appears in provenance.
    pub id: String,
    /// Human label that project policies reference.
    pub name: String,
    /// SLSA build level this root confers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slsa_level: Option<i64>,
}

impl Root {
    /// The level this root confers, `0` when unset.
    #[must_use]
    pub fn level(&self) -> i64 {
        self.slsa_level.unwrap_or(0)
    }
}

/// The categories of roots an organization trusts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Roots {
    /// Trusted build platforms, in document order.
    #[serde(default)]
    pub build: Vec<Root>,
}

/// A validated organization policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizationPolicy {
    /// Document format version.
    pub format: i64,
    /// Trusted roots.
    #[serde(default)]
    pub roots: Roots,
}

impl OrganizationPolicy {
    /// Parse and validate an organization policy from JSON.
    pub fn from_reader(reader: impl Read) -> Result<Self, ReleaseError> {
        let policy: Self = serde_json::from_reader(reader).map_err(|e| {
            ReleaseError::InvalidInput(format!("failed to parse organization policy: {e}"))
        })?;
        policy.validate()?;
        debug!(roots = policy.roots.build.len(), "loaded organization policy");
        Ok(policy)
    }

    /// Check format, root fields, uniqueness, and level range.
    pub fn validate(&self) -> Result<(), ReleaseError> {
        if self.format != SUPPORTED_FORMAT {
            return Err(ReleaseError::InvalidInput(format!(
                "unsupported organization policy format {}, expected {SUPPORTED_FORMAT}",
                self.format
            )));
        }

        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for root in &self.roots.build {
            if root.id.is_empty() {
                return Err(ReleaseError::InvalidField(format!(
                    "root `{}` has an empty id",
                    root.name
                )));
            }
            if root.name.is_empty() {
                return Err(ReleaseError::InvalidField(format!(
                    "root `{}` has an empty name",
                    root.id
                )));
            }
            if !names.insert(root.name.as_str()) {
                return Err(ReleaseError::InvalidInput(format!(
                    "root name `{}` is defined more than once",
                    root.name
                )));
            }
            if !ids.insert(root.id.as_str()) {
                return Err(ReleaseError::InvalidInput(format!(
                    "root id `{}` is defined more than once",
                    root.id
                )));
            }
            if let Some(level) = root.slsa_level {
                if !(0..=MAX_SLSA_LEVEL).contains(&level) {
                    return Err(ReleaseError::InvalidInput(format!(
                        "root `{}` has slsa level {level}, must be in [0, {MAX_SLSA_LEVEL}]",
                        root.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Find a build root by its name.
    #[must_use]
    pub fn root_by_name(&self, name: &str) -> Option<&Root> {
        self.roots.build.iter().find(|r| r.name == name)
    }

    /// Iterate over the build roots in document order.
    pub fn roots(&self) -> impl Iterator<Item = &Root> {
        self.roots.build.iter()
    }
}
