//! The package-name rules applied when loading project policies.

use sigillum_release::{PackageValidator, ValidationFailure};

/// Structural rules for package names and environment names.
///
/// A project policy governs every version of a package, so the package name
/// must not pin a tag (`name:tag`) or a digest (`name@sha256:...`).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PolicyPackageValidator;

impl PackageValidator for PolicyPackageValidator {
    fn validate_package(
        &self,
        package_name: &str,
        environments: &[String],
    ) -> Result<(), ValidationFailure> {
        if package_name.is_empty() {
            return Err(ValidationFailure("package name is empty".to_owned()));
        }
        if package_name.chars().any(char::is_whitespace) {
            return Err(ValidationFailure(format!(
                "package name `{package_name}` contains whitespace"
            )));
        }
        // Registry ports (`host:5000/name`) live before the last slash.
        let last = package_name.rsplit('/').next().unwrap_or(package_name);
        if last.is_empty() {
            return Err(ValidationFailure(format!(
                "package name `{package_name}` ends with `/`"
            )));
        }
        if last.contains('@') {
            return Err(ValidationFailure(format!(
                "package name `{package_name}` must not pin a digest"
            )));
        }
        if last.contains(':') {
            return Err(ValidationFailure(format!(
                "package name `{package_name}` must not pin a tag"
            )));
        }

        for env in environments {
            if env.is_empty() || env.chars().any(char::is_whitespace) {
                return Err(ValidationFailure(format!(
                    "invalid environment name `{env}` for `{package_name}`"
                )));
            }
        }
        Ok(())
    }
}
